use std::collections::HashMap;

use super::digits::{MODERN, Writer, width_for, zigzag};
use super::{STAGE_SEPARATOR, attr_width, barrier_flags, strength_digit};
use crate::blocks::attrs;
use crate::grid::Coord;
use crate::level::{Block, CURRENT_VERSION, LevelDef};

/// Encode a level and every chained stage in the current format
pub fn encode(level: &LevelDef) -> String {
    let mut w = Writer::new(MODERN);
    for (i, stage) in level.stages().enumerate() {
        if i > 0 {
            w.raw(STAGE_SEPARATOR);
        }
        write_stage(&mut w, stage);
    }
    w.finish()
}

/// Coordinate column widths for one stage
#[derive(Clone, Copy)]
struct Widths {
    x: usize,
    y: usize,
}

impl Widths {
    fn of(level: &LevelDef) -> Self {
        let cells = level
            .blocks
            .keys()
            .chain(level.players.iter())
            .chain(level.links.iter().flatten())
            .chain(std::iter::once(&level.center));
        let (mx, my) = cells.fold((0, 0), |(mx, my), c| (mx.max(zigzag(c.x)), my.max(zigzag(c.y))));
        Self {
            x: width_for(mx),
            y: width_for(my),
        }
    }

    fn write(self, w: &mut Writer, c: Coord) {
        w.number(zigzag(c.x), self.x);
        w.number(zigzag(c.y), self.y);
    }
}

/// Everything about a block except where it is: kind, barriers, attributes
fn write_block_header(w: &mut Writer, block: &Block) {
    w.digit(block.kind.code());
    w.length(block.barriers.len() as u64);
    for barrier in &block.barriers {
        w.digit(barrier.kind.code());
        w.digit(barrier_flags(barrier.gravity_locked, barrier.sides));
    }
    let (packed, texts) = attrs::pack(block.kind, &block.attrs).unwrap_or_else(|| {
        log::warn!("{} carries unfit attributes, writing defaults", block.kind);
        attrs::pack(block.kind, &block.kind.default_attrs()).unwrap_or_default()
    });
    w.number(packed, attr_width(block.kind));
    for text in texts {
        w.text(&text);
    }
}

fn write_stage(w: &mut Writer, level: &LevelDef) {
    w.raw(char::from(b'0' + CURRENT_VERSION));
    w.text(&level.name);

    let widths = Widths::of(level);
    w.length(widths.x as u64);
    w.length(widths.y as u64);
    widths.write(w, level.center);

    w.digit(level.gravity.direction.index() as u32);
    w.digit(strength_digit(level.gravity.strength));

    w.length(level.players.len() as u64);
    for p in &level.players {
        widths.write(w, *p);
    }

    // Identical blocks share one table entry, in first-appearance order
    let mut groups: Vec<(String, Vec<Coord>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (coord, block) in &level.blocks {
        let mut header = Writer::new(MODERN);
        write_block_header(&mut header, block);
        let header = header.finish();
        let slot = *index.entry(header.clone()).or_insert_with(|| {
            groups.push((header, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(*coord);
    }

    w.length(groups.len() as u64);
    for (header, coords) in &groups {
        for c in header.chars() {
            w.raw(c);
        }
        w.length(coords.len() as u64);
        for c in coords {
            widths.write(w, *c);
        }
    }

    w.length(level.links.len() as u64);
    for group in &level.links {
        w.length(group.len() as u64);
        for c in group {
            widths.write(w, *c);
        }
    }
}
