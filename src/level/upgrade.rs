//! Normalisation applied to every decoded level

use super::{CURRENT_VERSION, Gravity, LevelDef};
use crate::blocks::BlockKind;
use crate::grid::Coord;

/// Bring every stage of `level` up to the current version.
///
/// Idempotent: running it on an already upgraded level changes nothing.
pub fn upgrade(level: &mut LevelDef) {
    let mut stage = Some(level);
    while let Some(level) = stage {
        upgrade_stage(level);
        stage = level.next.as_deref_mut();
    }
}

fn upgrade_stage(level: &mut LevelDef) {
    let before = level.blocks.len();
    level.blocks.retain(|_, b| b.kind != BlockKind::Air);
    if level.blocks.len() != before {
        log::debug!("{}: dropped {} explicit air blocks", level.name, before - level.blocks.len());
    }

    normalise_links(level);
    level.gravity = Gravity::new(level.gravity.direction, level.gravity.strength);

    if level.version < CURRENT_VERSION {
        if let Some((lo, hi)) = level.bounds() {
            level.center = Coord::new(midpoint(lo.x, hi.x), midpoint(lo.y, hi.y));
        }
        log::info!("upgraded level {:?} from version {}", level.name, level.version);
        level.version = CURRENT_VERSION;
    }
}

/// Floor of the average, without overflowing at the ends of the range
fn midpoint(a: i32, b: i32) -> i32 {
    (i64::from(a) + i64::from(b)).div_euclid(2) as i32
}

/// Each cell belongs to at most one link group (its first), no group is empty
fn normalise_links(level: &mut LevelDef) {
    let mut seen: Vec<Coord> = Vec::new();
    for group in &mut level.links {
        group.retain(|c| {
            if seen.contains(c) {
                false
            } else {
                seen.push(*c);
                true
            }
        });
    }
    level.links.retain(|g| !g.is_empty());
    level.relink();
}
