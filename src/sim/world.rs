//! Mutable per-session copy of a stage
//!
//! Reactions rewrite cells, move gravity and count coins here; the `LevelDef`
//! a session was prepared from is never touched.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::priority::PriorityTable;
use crate::blocks::BlockKind;
use crate::consts::BOUNDS_MARGIN;
use crate::grid::{Coord, Dir};
use crate::level::{Block, Gravity, LevelDef};

pub struct World {
    pub blocks: BTreeMap<Coord, Block>,
    pub links: Vec<Vec<Coord>>,
    link_of: HashMap<Coord, usize>,
    pub gravity: Gravity,
    pub table: PriorityTable,
    pub rng: Pcg32,
    /// Integrated ticks since prepare
    pub tick_time: u64,
    pub coins: u32,
    /// Signs that already spoke
    pub announced: BTreeSet<Coord>,
    /// Inclusive cell range the player may occupy
    pub bounds: (Coord, Coord),
}

impl World {
    pub fn new(level: &LevelDef, seed: u64) -> Self {
        let link_of = level
            .links
            .iter()
            .enumerate()
            .flat_map(|(i, g)| g.iter().map(move |c| (*c, i)))
            .collect();
        let (lo, hi) = level.bounds().unwrap_or_default();
        Self {
            blocks: level.blocks.clone(),
            links: level.links.clone(),
            link_of,
            gravity: level.gravity,
            table: PriorityTable::build(level),
            rng: Pcg32::seed_from_u64(seed),
            tick_time: 0,
            coins: 0,
            announced: BTreeSet::new(),
            bounds: (
                Coord::new(lo.x.saturating_sub(BOUNDS_MARGIN), lo.y.saturating_sub(BOUNDS_MARGIN)),
                Coord::new(hi.x.saturating_add(BOUNDS_MARGIN), hi.y.saturating_add(BOUNDS_MARGIN)),
            ),
        }
    }

    pub fn link_of(&self, at: Coord) -> Option<usize> {
        self.link_of.get(&at).copied()
    }

    /// Link members other than `at`
    pub fn linked(&self, at: Coord) -> impl Iterator<Item = Coord> + '_ {
        self.link_of(at)
            .map(|i| self.links[i].as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |c| *c != at)
    }

    pub fn kind_at(&self, at: Coord) -> BlockKind {
        match self.blocks.get(&at) {
            Some(b) => b.kind,
            None if self.link_of.contains_key(&at) => BlockKind::Anchor,
            None => BlockKind::Air,
        }
    }

    /// Kind `at` acts as for a player moving `moving` into it
    pub fn effective_kind(&self, at: Coord, moving: Dir) -> BlockKind {
        match self.blocks.get(&at) {
            Some(b) => b.effective_kind(moving, self.gravity.direction),
            None => self.kind_at(at),
        }
    }

    pub fn is_solid(&self, at: Coord, moving: Dir) -> bool {
        self.effective_kind(at, moving).solid()
    }

    /// Turn the cell at `at` into `kind`, keeping barriers and link membership
    pub fn replace(&mut self, at: Coord, kind: BlockKind) {
        if kind == BlockKind::Air {
            self.blocks.remove(&at);
            return;
        }
        let link = self.link_of(at);
        let block = self.blocks.entry(at).or_insert_with(|| Block::new(kind));
        if block.kind != kind {
            block.kind = kind;
            if !block.attrs.fits(kind) {
                block.attrs = kind.default_attrs();
            }
        }
        block.link = link;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaced_cells_stay_linked() {
        let mut level = LevelDef::blank("w");
        level.set_block(Coord::new(1, 0), Block::new(BlockKind::Door));
        level.add_link([Coord::new(1, 0), Coord::new(4, 0)]);
        let mut world = World::new(&level, 1);

        world.replace(Coord::new(1, 0), BlockKind::OpenDoor);
        assert_eq!(world.kind_at(Coord::new(1, 0)), BlockKind::OpenDoor);
        assert_eq!(world.blocks[&Coord::new(1, 0)].link, Some(0));

        world.replace(Coord::new(1, 0), BlockKind::Air);
        assert_eq!(world.kind_at(Coord::new(1, 0)), BlockKind::Anchor);
        assert_eq!(world.linked(Coord::new(4, 0)).collect::<Vec<_>>(), [Coord::new(1, 0)]);
        // The source level is untouched
        assert_eq!(level.kind_at(Coord::new(1, 0)), BlockKind::Door);
    }

    #[test]
    fn bounds_include_a_margin() {
        let mut level = LevelDef::blank("w");
        level.set_block(Coord::new(3, 2), Block::new(BlockKind::Ground));
        let world = World::new(&level, 1);
        assert_eq!(world.bounds, (Coord::new(-12, -12), Coord::new(15, 14)));
    }

    #[test]
    fn bounds_saturate_at_the_ends_of_the_grid() {
        let mut level = LevelDef::blank("far");
        level.set_block(Coord::new(i32::MAX - 3, 1), Block::new(BlockKind::Ground));
        level.set_block(Coord::new(2, i32::MIN + 5), Block::new(BlockKind::Ground));
        let world = World::new(&level, 1);
        assert_eq!(world.bounds, (Coord::new(-12, i32::MIN), Coord::new(i32::MAX, 13)));
    }
}
