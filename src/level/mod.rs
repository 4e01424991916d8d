//! Level definitions
//!
//! `LevelDef` is the authoritative, editor-owned description of a level. The
//! simulation only ever reads it: a play session derives its own mutable copy
//! of blocks, links and gravity at prepare time.

pub mod codec;
mod error;
mod upgrade;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blocks::{Attrs, BlockKind};
use crate::clamp_strength;
use crate::grid::{Coord, Dir};

pub use codec::{decode, encode};
pub use error::LevelError;
pub use upgrade::upgrade;

/// Format version written by the encoder
pub const CURRENT_VERSION: u8 = 5;

/// Gravity: one of four directions and a non-positive strength
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    pub direction: Dir,
    pub strength: f64,
}

impl Default for Gravity {
    fn default() -> Self {
        Self {
            direction: Dir::Down,
            strength: -1.0,
        }
    }
}

impl Gravity {
    pub fn new(direction: Dir, strength: f64) -> Self {
        Self {
            direction,
            strength: clamp_strength(strength),
        }
    }
}

/// Directional override: from the masked sides the cell acts as `kind`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Barrier {
    pub kind: BlockKind,
    pub gravity_locked: bool,
    /// up, right, down, left
    pub sides: [bool; 4],
}

impl Barrier {
    pub fn new(kind: BlockKind, gravity_locked: bool, sides: [bool; 4]) -> Self {
        Self {
            kind,
            gravity_locked,
            sides,
        }
    }

    /// Whether the barrier covers world side `side` under `gravity`
    pub fn covers(&self, side: Dir, gravity: Dir) -> bool {
        let authored = if self.gravity_locked {
            side.unrelative_to(gravity)
        } else {
            side
        };
        self.sides[authored.index()]
    }
}

/// One cell of a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub barriers: Vec<Barrier>,
    pub attrs: Attrs,
    pub link: Option<usize>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            barriers: Vec::new(),
            attrs: kind.default_attrs(),
            link: None,
        }
    }

    /// Block with explicit attributes; falls back to defaults if they do not fit
    pub fn with_attrs(kind: BlockKind, attrs: Attrs) -> Self {
        let attrs = if attrs.fits(kind) {
            attrs
        } else {
            log::warn!("attributes {attrs:?} do not fit {kind}, using defaults");
            kind.default_attrs()
        };
        Self {
            attrs,
            ..Self::new(kind)
        }
    }

    pub fn with_barrier(mut self, barrier: Barrier) -> Self {
        self.barriers.push(barrier);
        self
    }

    /// Kind this cell acts as for a player moving `moving` into it
    pub fn effective_kind(&self, moving: Dir, gravity: Dir) -> BlockKind {
        let side = moving.opposite();
        self.barriers
            .iter()
            .find(|b| b.covers(side, gravity))
            .map_or(self.kind, |b| b.kind)
    }
}

/// A level, possibly the first stage of a chain
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDef {
    pub name: String,
    pub gravity: Gravity,
    pub blocks: BTreeMap<Coord, Block>,
    pub links: Vec<Vec<Coord>>,
    pub players: Vec<Coord>,
    pub center: Coord,
    pub version: u8,
    pub next: Option<Box<LevelDef>>,
}

impl LevelDef {
    /// Empty level with a single player start at the origin
    pub fn blank(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gravity: Gravity::default(),
            blocks: BTreeMap::new(),
            links: Vec::new(),
            players: vec![Coord::new(0, 0)],
            center: Coord::new(0, 0),
            version: CURRENT_VERSION,
            next: None,
        }
    }

    /// Place a block; placing air clears the cell
    pub fn set_block(&mut self, at: Coord, mut block: Block) {
        if block.kind == BlockKind::Air {
            self.blocks.remove(&at);
            return;
        }
        block.link = self.link_of(at);
        self.blocks.insert(at, block);
    }

    pub fn block_at(&self, at: Coord) -> Option<&Block> {
        self.blocks.get(&at)
    }

    /// Kind at a cell; link members without a block are anchors
    pub fn kind_at(&self, at: Coord) -> BlockKind {
        match self.blocks.get(&at) {
            Some(b) => b.kind,
            None if self.link_of(at).is_some() => BlockKind::Anchor,
            None => BlockKind::Air,
        }
    }

    pub fn link_of(&self, at: Coord) -> Option<usize> {
        self.links.iter().position(|g| g.contains(&at))
    }

    /// Add a link group, taking its members out of any earlier group
    pub fn add_link(&mut self, members: impl IntoIterator<Item = Coord>) -> usize {
        let mut group: Vec<Coord> = Vec::new();
        for c in members {
            if !group.contains(&c) {
                group.push(c);
            }
        }
        for existing in &mut self.links {
            existing.retain(|c| !group.contains(c));
        }
        self.links.push(group);
        self.links.retain(|g| !g.is_empty());
        self.relink();
        self.links.len() - 1
    }

    /// Recompute every block's link index from the link groups
    pub(crate) fn relink(&mut self) {
        for block in self.blocks.values_mut() {
            block.link = None;
        }
        for (i, group) in self.links.iter().enumerate() {
            for c in group {
                if let Some(b) = self.blocks.get_mut(c) {
                    b.link = Some(i);
                }
            }
        }
    }

    /// Smallest box containing every block, player start and link member
    pub fn bounds(&self) -> Option<(Coord, Coord)> {
        let cells = self
            .blocks
            .keys()
            .chain(self.players.iter())
            .chain(self.links.iter().flatten());
        cells.fold(None, |acc, c| match acc {
            None => Some((*c, *c)),
            Some((lo, hi)) => Some((
                Coord::new(lo.x.min(c.x), lo.y.min(c.y)),
                Coord::new(hi.x.max(c.x), hi.y.max(c.y)),
            )),
        })
    }

    /// This stage followed by every chained stage
    pub fn stages(&self) -> impl Iterator<Item = &LevelDef> {
        std::iter::successors(Some(self), |l| l.next.as_deref())
    }

    /// Append a stage at the end of the chain
    pub fn push_stage(&mut self, stage: LevelDef) {
        match self.next {
            Some(ref mut next) => next.push_stage(stage),
            None => self.next = Some(Box::new(stage)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlinked_link_members_are_anchors() {
        let mut level = LevelDef::blank("t");
        level.set_block(Coord::new(1, 1), Block::new(BlockKind::Portal));
        level.add_link([Coord::new(1, 1), Coord::new(5, 5)]);
        assert_eq!(level.kind_at(Coord::new(5, 5)), BlockKind::Anchor);
        assert_eq!(level.kind_at(Coord::new(6, 6)), BlockKind::Air);
        assert_eq!(level.block_at(Coord::new(1, 1)).unwrap().link, Some(0));
    }

    #[test]
    fn add_link_moves_members_out_of_old_groups() {
        let mut level = LevelDef::blank("t");
        level.add_link([Coord::new(0, 0), Coord::new(1, 0)]);
        level.add_link([Coord::new(1, 0), Coord::new(2, 0), Coord::new(2, 0)]);
        assert_eq!(level.links, vec![vec![Coord::new(0, 0)], vec![Coord::new(1, 0), Coord::new(2, 0)]]);
        // Emptied groups are dropped
        level.add_link([Coord::new(0, 0)]);
        assert_eq!(level.links.len(), 2);
        assert_eq!(level.link_of(Coord::new(0, 0)), Some(1));
    }

    #[test]
    fn locked_barrier_sides_rotate_with_gravity() {
        // Covers the authored top side only
        let block = Block::new(BlockKind::Ground).with_barrier(Barrier::new(
            BlockKind::Lava,
            true,
            [true, false, false, false],
        ));
        // Falling onto it under normal gravity hits the top side
        assert_eq!(block.effective_kind(Dir::Down, Dir::Down), BlockKind::Lava);
        assert_eq!(block.effective_kind(Dir::Right, Dir::Down), BlockKind::Ground);
        // With gravity pointing left the "top" faces right, hit while moving left
        assert_eq!(block.effective_kind(Dir::Left, Dir::Left), BlockKind::Lava);
        assert_eq!(block.effective_kind(Dir::Down, Dir::Left), BlockKind::Ground);
    }

    #[test]
    fn air_clears_cells_and_bounds_cover_everything() {
        let mut level = LevelDef::blank("t");
        level.set_block(Coord::new(-3, 2), Block::new(BlockKind::Ground));
        level.add_link([Coord::new(4, -1)]);
        assert_eq!(level.bounds(), Some((Coord::new(-3, -1), Coord::new(4, 2))));
        level.set_block(Coord::new(-3, 2), Block::new(BlockKind::Air));
        assert!(level.blocks.is_empty());
    }

    #[test]
    fn stages_follow_the_chain() {
        let mut level = LevelDef::blank("one");
        level.push_stage(LevelDef::blank("two"));
        level.push_stage(LevelDef::blank("three"));
        let names: Vec<_> = level.stages().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }
}
