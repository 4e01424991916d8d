//! Priority table: the order in which collision buckets are executed
//!
//! Built once per stage from the kinds that can ever appear in it. Kinds are
//! sorted by `(collide_priority, name)` and given dense slots; a separator is
//! placed wherever the rounded priority changes so the executor can stop
//! between phases once the player has died or won.

use std::collections::BTreeSet;

use crate::blocks::{BlockKind, KIND_COUNT};
use crate::level::LevelDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Kind { kind: BlockKind, slot: usize },
    Separator,
}

#[derive(Debug, Clone)]
pub struct PriorityTable {
    entries: Vec<Entry>,
    slots: [Option<usize>; KIND_COUNT],
    len: usize,
}

impl PriorityTable {
    /// Table for every kind the level can contain or create
    pub fn build(level: &LevelDef) -> Self {
        let mut present: Vec<BlockKind> = Vec::new();
        for block in level.blocks.values() {
            present.push(block.kind);
            present.extend(block.barriers.iter().map(|b| b.kind));
        }
        if level.links.iter().flatten().any(|c| !level.blocks.contains_key(c)) {
            present.push(BlockKind::Anchor);
        }
        Self::from_kinds(present)
    }

    pub fn from_kinds(kinds: impl IntoIterator<Item = BlockKind>) -> Self {
        // Close over kinds that reactions may create
        let mut closed: BTreeSet<BlockKind> = BTreeSet::new();
        let mut pending: Vec<BlockKind> = kinds.into_iter().collect();
        while let Some(kind) = pending.pop() {
            if closed.insert(kind) {
                pending.extend_from_slice(kind.declare_required());
            }
        }

        let mut ordered: Vec<(f64, BlockKind)> = closed
            .into_iter()
            .filter_map(|k| k.collide_priority().map(|p| (p, k)))
            .collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.name().cmp(b.1.name())));

        let mut entries = Vec::with_capacity(ordered.len() * 2);
        let mut slots = [None; KIND_COUNT];
        let mut phase = None;
        for (slot, (priority, kind)) in ordered.iter().enumerate() {
            let rounded = priority.round() as i64;
            if phase.is_some_and(|p| p != rounded) {
                entries.push(Entry::Separator);
            }
            phase = Some(rounded);
            entries.push(Entry::Kind { kind: *kind, slot });
            slots[kind.index()] = Some(slot);
        }

        log::debug!("priority table: {} kinds", ordered.len());
        Self {
            entries,
            slots,
            len: ordered.len(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Bucket slot of `kind`; `None` if it never collides in this stage
    #[inline]
    pub fn slot(&self, kind: BlockKind) -> Option<usize> {
        self.slots[kind.index()]
    }

    /// Number of buckets a player needs
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Kinds in execution order
    pub fn kinds(&self) -> impl Iterator<Item = BlockKind> + '_ {
        self.entries.iter().filter_map(|e| match e {
            Entry::Kind { kind, .. } => Some(*kind),
            Entry::Separator => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coord;
    use crate::level::{Barrier, Block};

    #[test]
    fn lava_executes_before_goal_with_a_separator_between() {
        let table = PriorityTable::from_kinds([BlockKind::Goal, BlockKind::Lava]);
        assert_eq!(
            table.entries(),
            &[
                Entry::Kind { kind: BlockKind::Lava, slot: 0 },
                Entry::Separator,
                Entry::Kind { kind: BlockKind::Goal, slot: 1 },
            ]
        );
    }

    #[test]
    fn required_kinds_are_included_transitively() {
        let table = PriorityTable::from_kinds([BlockKind::Builder, BlockKind::Door]);
        let kinds: Vec<_> = table.kinds().collect();
        assert_eq!(
            kinds,
            [BlockKind::Ground, BlockKind::Door, BlockKind::Builder, BlockKind::OpenDoor]
        );
        // Air is required by nothing here and never collides anyway
        assert_eq!(table.slot(BlockKind::Air), None);
    }

    #[test]
    fn equal_priorities_sort_by_name_without_separator() {
        let table = PriorityTable::from_kinds([BlockKind::Mud, BlockKind::Ice, BlockKind::Ground, BlockKind::Door]);
        let kinds: Vec<_> = table.kinds().collect();
        assert_eq!(kinds, [BlockKind::Ground, BlockKind::Ice, BlockKind::Mud, BlockKind::Door]);
        assert!(!table.entries().contains(&Entry::Separator));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn build_collects_barrier_kinds() {
        let mut level = LevelDef::blank("t");
        level.set_block(
            Coord::new(0, 1),
            Block::new(BlockKind::Ground).with_barrier(Barrier::new(BlockKind::Lava, false, [true; 4])),
        );
        level.add_link([Coord::new(5, 5)]);
        let table = PriorityTable::build(&level);
        assert!(table.slot(BlockKind::Lava).is_some());
        assert!(table.slot(BlockKind::Ground).is_some());
        assert_eq!(table.slot(BlockKind::Anchor), None);
        assert_eq!(table.slot(BlockKind::Goal), None);
    }
}
