//! Player state

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec2;

use super::collision::Collision;
use crate::blocks::BlockKind;
use crate::consts::{CELL_SIZE, PLAYER_SIZE};
use crate::grid::{Coord, Dir};

/// A reaction waiting to fire on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub direction: Dir,
    /// Tick at or after which it fires
    pub at: u64,
}

/// Unit vector of a direction in position space
#[inline]
pub fn dir_vec(dir: Dir) -> DVec2 {
    DVec2::new(dir.dx() as f64, dir.dy() as f64)
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner
    pub pos: DVec2,
    pub momentum: DVec2,
    /// Where the host should draw the player this frame
    pub display: DVec2,
    pub alive: bool,
    pub won: bool,
    pub grounded: bool,
    /// Movement kinds touched since the multipliers were last blended
    pub touching: BTreeSet<BlockKind>,
    pub scheduled: BTreeMap<Coord, Scheduled>,
    pub(crate) buckets: Vec<Vec<Collision>>,
    /// Set by reactions that end the current axis step
    pub(crate) stop: bool,
    pub(crate) corrected: bool,
}

impl Player {
    /// Player standing centered on the floor of `start`
    pub fn spawn(start: Coord, slots: usize) -> Self {
        let (x, y) = start.origin();
        let pos = DVec2::new(x + (CELL_SIZE - PLAYER_SIZE) / 2.0, y + CELL_SIZE - PLAYER_SIZE);
        Self {
            pos,
            momentum: DVec2::ZERO,
            display: pos,
            alive: true,
            won: false,
            grounded: false,
            touching: BTreeSet::new(),
            scheduled: BTreeMap::new(),
            buckets: vec![Vec::new(); slots],
            stop: false,
            corrected: false,
        }
    }

    /// Place the player centered inside `cell`
    pub fn teleport(&mut self, cell: Coord) {
        let (x, y) = cell.origin();
        let inset = (CELL_SIZE - PLAYER_SIZE) / 2.0;
        self.pos = DVec2::new(x + inset, y + inset);
    }

    /// Reaction for `direction` on `at`, keeping any earlier pending one
    pub fn schedule(&mut self, at: Coord, direction: Dir, tick: u64) {
        self.scheduled.entry(at).or_insert(Scheduled { direction, at: tick });
    }

    /// Remove and return reactions due at `now`, in cell order
    pub fn take_due(&mut self, now: u64) -> Vec<(Coord, Scheduled)> {
        let due: Vec<Coord> = self
            .scheduled
            .iter()
            .filter(|(_, s)| s.at <= now)
            .map(|(c, _)| *c)
            .collect();
        due.into_iter()
            .filter_map(|c| self.scheduled.remove(&c).map(|s| (c, s)))
            .collect()
    }

    /// Stop against the solid cell `cell` while moving `direction`.
    ///
    /// Applies at most once per axis step.
    pub fn correct(&mut self, direction: Dir, cell: Coord, gravity: Dir) {
        if self.corrected {
            return;
        }
        let (x, y) = cell.origin();
        match direction {
            Dir::Right => self.pos.x = x - PLAYER_SIZE,
            Dir::Left => self.pos.x = x + CELL_SIZE,
            Dir::Down => self.pos.y = y - PLAYER_SIZE,
            Dir::Up => self.pos.y = y + CELL_SIZE,
        }
        // Only the component moving into the cell is removed
        let into = self.momentum.dot(dir_vec(direction));
        if into > 0.0 {
            self.momentum -= dir_vec(direction) * into;
        }
        if direction == gravity {
            self.grounded = true;
        }
        self.stop = true;
        self.corrected = true;
    }

    /// Cells overlapped by the player box
    pub fn overlapped(&self) -> impl Iterator<Item = Coord> + use<> {
        let xs = span(self.pos.x, self.pos.x + PLAYER_SIZE);
        let ys = span(self.pos.y, self.pos.y + PLAYER_SIZE);
        ys.flat_map(move |y| xs.clone().map(move |x| Coord::new(x, y)))
    }
}

/// Cell indices whose extent intersects the open interval `(lo, hi)`
pub fn span(lo: f64, hi: f64) -> std::ops::RangeInclusive<i32> {
    let first = (lo / CELL_SIZE).floor() as i32;
    let last = ((hi / CELL_SIZE).ceil() - 1.0) as i32;
    first..=last
}
