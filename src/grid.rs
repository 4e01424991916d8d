//! Grid coordinates and the four cardinal directions
//!
//! Directions are indexed 0..4 as up, right, down, left. Screen space is used:
//! y grows downward, so "down" is +y. All direction math is exact integer
//! arithmetic; there is no floating trigonometry anywhere in the simulation.

use serde::{Deserialize, Serialize};

use crate::consts::CELL_SIZE;

/// A signed grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step in `dir`; stays put at the edge of the grid
    #[inline]
    pub fn step(self, dir: Dir) -> Self {
        Self::new(self.x.saturating_add(dir.dx()), self.y.saturating_add(dir.dy()))
    }

    /// Cell containing a continuous position
    #[inline]
    pub fn containing(x: f64, y: f64) -> Self {
        Self::new((x / CELL_SIZE).floor() as i32, (y / CELL_SIZE).floor() as i32)
    }

    /// Top-left corner of this cell in position units
    #[inline]
    pub fn origin(self) -> (f64, f64) {
        (self.x as f64 * CELL_SIZE, self.y as f64 * CELL_SIZE)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Cardinal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Dir {
    Up = 0,
    Right = 1,
    #[default]
    Down = 2,
    Left = 3,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction for an index, wrapping modulo 4
    #[inline]
    pub fn from_index(i: usize) -> Dir {
        Self::ALL[i % 4]
    }

    /// Rotate clockwise by `quarter_turns`
    #[inline]
    pub fn rotate(self, quarter_turns: usize) -> Dir {
        Dir::from_index(self.index() + quarter_turns)
    }

    #[inline]
    pub fn opposite(self) -> Dir {
        self.rotate(2)
    }

    /// Integer x component (sin analogue)
    #[inline]
    pub fn dx(self) -> i32 {
        match self {
            Dir::Up | Dir::Down => 0,
            Dir::Right => 1,
            Dir::Left => -1,
        }
    }

    /// Integer y component (-cos analogue, screen space)
    #[inline]
    pub fn dy(self) -> i32 {
        match self {
            Dir::Left | Dir::Right => 0,
            Dir::Down => 1,
            Dir::Up => -1,
        }
    }

    /// Positive direction along the given axis for a signed displacement
    pub fn along(horizontal: bool, positive: bool) -> Dir {
        match (horizontal, positive) {
            (true, true) => Dir::Right,
            (true, false) => Dir::Left,
            (false, true) => Dir::Down,
            (false, false) => Dir::Up,
        }
    }

    /// Map a direction authored for downward gravity onto the given gravity.
    ///
    /// Gravity-locked sides and arrows are authored as if gravity pointed down;
    /// with gravity `g` everything turns by the same amount `g` is turned from down.
    #[inline]
    pub fn relative_to(self, gravity: Dir) -> Dir {
        self.rotate(gravity.index() + 2)
    }

    /// Inverse of [`Dir::relative_to`]
    #[inline]
    pub fn unrelative_to(self, gravity: Dir) -> Dir {
        self.rotate(4 - (gravity.index() + 2) % 4)
    }

    pub fn name(self) -> &'static str {
        match self {
            Dir::Up => "up",
            Dir::Right => "right",
            Dir::Down => "down",
            Dir::Left => "left",
        }
    }
}
