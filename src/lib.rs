//! Gravity Grid - a tile puzzle platformer with rotatable gravity
//!
//! Core modules:
//! - `blocks`: Block kind registry (priorities, attribute layouts, tile bitmaps)
//! - `level`: Level definition and the text level codec
//! - `sim`: Deterministic simulation (priority table, collisions, integrator, sessions)
//! - `host`: Callbacks the simulation expects from its embedding
//! - `store`: Level text files grouped into buckets
//! - `settings`: Persisted preferences

pub mod blocks;
pub mod grid;
pub mod host;
pub mod level;
pub mod settings;
pub mod sim;
pub mod store;

pub use blocks::{Attrs, BlockKind};
pub use grid::{Coord, Dir};
pub use host::Host;
pub use level::{Block, Gravity, LevelDef, LevelError};
pub use settings::Settings;
pub use sim::{PlaySession, SessionStatus, SimError};

/// Game configuration constants
pub mod consts {
    /// Edge length of one grid cell in position units
    pub const CELL_SIZE: f64 = 30.0;
    /// Edge length of the (square) player box
    pub const PLAYER_SIZE: f64 = 20.0;

    /// Gravity acceleration per tick at strength -1.0
    pub const BASE_GRAVITY: f64 = 0.5;
    /// Lateral acceleration per tick while a direction is held
    pub const BASE_ACCEL: f64 = 0.6;
    /// Momentum set against gravity when jumping
    pub const BASE_JUMP: f64 = 9.0;
    /// Fraction of lateral momentum removed each tick
    pub const BASE_FRICTION: f64 = 0.2;
    /// Per-axis momentum cap
    pub const MAX_SPEED: f64 = 28.0;
    /// Impulse applied by a booster
    pub const BOOST_IMPULSE: f64 = 6.0;

    /// Gravity strength range accepted by any kind that mutates it
    pub const MIN_GRAVITY_STRENGTH: f64 = -2.5;
    pub const MAX_GRAVITY_STRENGTH: f64 = 0.0;
    /// Codec granularity for gravity strength
    pub const GRAVITY_STEP: f64 = 0.25;

    /// Cells of free space kept around the level content before clamping
    pub const BOUNDS_MARGIN: i32 = 12;
    /// Activator delay (ticks) when the delay field is absent
    pub const DEFAULT_ACTIVATOR_DELAY: u64 = 30;
}

/// Clamp a gravity strength into the legal range
#[inline]
pub fn clamp_strength(strength: f64) -> f64 {
    strength.clamp(consts::MIN_GRAVITY_STRENGTH, consts::MAX_GRAVITY_STRENGTH)
}
