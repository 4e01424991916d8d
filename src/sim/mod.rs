//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (cells in coordinate order, kinds in priority order)
//! - No rendering or platform dependencies; everything outward goes through `Host`

mod behavior;
pub mod collision;
pub mod player;
pub mod priority;
pub mod session;
pub mod tick;
pub mod world;

use thiserror::Error;

use crate::grid::Coord;

pub use collision::{Collision, execute_collisions, get_collisions};
pub use player::{Player, Scheduled};
pub use priority::{Entry, PriorityTable};
pub use session::{PlaySession, SessionStatus};
pub use tick::{integrate, interpolate, tick};
pub use world::World;

/// Fatal simulation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// A diagnostic crash block was touched
    #[error("intentional crash triggered at {at:?}")]
    IntentionalCrash { at: Coord },
}
