//! Level string codec
//!
//! A level string is one or more stages separated by `\n`. Each stage starts
//! with a single version tag character (`1` to `5`) followed by base-100
//! symbols. Only the current format is written; every older format still
//! decodes, after which [`upgrade`](super::upgrade) normalises the result.

pub mod digits;
mod decode;
mod encode;
mod legacy;

pub use decode::decode;
pub use encode::encode;

use crate::blocks::{BlockKind, attrs};

/// Separates chained stages
pub const STAGE_SEPARATOR: char = '\n';

/// Gravity strength is stored in steps of this size, as a non-negative digit
const STRENGTH_STEP: f64 = crate::consts::GRAVITY_STEP;
const STRENGTH_DIGITS: u32 = 11;

/// Digits used for `kind`'s packed attribute integer
pub fn attr_width(kind: BlockKind) -> usize {
    match attrs::combinations(kind) {
        0 | 1 => 0,
        n => digits::width_for(n - 1),
    }
}

/// Barrier flags digit: side bits in the low nibble, lock in bit 4
fn barrier_flags(gravity_locked: bool, sides: [bool; 4]) -> u32 {
    let mut flags = (gravity_locked as u32) << 4;
    for (i, side) in sides.iter().enumerate() {
        if *side {
            flags |= 1 << i;
        }
    }
    flags
}

fn barrier_from_flags(flags: u32) -> Option<(bool, [bool; 4])> {
    if flags >= 1 << 5 {
        return None;
    }
    let sides = std::array::from_fn(|i| flags & (1 << i) != 0);
    Some((flags & (1 << 4) != 0, sides))
}

fn strength_digit(strength: f64) -> u32 {
    let steps = (-crate::clamp_strength(strength) / STRENGTH_STEP).round();
    (steps as u32).min(STRENGTH_DIGITS - 1)
}

fn strength_from_digit(digit: u32) -> f64 {
    -(digit as f64) * STRENGTH_STEP
}
