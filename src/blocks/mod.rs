//! Block kind registry
//!
//! The full set of cell kinds is closed and known at compile time, so it is a
//! plain enum. Everything the codec and the simulation need to know about a
//! kind (priority, solidity, attribute layout, dependencies, movement effect)
//! is answered by exhaustive matches here; the reactions themselves live in
//! `sim::behavior`.

pub mod attrs;
pub mod render;

use serde::{Deserialize, Serialize};

pub use attrs::{Attrs, Directional, Facing, FieldSpec, FieldValue, Reward, Spin, TextBearing, VariableValue};
pub use render::Bitmap;

/// Every kind of grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Air,
    Anchor,
    Ground,
    Ice,
    Mud,
    Door,
    Bounce,
    Breakable,
    Lava,
    Crash,
    Goal,
    GravityArrow,
    GravityStrength,
    GravityRotate,
    GravityRandom,
    Portal,
    Activator,
    Builder,
    Remover,
    OpenDoor,
    Coin,
    Sign,
    Unlock,
    Water,
    Booster,
}

/// Number of kinds (size of per-kind lookup arrays)
pub const KIND_COUNT: usize = BlockKind::ALL.len();

/// How a kind takes part in collision resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Never collides
    NonColliding,
    /// Only stops movement
    SimpleSolid,
    /// Stops movement, then runs a reaction per record
    AdvancedSolid { reverse: bool },
    /// Passable, with a custom reaction
    Reactive,
}

/// Multipliers a kind applies to the base movement constants while touched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub friction: f64,
    pub accel: f64,
    pub jump: f64,
    pub gravity: f64,
}

impl Movement {
    pub const IDENTITY: Movement = Movement {
        friction: 1.0,
        accel: 1.0,
        jump: 1.0,
        gravity: 1.0,
    };

    /// Multiplicative blend
    pub fn blend(self, other: Movement) -> Movement {
        Movement {
            friction: self.friction * other.friction,
            accel: self.accel * other.accel,
            jump: self.jump * other.jump,
            gravity: self.gravity * other.gravity,
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BlockKind {
    pub const ALL: [BlockKind; 25] = [
        BlockKind::Air,
        BlockKind::Anchor,
        BlockKind::Ground,
        BlockKind::Ice,
        BlockKind::Mud,
        BlockKind::Door,
        BlockKind::Bounce,
        BlockKind::Breakable,
        BlockKind::Lava,
        BlockKind::Crash,
        BlockKind::Goal,
        BlockKind::GravityArrow,
        BlockKind::GravityStrength,
        BlockKind::GravityRotate,
        BlockKind::GravityRandom,
        BlockKind::Portal,
        BlockKind::Activator,
        BlockKind::Builder,
        BlockKind::Remover,
        BlockKind::OpenDoor,
        BlockKind::Coin,
        BlockKind::Sign,
        BlockKind::Unlock,
        BlockKind::Water,
        BlockKind::Booster,
    ];

    /// Dense index for per-kind arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Air => "air",
            BlockKind::Anchor => "anchor",
            BlockKind::Ground => "ground",
            BlockKind::Ice => "ice",
            BlockKind::Mud => "mud",
            BlockKind::Door => "door",
            BlockKind::Bounce => "bounce",
            BlockKind::Breakable => "breakable",
            BlockKind::Lava => "lava",
            BlockKind::Crash => "crash",
            BlockKind::Goal => "goal",
            BlockKind::GravityArrow => "gravity_arrow",
            BlockKind::GravityStrength => "gravity_strength",
            BlockKind::GravityRotate => "gravity_rotate",
            BlockKind::GravityRandom => "gravity_random",
            BlockKind::Portal => "portal",
            BlockKind::Activator => "activator",
            BlockKind::Builder => "builder",
            BlockKind::Remover => "remover",
            BlockKind::OpenDoor => "open_door",
            BlockKind::Coin => "coin",
            BlockKind::Sign => "sign",
            BlockKind::Unlock => "unlock",
            BlockKind::Water => "water",
            BlockKind::Booster => "booster",
        }
    }

    pub fn by_name(name: &str) -> Option<BlockKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            BlockKind::Air => "Empty space.",
            BlockKind::Anchor => "Invisible link member; relays link triggers.",
            BlockKind::Ground => "Solid ground.",
            BlockKind::Ice => "Slippery solid ground.",
            BlockKind::Mud => "Sticky ground that slows running and jumping.",
            BlockKind::Door => "Solid until triggered remotely.",
            BlockKind::Bounce => "Springy wall; reflects momentum by its strength.",
            BlockKind::Breakable => "Solid once; shatters when touched.",
            BlockKind::Lava => "Deadly to touch.",
            BlockKind::Crash => "Diagnostic block that aborts the simulation.",
            BlockKind::Goal => "Reach it to clear the stage.",
            BlockKind::GravityArrow => "Turns gravity to point its way.",
            BlockKind::GravityStrength => "Sets how strong gravity pulls.",
            BlockKind::GravityRotate => "Rotates gravity a quarter turn.",
            BlockKind::GravityRandom => "Points gravity in a random direction.",
            BlockKind::Portal => "Teleports to the next portal in its link.",
            BlockKind::Activator => "Triggers the cell it points at after a delay.",
            BlockKind::Builder => "Places ground in the cell it points at.",
            BlockKind::Remover => "Clears the cell it points at.",
            BlockKind::OpenDoor => "An open door; closes when triggered remotely.",
            BlockKind::Coin => "Collectible.",
            BlockKind::Sign => "Reads its message aloud.",
            BlockKind::Unlock => "Grants an achievement, skin or bonus level.",
            BlockKind::Water => "Slows falling and movement.",
            BlockKind::Booster => "Pushes the player the way it points.",
        }
    }

    /// Collision priority; `None` never collides
    pub fn collide_priority(self) -> Option<f64> {
        match self {
            BlockKind::Air | BlockKind::Anchor => None,
            BlockKind::Ground | BlockKind::Ice | BlockKind::Mud => Some(0.0),
            BlockKind::Door => Some(0.1),
            BlockKind::Bounce => Some(0.2),
            BlockKind::Breakable => Some(0.3),
            BlockKind::Lava => Some(1.0),
            BlockKind::Crash => Some(1.4),
            BlockKind::Goal => Some(2.0),
            BlockKind::GravityArrow => Some(3.0),
            BlockKind::GravityStrength => Some(3.1),
            BlockKind::GravityRotate => Some(3.2),
            BlockKind::GravityRandom => Some(3.3),
            BlockKind::Portal => Some(4.0),
            BlockKind::Activator => Some(4.1),
            BlockKind::Builder => Some(4.2),
            BlockKind::Remover => Some(4.3),
            BlockKind::OpenDoor => Some(4.4),
            BlockKind::Coin => Some(5.0),
            BlockKind::Sign => Some(5.1),
            BlockKind::Unlock => Some(5.2),
            BlockKind::Water => Some(6.0),
            BlockKind::Booster => Some(6.1),
        }
    }

    pub fn solid(self) -> bool {
        matches!(self.behavior(), Behavior::SimpleSolid | Behavior::AdvancedSolid { .. })
    }

    pub fn behavior(self) -> Behavior {
        match self {
            BlockKind::Air | BlockKind::Anchor => Behavior::NonColliding,
            BlockKind::Ground | BlockKind::Ice | BlockKind::Mud => Behavior::SimpleSolid,
            BlockKind::Door | BlockKind::Bounce => Behavior::AdvancedSolid { reverse: false },
            BlockKind::Breakable => Behavior::AdvancedSolid { reverse: true },
            _ => Behavior::Reactive,
        }
    }

    /// Kinds this kind can create, which must be scheduled even if absent
    pub fn declare_required(self) -> &'static [BlockKind] {
        match self {
            BlockKind::Breakable | BlockKind::Remover | BlockKind::Coin | BlockKind::Unlock => {
                &[BlockKind::Air]
            }
            BlockKind::Builder => &[BlockKind::Ground],
            BlockKind::Door => &[BlockKind::OpenDoor],
            BlockKind::OpenDoor => &[BlockKind::Door],
            _ => &[],
        }
    }

    /// Movement multipliers while touched, for "touching" kinds
    pub fn movement(self) -> Option<Movement> {
        match self {
            BlockKind::Ice => Some(Movement {
                friction: 0.15,
                accel: 0.6,
                ..Movement::IDENTITY
            }),
            BlockKind::Mud => Some(Movement {
                friction: 2.5,
                accel: 0.5,
                jump: 0.6,
                ..Movement::IDENTITY
            }),
            BlockKind::Water => Some(Movement {
                friction: 1.5,
                accel: 0.7,
                jump: 0.7,
                gravity: 0.35,
            }),
            _ => None,
        }
    }

    /// Kinds that read their own rotation to act on a second cell
    pub fn is_rotation_target(self) -> bool {
        matches!(self, BlockKind::Activator | BlockKind::Builder | BlockKind::Remover)
    }

    /// Kinds only available to the editor in admin mode
    pub fn admin_only(self) -> bool {
        matches!(self, BlockKind::Anchor | BlockKind::Crash)
    }

    /// Attribute layout, in packing order (least significant first)
    pub fn fields(self) -> &'static [FieldSpec] {
        use attrs::layouts;
        match self {
            BlockKind::GravityArrow | BlockKind::Builder | BlockKind::Remover | BlockKind::Booster => {
                layouts::FACING
            }
            BlockKind::Bounce | BlockKind::GravityStrength => layouts::MAGNITUDE,
            BlockKind::GravityRotate => layouts::SPIN,
            BlockKind::Activator => layouts::TIMER,
            BlockKind::Sign => layouts::TEXT,
            BlockKind::Unlock => layouts::UNLOCK,
            _ => &[],
        }
    }

    pub fn default_attrs(self) -> Attrs {
        match self {
            BlockKind::GravityArrow | BlockKind::Builder | BlockKind::Remover | BlockKind::Booster => {
                Attrs::Facing(Facing::default())
            }
            BlockKind::Bounce => Attrs::Magnitude(8),
            BlockKind::GravityStrength => Attrs::Magnitude(4),
            BlockKind::GravityRotate => Attrs::Spin(Spin::Clockwise),
            BlockKind::Activator => Attrs::Timer {
                facing: Facing::default(),
                delay: None,
            },
            BlockKind::Sign => Attrs::Text(String::new()),
            BlockKind::Unlock => Attrs::Unlock {
                reward: Reward::Achievement,
                name: String::new(),
            },
            _ => Attrs::Plain,
        }
    }

    /// Stable code written by the v4/v5 codec
    pub fn code(self) -> u32 {
        match self {
            BlockKind::Air => 0,
            BlockKind::Ground => 1,
            BlockKind::Lava => 2,
            BlockKind::Goal => 3,
            BlockKind::Ice => 4,
            BlockKind::Bounce => 5,
            BlockKind::GravityArrow => 6,
            BlockKind::Mud => 7,
            BlockKind::Water => 8,
            BlockKind::Portal => 9,
            BlockKind::Activator => 10,
            BlockKind::Door => 11,
            BlockKind::OpenDoor => 12,
            BlockKind::Breakable => 13,
            BlockKind::GravityStrength => 14,
            BlockKind::GravityRotate => 15,
            BlockKind::GravityRandom => 16,
            BlockKind::Builder => 17,
            BlockKind::Remover => 18,
            BlockKind::Coin => 19,
            BlockKind::Sign => 20,
            BlockKind::Unlock => 21,
            BlockKind::Booster => 22,
            BlockKind::Anchor => 23,
            BlockKind::Crash => 24,
        }
    }

    pub fn from_code(code: u32) -> Option<BlockKind> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Tile bitmap for this kind
    pub fn render(self, attrs: &Attrs, gravity: crate::Dir, target_scale: f64) -> Bitmap {
        render::render(self, attrs, gravity, target_scale)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kinds the level editor offers
pub fn palette(admin: bool) -> Vec<BlockKind> {
    BlockKind::ALL
        .into_iter()
        .filter(|k| *k != BlockKind::Air && (admin || !k.admin_only()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_is_dense_and_codes_are_unique() {
        for (i, kind) in BlockKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(BlockKind::from_code(kind.code()), Some(*kind));
            assert_eq!(BlockKind::by_name(kind.name()), Some(*kind));
        }
        let codes: HashSet<u32> = BlockKind::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), KIND_COUNT);
        assert!(codes.iter().all(|c| *c < 100), "codes must fit one base-100 digit");
    }

    #[test]
    fn non_colliding_kinds_have_no_priority() {
        for kind in BlockKind::ALL {
            assert_eq!(
                kind.behavior() == Behavior::NonColliding,
                kind.collide_priority().is_none(),
                "{kind}"
            );
        }
    }

    #[test]
    fn default_attrs_match_layout() {
        for kind in BlockKind::ALL {
            let attrs = kind.default_attrs();
            assert!(attrs.fits(kind), "{kind}");
            assert_eq!(attrs.to_fields().len(), kind.fields().len(), "{kind}");
        }
    }

    #[test]
    fn lava_sorts_before_goal() {
        assert!(BlockKind::Lava.collide_priority() < BlockKind::Goal.collide_priority());
    }

    #[test]
    fn admin_palette_is_a_superset() {
        let normal = palette(false);
        let admin = palette(true);
        assert!(!normal.contains(&BlockKind::Crash));
        assert!(admin.contains(&BlockKind::Crash));
        assert!(normal.iter().all(|k| admin.contains(k)));
        assert!(!admin.contains(&BlockKind::Air));
    }
}
