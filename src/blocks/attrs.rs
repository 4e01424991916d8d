//! Structured per-kind attributes and their mixed-radix packing
//!
//! Each kind declares a field layout (`BlockKind::fields`). The codec never
//! touches `Attrs` directly: it packs the non-text fields into one integer by
//! cumulative multiplication of field cardinalities and appends text fields
//! separately.

use serde::{Deserialize, Serialize};

use super::BlockKind;
use crate::grid::{Coord, Dir};

/// Rotation slot plus gravity-lock slot carried by directional kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Facing {
    pub rotation: Dir,
    pub gravity_locked: bool,
}

impl Facing {
    pub fn new(rotation: Dir, gravity_locked: bool) -> Self {
        Self { rotation, gravity_locked }
    }

    /// World direction this facing points to under `gravity`
    pub fn resolve(self, gravity: Dir) -> Dir {
        if self.gravity_locked {
            self.rotation.relative_to(gravity)
        } else {
            self.rotation
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reward {
    Achievement,
    Skin,
    BonusLevel,
}

/// Attribute record of one block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Attrs {
    #[default]
    Plain,
    Facing(Facing),
    Magnitude(u8),
    Spin(Spin),
    Timer { facing: Facing, delay: Option<u8> },
    Text(String),
    Unlock { reward: Reward, name: String },
}

/// One declared attribute field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSpec {
    /// One of a fixed list of names
    Choice(&'static [&'static str]),
    /// Integer in `0..=max`; `optional` adds an "absent" sentinel at `max + 1`
    Range { max: u32, optional: bool },
    /// Free text, stored outside the packed integer
    Text,
}

impl FieldSpec {
    /// Number of distinct packed values; text fields do not pack
    pub fn cardinality(self) -> u64 {
        match self {
            FieldSpec::Choice(names) => names.len() as u64,
            FieldSpec::Range { max, optional } => max as u64 + 1 + optional as u64,
            FieldSpec::Text => 1,
        }
    }
}

/// Generic value of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Choice(u32),
    Int(Option<u32>),
    Text(String),
}

pub mod layouts {
    use super::FieldSpec;

    pub const DIRECTIONS: &[&str] = &["up", "right", "down", "left"];
    pub const BOOL: &[&str] = &["no", "yes"];

    pub const FACING: &[FieldSpec] = &[FieldSpec::Choice(DIRECTIONS), FieldSpec::Choice(BOOL)];
    pub const MAGNITUDE: &[FieldSpec] = &[FieldSpec::Range { max: 10, optional: false }];
    pub const SPIN: &[FieldSpec] = &[FieldSpec::Choice(&["cw", "ccw"])];
    pub const TIMER: &[FieldSpec] = &[
        FieldSpec::Choice(DIRECTIONS),
        FieldSpec::Choice(BOOL),
        FieldSpec::Range { max: 99, optional: true },
    ];
    pub const TEXT: &[FieldSpec] = &[FieldSpec::Text];
    pub const UNLOCK: &[FieldSpec] = &[
        FieldSpec::Choice(&["achievement", "skin", "bonus"]),
        FieldSpec::Text,
    ];
}

fn facing_fields(f: Facing) -> [FieldValue; 2] {
    [
        FieldValue::Choice(f.rotation.index() as u32),
        FieldValue::Choice(f.gravity_locked as u32),
    ]
}

fn facing_from(rotation: &FieldValue, locked: &FieldValue) -> Option<Facing> {
    match (rotation, locked) {
        (FieldValue::Choice(r), FieldValue::Choice(l)) if *r < 4 && *l < 2 => {
            Some(Facing::new(Dir::from_index(*r as usize), *l == 1))
        }
        _ => None,
    }
}

impl Attrs {
    /// Flatten into generic field values in layout order
    pub fn to_fields(&self) -> Vec<FieldValue> {
        match self {
            Attrs::Plain => Vec::new(),
            Attrs::Facing(f) => facing_fields(*f).to_vec(),
            Attrs::Magnitude(m) => vec![FieldValue::Int(Some(*m as u32))],
            Attrs::Spin(s) => vec![FieldValue::Choice(match s {
                Spin::Clockwise => 0,
                Spin::CounterClockwise => 1,
            })],
            Attrs::Timer { facing, delay } => {
                let mut v = facing_fields(*facing).to_vec();
                v.push(FieldValue::Int(delay.map(u32::from)));
                v
            }
            Attrs::Text(t) => vec![FieldValue::Text(t.clone())],
            Attrs::Unlock { reward, name } => vec![
                FieldValue::Choice(match reward {
                    Reward::Achievement => 0,
                    Reward::Skin => 1,
                    Reward::BonusLevel => 2,
                }),
                FieldValue::Text(name.clone()),
            ],
        }
    }

    /// Rebuild the record for `kind` from generic values
    pub fn from_fields(kind: BlockKind, values: &[FieldValue]) -> Option<Attrs> {
        let attrs = match (kind.default_attrs(), values) {
            (Attrs::Plain, []) => Attrs::Plain,
            (Attrs::Facing(_), [r, l]) => Attrs::Facing(facing_from(r, l)?),
            (Attrs::Magnitude(_), [FieldValue::Int(Some(m))]) => Attrs::Magnitude(u8::try_from(*m).ok()?),
            (Attrs::Spin(_), [FieldValue::Choice(s)]) => Attrs::Spin(match s {
                0 => Spin::Clockwise,
                1 => Spin::CounterClockwise,
                _ => return None,
            }),
            (Attrs::Timer { .. }, [r, l, FieldValue::Int(delay)]) => Attrs::Timer {
                facing: facing_from(r, l)?,
                delay: match delay {
                    Some(d) => Some(u8::try_from(*d).ok()?),
                    None => None,
                },
            },
            (Attrs::Text(_), [FieldValue::Text(t)]) => Attrs::Text(t.clone()),
            (Attrs::Unlock { .. }, [FieldValue::Choice(r), FieldValue::Text(name)]) => Attrs::Unlock {
                reward: match r {
                    0 => Reward::Achievement,
                    1 => Reward::Skin,
                    2 => Reward::BonusLevel,
                    _ => return None,
                },
                name: name.clone(),
            },
            _ => return None,
        };
        attrs.fits(kind).then_some(attrs)
    }

    /// Whether this record is valid for `kind`'s layout
    pub fn fits(&self, kind: BlockKind) -> bool {
        let specs = kind.fields();
        let values = self.to_fields();
        if std::mem::discriminant(self) != std::mem::discriminant(&kind.default_attrs()) {
            return false;
        }
        specs.len() == values.len()
            && specs.iter().zip(&values).all(|(spec, value)| match (spec, value) {
                (FieldSpec::Choice(names), FieldValue::Choice(i)) => (*i as usize) < names.len(),
                (FieldSpec::Range { max, optional }, FieldValue::Int(v)) => match v {
                    Some(v) => v <= max,
                    None => *optional,
                },
                (FieldSpec::Text, FieldValue::Text(_)) => true,
                _ => false,
            })
    }
}

/// Product of all packed field cardinalities for `kind`
pub fn combinations(kind: BlockKind) -> u64 {
    kind.fields().iter().map(|f| f.cardinality()).product()
}

/// Pack `attrs` into one mixed-radix integer plus the text fields in order
pub fn pack(kind: BlockKind, attrs: &Attrs) -> Option<(u64, Vec<String>)> {
    if !attrs.fits(kind) {
        return None;
    }
    let mut packed = 0u64;
    let mut radix = 1u64;
    let mut texts = Vec::new();
    for (spec, value) in kind.fields().iter().zip(attrs.to_fields()) {
        let digit = match (spec, value) {
            (FieldSpec::Text, FieldValue::Text(t)) => {
                texts.push(t);
                continue;
            }
            (_, FieldValue::Choice(i)) => i as u64,
            (FieldSpec::Range { max, .. }, FieldValue::Int(v)) => v.map_or(*max as u64 + 1, u64::from),
            _ => return None,
        };
        packed += digit * radix;
        radix *= spec.cardinality();
    }
    Some((packed, texts))
}

/// Inverse of [`pack`]; `None` for out-of-range values
pub fn unpack(kind: BlockKind, mut packed: u64, texts: Vec<String>) -> Option<Attrs> {
    let mut texts = texts.into_iter();
    let mut values = Vec::with_capacity(kind.fields().len());
    for spec in kind.fields() {
        let value = match spec {
            FieldSpec::Text => FieldValue::Text(texts.next()?),
            FieldSpec::Choice(_) => FieldValue::Choice((packed % spec.cardinality()) as u32),
            FieldSpec::Range { max, .. } => {
                let v = (packed % spec.cardinality()) as u32;
                FieldValue::Int((v <= *max).then_some(v))
            }
        };
        if *spec != FieldSpec::Text {
            packed /= spec.cardinality();
        }
        values.push(value);
    }
    if packed != 0 || texts.next().is_some() {
        return None;
    }
    Attrs::from_fields(kind, &values)
}

/// Capability: carries a rotation slot
pub trait Directional {
    fn facing(&self) -> Option<Facing>;

    /// World direction under `gravity`
    fn pointing(&self, gravity: Dir) -> Option<Dir> {
        self.facing().map(|f| f.resolve(gravity))
    }

    /// The second cell a rotation-target kind acts on
    fn target(&self, origin: Coord, gravity: Dir) -> Option<Coord> {
        self.pointing(gravity).map(|d| origin.step(d))
    }
}

/// Capability: carries a numeric magnitude slot
pub trait VariableValue {
    fn magnitude(&self) -> Option<u8>;
}

/// Capability: carries a free-text slot
pub trait TextBearing {
    fn text(&self) -> Option<&str>;
}

impl Directional for Attrs {
    fn facing(&self) -> Option<Facing> {
        match self {
            Attrs::Facing(f) | Attrs::Timer { facing: f, .. } => Some(*f),
            _ => None,
        }
    }
}

impl VariableValue for Attrs {
    fn magnitude(&self) -> Option<u8> {
        match self {
            Attrs::Magnitude(m) => Some(*m),
            Attrs::Timer { delay, .. } => *delay,
            _ => None,
        }
    }
}

impl TextBearing for Attrs {
    fn text(&self) -> Option<&str> {
        match self {
            Attrs::Text(t) | Attrs::Unlock { name: t, .. } => Some(t.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_packs_least_significant_first() {
        let attrs = Attrs::Timer {
            facing: Facing::new(Dir::Left, true),
            delay: Some(7),
        };
        // rotation 3 + locked 1 * 4 + delay 7 * 8
        let (packed, texts) = pack(BlockKind::Activator, &attrs).unwrap();
        assert_eq!(packed, 3 + 4 + 7 * 8);
        assert!(texts.is_empty());
        assert_eq!(unpack(BlockKind::Activator, packed, texts), Some(attrs));
    }

    #[test]
    fn absent_delay_uses_sentinel_one_past_max() {
        let attrs = Attrs::Timer {
            facing: Facing::default(),
            delay: None,
        };
        let (packed, _) = pack(BlockKind::Activator, &attrs).unwrap();
        // rotation down = 2, unlocked, delay sentinel 100
        assert_eq!(packed, 2 + 100 * 8);
        assert_eq!(unpack(BlockKind::Activator, packed, vec![]), Some(attrs));
        assert_eq!(combinations(BlockKind::Activator), 4 * 2 * 101);
    }

    #[test]
    fn text_fields_travel_beside_the_integer() {
        let attrs = Attrs::Unlock {
            reward: Reward::Skin,
            name: "neon".into(),
        };
        let (packed, texts) = pack(BlockKind::Unlock, &attrs).unwrap();
        assert_eq!(packed, 1);
        assert_eq!(texts, vec!["neon".to_string()]);
        assert_eq!(unpack(BlockKind::Unlock, packed, texts), Some(attrs));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(unpack(BlockKind::Bounce, 11, vec![]), None);
        assert_eq!(unpack(BlockKind::GravityArrow, 8, vec![]), None);
        assert_eq!(unpack(BlockKind::Sign, 0, vec![]), None);
        assert!(pack(BlockKind::Ground, &Attrs::Magnitude(3)).is_none());
        assert!(!Attrs::Magnitude(11).fits(BlockKind::Bounce));
    }

    #[test]
    fn locked_facing_turns_with_gravity() {
        let locked = Attrs::Facing(Facing::new(Dir::Down, true));
        let free = Attrs::Facing(Facing::new(Dir::Down, false));
        assert_eq!(locked.pointing(Dir::Right), Some(Dir::Right));
        assert_eq!(free.pointing(Dir::Right), Some(Dir::Down));
        assert_eq!(locked.target(Coord::new(0, 0), Dir::Up), Some(Coord::new(0, -1)));
    }
}
