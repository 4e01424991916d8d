use std::collections::BTreeMap;

use super::digits::{MODERN, Reader, unzigzag};
use super::{STAGE_SEPARATOR, attr_width, barrier_from_flags, legacy, strength_from_digit};
use crate::blocks::{BlockKind, FieldSpec, attrs};
use crate::grid::{Coord, Dir};
use crate::level::{Barrier, Block, Gravity, LevelDef, LevelError, upgrade};

/// Zig-zag coordinates wider than this cannot come from an `i32`
const MAX_COORD_WIDTH: u64 = 5;

/// Decode a level string of any known version, then upgrade it
pub fn decode(text: &str) -> Result<LevelDef, LevelError> {
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix(STAGE_SEPARATOR))
        .unwrap_or(text);
    let mut r = Reader::new(text);

    let mut stages = Vec::new();
    loop {
        stages.push(read_stage(&mut r)?);
        match r.peek() {
            None => break,
            Some(STAGE_SEPARATOR) => {
                r.raw()?;
            }
            Some(_) => return Err(r.corrupt("trailing data after stage")),
        }
    }
    log::debug!("decoded {} stage(s) from {} characters", stages.len(), r.offset());

    let mut chain = stages.pop().ok_or_else(|| r.corrupt("no stages"))?;
    while let Some(mut prev) = stages.pop() {
        prev.next = Some(Box::new(chain));
        chain = prev;
    }
    upgrade(&mut chain);
    Ok(chain)
}

fn read_stage(r: &mut Reader) -> Result<LevelDef, LevelError> {
    let tag = r.peek().ok_or(LevelError::BadVersion { tag: None })?;
    match tag {
        '1'..='5' => {
            r.raw()?;
        }
        other => return Err(LevelError::BadVersion { tag: Some(other) }),
    }
    match tag {
        '1' => legacy::read_v1(r),
        '2' => legacy::read_v2(r),
        '3' => legacy::read_v3(r),
        '4' => read_modern(r, 4),
        _ => read_modern(r, 5),
    }
}

/// How a modern stage stores coordinates
#[derive(Clone, Copy)]
enum CoordFormat {
    /// Version 4: one unsigned digit per axis
    Unsigned,
    /// Version 5: zig-zag signed, fixed width per axis
    Signed { x: usize, y: usize },
}

impl CoordFormat {
    fn read(self, r: &mut Reader) -> Result<Coord, LevelError> {
        match self {
            CoordFormat::Unsigned => {
                let x = r.digit()? as i32;
                let y = r.digit()? as i32;
                Ok(Coord::new(x, y))
            }
            CoordFormat::Signed { x, y } => {
                let cx = unzigzag(r.number(x)?).ok_or_else(|| r.corrupt("x coordinate out of range"))?;
                let cy = unzigzag(r.number(y)?).ok_or_else(|| r.corrupt("y coordinate out of range"))?;
                Ok(Coord::new(cx, cy))
            }
        }
    }

    fn read_many(self, r: &mut Reader) -> Result<Vec<Coord>, LevelError> {
        let n = r.count()?;
        (0..n).map(|_| self.read(r)).collect()
    }
}

fn read_width(r: &mut Reader) -> Result<usize, LevelError> {
    let w = r.length()?;
    if w == 0 || w > MAX_COORD_WIDTH {
        return Err(r.corrupt("bad coordinate width"));
    }
    Ok(w as usize)
}

fn read_kind(r: &mut Reader) -> Result<BlockKind, LevelError> {
    let code = r.digit()?;
    BlockKind::from_code(code).ok_or_else(|| r.corrupt("unknown block kind"))
}

fn read_block(r: &mut Reader) -> Result<Block, LevelError> {
    let kind = read_kind(r)?;

    let barrier_count = r.count()?;
    let mut barriers = Vec::with_capacity(barrier_count);
    for _ in 0..barrier_count {
        let barrier_kind = read_kind(r)?;
        let flags = r.digit()?;
        let (locked, sides) = barrier_from_flags(flags).ok_or_else(|| r.corrupt("bad barrier flags"))?;
        barriers.push(Barrier::new(barrier_kind, locked, sides));
    }

    let packed = r.number(attr_width(kind))?;
    let text_fields = kind.fields().iter().filter(|f| **f == FieldSpec::Text).count();
    let texts = (0..text_fields).map(|_| r.text()).collect::<Result<Vec<_>, _>>()?;
    let attrs = attrs::unpack(kind, packed, texts).ok_or_else(|| r.corrupt("attributes out of range"))?;

    Ok(Block {
        kind,
        barriers,
        attrs,
        link: None,
    })
}

/// Versions 4 and 5
fn read_modern(r: &mut Reader, version: u8) -> Result<LevelDef, LevelError> {
    r.set_alphabet(MODERN);
    let name = r.text()?;

    let (format, center) = if version >= 5 {
        let x = read_width(r)?;
        let y = read_width(r)?;
        let format = CoordFormat::Signed { x, y };
        let center = format.read(r)?;
        (format, center)
    } else {
        (CoordFormat::Unsigned, Coord::default())
    };

    let direction = Dir::from_index(r.digit_below(4, "bad gravity direction")? as usize);
    let strength = strength_from_digit(r.digit_below(11, "bad gravity strength")?);
    let players = format.read_many(r)?;

    let mut blocks = BTreeMap::new();
    let groups = r.count()?;
    for _ in 0..groups {
        let block = read_block(r)?;
        for c in format.read_many(r)? {
            blocks.insert(c, block.clone());
        }
    }

    let link_count = r.count()?;
    let links = (0..link_count)
        .map(|_| format.read_many(r))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LevelDef {
        name,
        gravity: Gravity::new(direction, strength),
        blocks,
        links,
        players,
        center,
        version,
        next: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Attrs, Facing, Reward};
    use crate::level::encode;

    fn sample() -> LevelDef {
        let mut level = LevelDef::blank("Sample level");
        level.gravity = Gravity::new(Dir::Left, -1.75);
        level.players = vec![Coord::new(-2, 5), Coord::new(3, 5)];
        for x in -3..=4 {
            level.set_block(Coord::new(x, 6), Block::new(BlockKind::Ground));
        }
        level.set_block(
            Coord::new(-120, 9),
            Block::with_attrs(
                BlockKind::Activator,
                Attrs::Timer {
                    facing: Facing::new(Dir::Up, true),
                    delay: Some(42),
                },
            ),
        );
        level.set_block(
            Coord::new(1, 1),
            Block::with_attrs(
                BlockKind::Unlock,
                Attrs::Unlock {
                    reward: Reward::Skin,
                    name: "línea\nnueva".into(),
                },
            ),
        );
        level.set_block(
            Coord::new(2, 2),
            Block::new(BlockKind::Ice).with_barrier(Barrier::new(BlockKind::Lava, true, [true, false, false, true])),
        );
        level.set_block(Coord::new(7, 7), Block::new(BlockKind::Portal));
        level.add_link([Coord::new(7, 7), Coord::new(-9, 300)]);
        level.center = Coord::new(0, 3);
        level
    }

    #[test]
    fn round_trip_preserves_everything() {
        let mut level = sample();
        level.push_stage(LevelDef::blank("second"));
        let decoded = decode(&encode(&level)).unwrap();
        assert_eq!(decoded, level);
    }

    #[test]
    fn trailing_newline_is_tolerated() {
        let level = sample();
        let text = encode(&level) + "\r\n";
        assert_eq!(decode(&text).unwrap(), level);
    }

    #[test]
    fn unknown_tags_are_bad_versions() {
        assert!(matches!(decode(""), Err(LevelError::BadVersion { tag: None })));
        assert!(matches!(decode("9abc"), Err(LevelError::BadVersion { tag: Some('9') })));
        let second = encode(&LevelDef::blank("x")) + "\n7";
        assert!(matches!(decode(&second), Err(LevelError::BadVersion { tag: Some('7') })));
    }

    #[test]
    fn truncated_input_is_corrupt_at_every_cut() {
        let text = encode(&sample());
        let chars: Vec<char> = text.chars().collect();
        for cut in 1..chars.len() {
            let prefix: String = chars[..cut].iter().collect();
            match decode(&prefix) {
                Err(LevelError::Corrupt { .. }) => {}
                other => panic!("cut at {cut}: {other:?}"),
            }
        }
    }

    #[test]
    fn garbage_after_a_stage_is_corrupt() {
        let text = encode(&LevelDef::blank("x")) + "zz";
        assert!(matches!(decode(&text), Err(LevelError::Corrupt { .. })));
    }

    #[test]
    fn out_of_range_attributes_are_corrupt() {
        let mut level = LevelDef::blank("b");
        level.set_block(Coord::new(0, 1), Block::with_attrs(BlockKind::Bounce, Attrs::Magnitude(10)));
        let text = encode(&level);
        // Bounce magnitude 10 is stored as the digit 'A'; 11 is 'B'
        let broken = text.replacen("A", "B", 1);
        assert_ne!(broken, text);
        assert!(matches!(decode(&broken), Err(LevelError::Corrupt { .. })));
    }

    #[test]
    fn version_four_uses_unsigned_single_digit_coordinates() {
        // tag, name "v4", gravity right/-1, one player (1,2), one group:
        // ground with no barriers at (0,3) (1,3), no links
        let text = "42v4141121101020313010";
        let level = decode(text).unwrap();
        assert_eq!(level.version, 5);
        assert_eq!(level.gravity, Gravity::new(Dir::Right, -1.0));
        assert_eq!(level.players, vec![Coord::new(1, 2)]);
        assert_eq!(level.kind_at(Coord::new(0, 3)), BlockKind::Ground);
        assert_eq!(level.kind_at(Coord::new(1, 3)), BlockKind::Ground);
        // Center is derived from the content bounds
        assert_eq!(level.center, Coord::new(0, 2));
    }
}
