//! Decoders for the first three level formats
//!
//! These predate attributes, barriers and links. Levels were an 11×11 board
//! with one-based coordinates, lengths were always two digits and blocks had
//! their own small code table.

use std::collections::BTreeMap;

use super::digits::{LEGACY, Reader};
use super::strength_from_digit;
use crate::blocks::{Attrs, BlockKind, Facing};
use crate::grid::{Coord, Dir};
use crate::level::{Block, Gravity, LevelDef, LevelError};

/// Cells per side of the fixed legacy board
const BOARD: u32 = 11;

/// Block for a legacy code; `max` is the highest code the version knew
fn legacy_block(code: u32, max: u32) -> Option<Block> {
    if code > max {
        return None;
    }
    let kind = match code {
        0 => BlockKind::Air,
        1 => BlockKind::Ground,
        2 => BlockKind::Lava,
        3 => BlockKind::Goal,
        4 => BlockKind::Ice,
        5 => return Some(Block::with_attrs(BlockKind::Bounce, Attrs::Magnitude(8))),
        6..=9 => {
            let facing = Facing::new(Dir::from_index((code - 6) as usize), false);
            return Some(Block::with_attrs(BlockKind::GravityArrow, Attrs::Facing(facing)));
        }
        10 => BlockKind::Mud,
        11 => BlockKind::Water,
        _ => return None,
    };
    Some(Block::new(kind))
}

fn read_len(r: &mut Reader) -> Result<usize, LevelError> {
    Ok(r.number(2)? as usize)
}

fn read_coord(r: &mut Reader) -> Result<Coord, LevelError> {
    let mut axis = || match r.digit()? {
        d @ 1..=BOARD => Ok(d as i32 - 1),
        _ => Err(LevelError::corrupt(r.offset() - 1, "legacy coordinate off the board")),
    };
    let x = axis()?;
    let y = axis()?;
    Ok(Coord::new(x, y))
}

fn read_block(r: &mut Reader, max: u32) -> Result<Block, LevelError> {
    let code = r.digit()?;
    legacy_block(code, max).ok_or_else(|| LevelError::corrupt(r.offset() - 1, "unknown legacy block"))
}

fn read_gravity(r: &mut Reader) -> Result<Gravity, LevelError> {
    let direction = Dir::from_index(r.digit_below(4, "bad gravity direction")? as usize);
    let strength = strength_from_digit(r.digit_below(11, "bad gravity strength")?);
    Ok(Gravity::new(direction, strength))
}

fn stage(name: String, gravity: Gravity, players: Vec<Coord>, blocks: BTreeMap<Coord, Block>, version: u8) -> LevelDef {
    LevelDef {
        name,
        gravity,
        blocks,
        links: Vec::new(),
        players,
        center: Coord::default(),
        version,
        next: None,
    }
}

/// Fixed-length name, optional gravity, one start, a flat block list
fn read_flat(r: &mut Reader, version: u8, max: u32) -> Result<LevelDef, LevelError> {
    r.set_alphabet(LEGACY);
    let name_len = read_len(r)?;
    let name = r.chars(name_len)?;
    let gravity = if version >= 2 { read_gravity(r)? } else { Gravity::default() };
    let start = read_coord(r)?;

    let count = read_len(r)?;
    let mut blocks = BTreeMap::new();
    for _ in 0..count {
        let block = read_block(r, max)?;
        blocks.insert(read_coord(r)?, block);
    }
    Ok(stage(name, gravity, vec![start], blocks, version))
}

pub fn read_v1(r: &mut Reader) -> Result<LevelDef, LevelError> {
    read_flat(r, 1, 3)
}

pub fn read_v2(r: &mut Reader) -> Result<LevelDef, LevelError> {
    read_flat(r, 2, 9)
}

/// Several starts and blocks grouped by code
pub fn read_v3(r: &mut Reader) -> Result<LevelDef, LevelError> {
    r.set_alphabet(LEGACY);
    let name_len = read_len(r)?;
    let name = r.chars(name_len)?;
    let gravity = read_gravity(r)?;

    let player_count = r.digit()?;
    let players = (0..player_count).map(|_| read_coord(r)).collect::<Result<Vec<_>, _>>()?;

    let groups = read_len(r)?;
    let mut blocks = BTreeMap::new();
    for _ in 0..groups {
        let block = read_block(r, 11)?;
        let count = read_len(r)?;
        for _ in 0..count {
            blocks.insert(read_coord(r)?, block.clone());
        }
    }
    Ok(stage(name, gravity, players, blocks, 3))
}

#[cfg(test)]
mod tests {
    use crate::blocks::{Attrs, BlockKind, Facing};
    use crate::grid::{Coord, Dir};
    use crate::level::{Gravity, LevelError, decode};

    // Legacy digits: a=0 b=1 c=2 d=3 ... j=9 k=10 l=11

    #[test]
    fn version_one_flat_list() {
        // name "Hi", one-based start (1,1), ground at (1,2) and goal at (2,2)
        let level = decode("1acHibbacbbcdcc").unwrap();
        assert_eq!(level.name, "Hi");
        assert_eq!(level.players, vec![Coord::new(0, 0)]);
        assert_eq!(level.gravity, Gravity::default());
        assert_eq!(level.kind_at(Coord::new(0, 1)), BlockKind::Ground);
        assert_eq!(level.kind_at(Coord::new(1, 1)), BlockKind::Goal);
        assert_eq!(level.version, 5);
    }

    #[test]
    fn version_one_rejects_later_codes() {
        // ice (code 4) did not exist yet
        assert!(matches!(decode("1acHibbabebb"), Err(LevelError::Corrupt { .. })));
    }

    #[test]
    fn version_two_reads_gravity_and_arrows() {
        // name "G", gravity left at -0.5, one-based start (3,3), an up arrow at (4,4)
        let level = decode("2abGdcddabgee").unwrap();
        assert_eq!(level.gravity, Gravity::new(Dir::Left, -0.5));
        assert_eq!(level.players, vec![Coord::new(2, 2)]);
        let arrow = level.block_at(Coord::new(3, 3)).unwrap();
        assert_eq!(arrow.kind, BlockKind::GravityArrow);
        assert_eq!(arrow.attrs, Attrs::Facing(Facing::new(Dir::Up, false)));
    }

    #[test]
    fn version_three_groups_blocks_and_drops_air() {
        // name "W", gravity down -1, two starts, groups: water ×2, air ×1
        let level = decode("3abWcecbbkkaclacbccbaabdd").unwrap();
        assert_eq!(level.players, vec![Coord::new(0, 0), Coord::new(9, 9)]);
        assert_eq!(level.kind_at(Coord::new(0, 1)), BlockKind::Water);
        assert_eq!(level.kind_at(Coord::new(1, 0)), BlockKind::Water);
        assert!(level.block_at(Coord::new(2, 2)).is_none());
        assert_eq!(level.blocks.len(), 2);
    }

    #[test]
    fn off_board_coordinates_are_corrupt() {
        // x = 0 is below the one-based range
        assert!(matches!(decode("1abXabaa"), Err(LevelError::Corrupt { .. })));
    }
}
