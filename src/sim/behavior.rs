//! Per-kind reactions
//!
//! `collide` receives every record filed under one kind during a step. Solid
//! kinds only stop the player for records that came from the player itself;
//! relayed records (links, schedules) act as remote triggers.

use rand::Rng;

use super::SimError;
use super::collision::Collision;
use super::player::{Player, dir_vec};
use super::world::World;
use crate::blocks::{Attrs, BlockKind, Directional, Reward, Spin, TextBearing, VariableValue};
use crate::consts::{BOOST_IMPULSE, DEFAULT_ACTIVATOR_DELAY, GRAVITY_STEP};
use crate::grid::{Coord, Dir};
use crate::host::Host;
use crate::level::Gravity;

pub fn collide(
    kind: BlockKind,
    mut records: Vec<Collision>,
    world: &mut World,
    player: &mut Player,
    host: &mut dyn Host,
) -> Result<(), SimError> {
    let gravity = world.gravity.direction;
    let first_local = records.iter().find(|r| r.local).cloned();

    match kind {
        BlockKind::Air | BlockKind::Anchor | BlockKind::Water => {}

        BlockKind::Ground | BlockKind::Ice | BlockKind::Mud => {
            if let Some(r) = first_local {
                player.correct(r.direction, r.coord, gravity);
            }
        }

        BlockKind::Door => {
            for r in &records {
                if r.local {
                    player.correct(r.direction, r.coord, gravity);
                } else {
                    world.replace(r.coord, BlockKind::OpenDoor);
                }
            }
        }

        BlockKind::OpenDoor => {
            for r in records.iter().filter(|r| !r.local) {
                world.replace(r.coord, BlockKind::Door);
            }
        }

        BlockKind::Bounce => {
            if let Some(r) = first_local {
                let incoming = player.momentum.dot(dir_vec(r.direction));
                let already = player.corrected;
                player.correct(r.direction, r.coord, gravity);
                if !already {
                    let strength = f64::from(r.attrs.magnitude().unwrap_or(0)) / 10.0;
                    player.momentum -= dir_vec(r.direction) * incoming.max(0.0) * strength;
                    player.grounded = false;
                }
            }
        }

        BlockKind::Breakable => {
            records.reverse();
            for r in records.iter().filter(|r| r.local) {
                player.correct(r.direction, r.coord, gravity);
                world.replace(r.coord, BlockKind::Air);
            }
        }

        BlockKind::Lava => {
            if first_local.is_some() {
                log::debug!("player died in lava at tick {}", world.tick_time);
                player.alive = false;
            }
        }

        BlockKind::Crash => {
            if let Some(r) = first_local {
                return Err(SimError::IntentionalCrash { at: r.coord });
            }
        }

        BlockKind::Goal => {
            if first_local.is_some() {
                player.won = true;
            }
        }

        BlockKind::GravityArrow => {
            for r in records.iter().filter(|r| r.local) {
                if let Some(dir) = r.attrs.pointing(world.gravity.direction) {
                    world.gravity.direction = dir;
                }
            }
        }

        BlockKind::GravityStrength => {
            if let Some(m) = first_local.and_then(|r| r.attrs.magnitude()) {
                world.gravity = Gravity::new(world.gravity.direction, -f64::from(m) * GRAVITY_STEP);
            }
        }

        BlockKind::GravityRotate => {
            if let Some(r) = first_local {
                let turns = match r.attrs {
                    Attrs::Spin(Spin::CounterClockwise) => 3,
                    _ => 1,
                };
                world.gravity.direction = gravity.rotate(turns);
            }
        }

        BlockKind::GravityRandom => {
            if first_local.is_some() {
                world.gravity.direction = Dir::from_index(world.rng.random_range(0..4));
            }
        }

        BlockKind::Portal => {
            if let Some(r) = first_local {
                let exit = r.link.and_then(|i| {
                    let group = &world.links[i];
                    let here = group.iter().position(|c| *c == r.coord)?;
                    Some(group[(here + 1) % group.len()])
                });
                if let Some(exit) = exit.filter(|e| *e != r.coord) {
                    log::debug!("portal {:?} -> {:?}", r.coord, exit);
                    player.teleport(exit);
                    player.stop = true;
                }
            }
        }

        BlockKind::Activator => {
            for (r, target) in targets(kind, &records, gravity) {
                let delay = r.attrs.magnitude().map_or(DEFAULT_ACTIVATOR_DELAY, u64::from);
                player.schedule(target, r.direction, world.tick_time.saturating_add(delay));
            }
        }

        BlockKind::Builder => {
            for (_, target) in targets(kind, &records, gravity) {
                if !world.blocks.contains_key(&target) {
                    world.replace(target, BlockKind::Ground);
                }
            }
        }

        BlockKind::Remover => {
            for (_, target) in targets(kind, &records, gravity) {
                world.replace(target, BlockKind::Air);
            }
        }

        BlockKind::Coin => {
            for r in records.iter().filter(|r| r.local) {
                world.coins += 1;
                world.replace(r.coord, BlockKind::Air);
            }
        }

        BlockKind::Sign => {
            for r in records.iter().filter(|r| r.local) {
                if world.announced.insert(r.coord) {
                    host.announce(r.attrs.text().unwrap_or_default());
                }
            }
        }

        BlockKind::Unlock => {
            for r in records.iter().filter(|r| r.local) {
                if let Attrs::Unlock { reward, name } = &r.attrs {
                    match reward {
                        Reward::Achievement => host.achievement_unlock(name),
                        Reward::Skin => {
                            host.skin_unlock(name);
                            let preview = BlockKind::Unlock.render(&r.attrs, gravity, 2.0);
                            host.alert(&format!("Unlocked skin: {name}"), Some(&preview));
                        }
                        Reward::BonusLevel => host.bonus_level_unlock(name),
                    }
                }
                world.replace(r.coord, BlockKind::Air);
            }
        }

        BlockKind::Booster => {
            if let Some(dir) = first_local.and_then(|r| r.attrs.pointing(gravity)) {
                player.momentum += dir_vec(dir) * BOOST_IMPULSE;
            }
        }
    }
    Ok(())
}

/// The cell each record's block points at, for kinds that act on a second cell
fn targets(kind: BlockKind, records: &[Collision], gravity: Dir) -> Vec<(&Collision, Coord)> {
    if !kind.is_rotation_target() {
        return Vec::new();
    }
    records
        .iter()
        .filter_map(|r| r.attrs.target(r.coord, gravity).map(|t| (r, t)))
        .collect()
}
