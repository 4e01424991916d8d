//! Collision detection and bucketed execution
//!
//! Detection turns the cells a player is entering into `Collision` records and
//! files each under its kind's bucket. Execution then walks the priority table
//! so that, for example, lava is always resolved before a goal touched in the
//! same step.

use std::collections::BTreeSet;

use super::behavior;
use super::player::Player;
use super::priority::Entry;
use super::world::World;
use super::SimError;
use crate::blocks::Attrs;
use crate::grid::{Coord, Dir};
use crate::host::Host;

/// One cell reacting to one player
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// Direction the player was moving
    pub direction: Dir,
    /// False when the record was relayed through a link or a schedule
    pub local: bool,
    pub coord: Coord,
    pub attrs: Attrs,
    pub link: Option<usize>,
}

/// File records for `cells` into the player's buckets.
///
/// Each cell is considered once per call. Barriers decide the kind before the
/// bucket is chosen, and every other member of a touched cell's link group
/// receives a relayed record.
pub fn get_collisions(
    world: &World,
    player: &mut Player,
    cells: impl IntoIterator<Item = Coord>,
    direction: Dir,
    local: bool,
) {
    let mut seen = BTreeSet::new();
    let mut pending: Vec<(Coord, bool)> = cells.into_iter().map(|c| (c, local)).collect();
    pending.reverse();

    while let Some((coord, local)) = pending.pop() {
        if !seen.insert(coord) {
            continue;
        }
        let kind = world.effective_kind(coord, direction);
        if let Some(slot) = world.table.slot(kind) {
            let block = world.blocks.get(&coord);
            player.buckets[slot].push(Collision {
                direction,
                local,
                coord,
                attrs: block.map(|b| b.attrs.clone()).unwrap_or_default(),
                link: world.link_of(coord),
            });
        }
        let relayed: Vec<Coord> = world.linked(coord).filter(|c| !seen.contains(c)).collect();
        // Relays run before the remaining cells so link groups stay together
        pending.extend(relayed.into_iter().rev().map(|c| (c, false)));
    }
}

/// Run every filled bucket in priority order.
///
/// Stops at the next phase boundary once the player is dead or has won; any
/// buckets left behind are discarded.
pub fn execute_collisions(world: &mut World, player: &mut Player, host: &mut dyn Host) -> Result<(), SimError> {
    let result = run_buckets(world, player, host);
    for bucket in &mut player.buckets {
        bucket.clear();
    }
    result
}

fn run_buckets(world: &mut World, player: &mut Player, host: &mut dyn Host) -> Result<(), SimError> {
    let entries = world.table.entries().to_vec();
    for entry in entries {
        match entry {
            Entry::Separator => {
                if !player.alive || player.won {
                    break;
                }
            }
            Entry::Kind { kind, slot } => {
                let records = std::mem::take(&mut player.buckets[slot]);
                if records.is_empty() {
                    continue;
                }
                if kind.movement().is_some() && records.iter().any(|r| r.local) {
                    player.touching.insert(kind);
                }
                behavior::collide(kind, records, world, player, host)?;
            }
        }
    }
    Ok(())
}
