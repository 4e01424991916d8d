//! Fixed timestep integration
//!
//! `integrate` advances the authoritative state by one tick. `interpolate`
//! only nudges the display position between integrated ticks and never runs
//! a reaction.

use glam::DVec2;

use super::SimError;
use super::collision::{execute_collisions, get_collisions};
use super::player::{Player, dir_vec, span};
use super::world::World;
use crate::blocks::Movement;
use crate::consts::*;
use crate::grid::{Coord, Dir};
use crate::host::{Host, TickInput};

/// Advance every active player by one fixed tick
pub fn tick(world: &mut World, players: &mut [Player], input: TickInput, host: &mut dyn Host) -> Result<(), SimError> {
    for player in players.iter_mut().filter(|p| p.alive && !p.won) {
        integrate(world, player, input, host)?;
    }
    world.tick_time += 1;
    Ok(())
}

/// Advance one player by one tick
pub fn integrate(world: &mut World, player: &mut Player, input: TickInput, host: &mut dyn Host) -> Result<(), SimError> {
    // Scheduled reactions arrive as remote triggers
    let due = player.take_due(world.tick_time);
    if !due.is_empty() {
        for (coord, scheduled) in due {
            get_collisions(world, player, [coord], scheduled.direction, false);
        }
        execute_collisions(world, player, host)?;
    }

    let movement = player
        .touching
        .iter()
        .filter_map(|k| k.movement())
        .fold(Movement::IDENTITY, Movement::blend);
    player.touching.clear();

    apply_controls(world, player, input, movement);

    for horizontal in [true, false] {
        sweep_axis(world, player, horizontal, host)?;
        if !player.alive || player.won {
            break;
        }
    }

    refresh_touching(world, player);
    clamp_to_bounds(world, player);
    player.display = player.pos;
    Ok(())
}

fn apply_controls(world: &World, player: &mut Player, input: TickInput, movement: Movement) {
    let gravity = world.gravity.direction;
    let down = dir_vec(gravity);
    let right = dir_vec(gravity.rotate(3));

    let accel = BASE_ACCEL * movement.accel;
    if input.right {
        player.momentum += right * accel;
    }
    if input.left {
        player.momentum -= right * accel;
    }
    if input.jump && player.grounded {
        let fall = player.momentum.dot(down);
        player.momentum -= down * (fall + BASE_JUMP * movement.jump);
    }
    player.grounded = false;

    player.momentum += down * (BASE_GRAVITY * -world.gravity.strength * movement.gravity);

    let keep = (1.0 - BASE_FRICTION * movement.friction).clamp(0.0, 1.0);
    let lateral = player.momentum.dot(right);
    player.momentum -= right * lateral * (1.0 - keep);

    player.momentum = player.momentum.clamp(DVec2::splat(-MAX_SPEED), DVec2::splat(MAX_SPEED));
}

/// Grid lines crossed moving `distance` from leading edge `edge`, in order.
///
/// A line exactly at the edge counts as crossed; one exactly at the
/// destination does not.
fn crossings(edge: f64, distance: f64) -> Vec<f64> {
    let mut lines = Vec::new();
    if distance > 0.0 {
        let mut line = (edge / CELL_SIZE).ceil() * CELL_SIZE;
        while line < edge + distance {
            lines.push(line);
            line += CELL_SIZE;
        }
    } else if distance < 0.0 {
        let mut line = (edge / CELL_SIZE).floor() * CELL_SIZE;
        while line > edge + distance {
            lines.push(line);
            line -= CELL_SIZE;
        }
    }
    lines
}

/// Cells just past grid line `line` along the axis, across the player's span.
///
/// Empty past the last representable cell.
fn entered_cells(pos: DVec2, horizontal: bool, line: f64, positive: bool) -> Vec<Coord> {
    let index = (line / CELL_SIZE).round() - if positive { 0.0 } else { 1.0 };
    if index < f64::from(i32::MIN) || index > f64::from(i32::MAX) {
        return Vec::new();
    }
    let index = index as i32;
    let lo = axis(pos, !horizontal);
    let hi = lo + PLAYER_SIZE;
    span(lo, hi)
        .map(|c| if horizontal { Coord::new(index, c) } else { Coord::new(c, index) })
        .collect()
}

fn axis(v: DVec2, horizontal: bool) -> f64 {
    if horizontal { v.x } else { v.y }
}

fn set_axis(v: &mut DVec2, horizontal: bool, value: f64) {
    if horizontal {
        v.x = value;
    } else {
        v.y = value;
    }
}

fn sweep_axis(world: &mut World, player: &mut Player, horizontal: bool, host: &mut dyn Host) -> Result<(), SimError> {
    player.stop = false;
    player.corrected = false;

    let distance = axis(player.momentum, horizontal);
    let positive = distance > 0.0;
    let direction = Dir::along(horizontal, positive);
    let start = axis(player.pos, horizontal);
    let edge = if positive { start + PLAYER_SIZE } else { start };

    for line in crossings(edge, distance) {
        set_axis(&mut player.pos, horizontal, if positive { line - PLAYER_SIZE } else { line });
        let cells = entered_cells(player.pos, horizontal, line, positive);
        get_collisions(world, player, cells, direction, true);
        execute_collisions(world, player, host)?;
        if player.stop || !player.alive || player.won {
            return Ok(());
        }
    }
    set_axis(&mut player.pos, horizontal, start + distance);
    Ok(())
}

/// Non-solid movement kinds the player sits inside stay in effect
fn refresh_touching(world: &World, player: &mut Player) {
    for cell in player.overlapped() {
        let kind = world.kind_at(cell);
        if !kind.solid() && kind.movement().is_some() {
            player.touching.insert(kind);
        }
    }
}

fn clamp_to_bounds(world: &World, player: &mut Player) {
    let (lo, hi) = world.bounds;
    let (min_x, min_y) = lo.origin();
    let (max_x, max_y) = hi.origin();
    let max = DVec2::new(max_x + CELL_SIZE - PLAYER_SIZE, max_y + CELL_SIZE - PLAYER_SIZE);
    let min = DVec2::new(min_x, min_y);
    for horizontal in [true, false] {
        let p = axis(player.pos, horizontal);
        let clamped = p.min(axis(max, horizontal)).max(axis(min, horizontal));
        if clamped != p {
            set_axis(&mut player.pos, horizontal, clamped);
            set_axis(&mut player.momentum, horizontal, 0.0);
        }
    }
}

/// Move the display position half a tick's momentum, halting at solid cells
pub fn interpolate(world: &World, player: &mut Player) {
    let step = player.momentum * 0.5;
    for horizontal in [true, false] {
        let distance = axis(step, horizontal);
        let positive = distance > 0.0;
        let direction = Dir::along(horizontal, positive);
        let start = axis(player.display, horizontal);
        let edge = if positive { start + PLAYER_SIZE } else { start };

        let mut target = start + distance;
        for line in crossings(edge, distance) {
            let blocked = entered_cells(player.display, horizontal, line, positive)
                .into_iter()
                .any(|c| world.is_solid(c, direction));
            if blocked {
                target = if positive { line - PLAYER_SIZE } else { line };
                break;
            }
        }
        set_axis(&mut player.display, horizontal, target);
    }
}
