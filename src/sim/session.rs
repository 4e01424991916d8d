//! Play sessions
//!
//! A session owns a private copy of a level chain and plays one stage at a
//! time. Winning a stage moves on to the next one; restarting re-prepares the
//! current stage from the untouched copy.

use super::player::Player;
use super::tick::{interpolate, tick};
use super::world::World;
use super::SimError;
use crate::host::{Host, TickInput};
use crate::level::LevelDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Playing,
    /// Every stage of the chain was cleared
    Won,
    /// Every player of the current stage died
    Lost,
}

pub struct PlaySession {
    stages: Vec<LevelDef>,
    stage: usize,
    seed: u64,
    frame_skip: u32,
    frame: u64,
    /// Coins banked from cleared stages
    banked_coins: u32,
    status: SessionStatus,
    world: World,
    players: Vec<Player>,
}

impl PlaySession {
    /// Prepare a session for `level` and its chained stages.
    ///
    /// Physics integrates on one frame in every `frame_skip + 1`; frames in
    /// between only interpolate display positions.
    pub fn prepare(level: &LevelDef, seed: u64, frame_skip: u32) -> Self {
        let stages: Vec<LevelDef> = level
            .stages()
            .map(|s| LevelDef {
                next: None,
                ..s.clone()
            })
            .collect();
        let (world, players) = Self::load_stage(&stages[0], seed);
        log::info!("prepared {:?}: {} stage(s), seed {seed}", level.name, stages.len());
        Self {
            stages,
            stage: 0,
            seed,
            frame_skip,
            frame: 0,
            banked_coins: 0,
            status: SessionStatus::Playing,
            world,
            players,
        }
    }

    fn load_stage(stage: &LevelDef, seed: u64) -> (World, Vec<Player>) {
        let world = World::new(stage, seed);
        let players = stage
            .players
            .iter()
            .map(|start| Player::spawn(*start, world.table.len()))
            .collect();
        (world, players)
    }

    /// Advance one frame
    pub fn step(&mut self, host: &mut dyn Host) -> Result<SessionStatus, SimError> {
        if self.status != SessionStatus::Playing {
            return Ok(self.status);
        }

        let integrate = self.frame % (u64::from(self.frame_skip) + 1) == 0;
        self.frame += 1;
        if !integrate {
            for player in &mut self.players {
                interpolate(&self.world, player);
            }
            return Ok(self.status);
        }

        tick(&mut self.world, &mut self.players, TickInput::poll(host), host)?;

        if self.players.iter().any(|p| p.won) {
            self.banked_coins += self.world.coins;
            if self.stage + 1 < self.stages.len() {
                log::info!("stage {} cleared, entering {:?}", self.stage, self.stages[self.stage + 1].name);
                self.stage += 1;
                self.reload();
            } else {
                log::info!("level cleared after {} frames", self.frame);
                self.status = SessionStatus::Won;
            }
        } else if !self.players.is_empty() && self.players.iter().all(|p| !p.alive) {
            log::info!("all players lost on stage {}", self.stage);
            self.status = SessionStatus::Lost;
        }
        Ok(self.status)
    }

    /// Start the current stage over
    pub fn restart(&mut self) {
        log::info!("restarting stage {}", self.stage);
        self.status = SessionStatus::Playing;
        self.reload();
    }

    fn reload(&mut self) {
        let seed = self.seed.wrapping_add(self.stage as u64);
        let (world, players) = Self::load_stage(&self.stages[self.stage], seed);
        self.world = world;
        self.players = players;
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Index into the chain of the stage being played
    pub fn stage_index(&self) -> usize {
        self.stage
    }

    pub fn stage(&self) -> &LevelDef {
        &self.stages[self.stage]
    }

    /// Coins from cleared stages plus the current one
    pub fn coins(&self) -> u32 {
        self.banked_coins + self.world.coins
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Attrs, BlockKind};
    use crate::grid::Coord;
    use crate::host::Headless;
    use crate::level::Block;

    /// Ground under the start with `kind` in the floor one cell to the right
    fn run_level(kind: BlockKind) -> LevelDef {
        let mut level = LevelDef::blank(kind.name());
        for x in -1..=4 {
            level.set_block(Coord::new(x, 1), Block::new(BlockKind::Ground));
        }
        level.set_block(Coord::new(2, 0), Block::new(kind));
        level
    }

    fn play(session: &mut PlaySession, host: &mut Headless, frames: usize) -> SessionStatus {
        let mut status = session.status();
        for _ in 0..frames {
            status = session.step(host).unwrap();
            if status != SessionStatus::Playing {
                break;
            }
        }
        status
    }

    fn walking() -> Headless {
        Headless::new(TickInput {
            right: true,
            ..Default::default()
        })
    }

    #[test]
    fn walking_into_the_goal_wins() {
        let level = run_level(BlockKind::Goal);
        let mut session = PlaySession::prepare(&level, 1, 0);
        assert_eq!(play(&mut session, &mut walking(), 300), SessionStatus::Won);
    }

    #[test]
    fn walking_into_lava_loses() {
        let level = run_level(BlockKind::Lava);
        let mut session = PlaySession::prepare(&level, 1, 0);
        assert_eq!(play(&mut session, &mut walking(), 300), SessionStatus::Lost);
        // Terminal status is sticky
        assert_eq!(session.step(&mut walking()).unwrap(), SessionStatus::Lost);
    }

    #[test]
    fn chained_stages_play_in_order() {
        let mut level = run_level(BlockKind::Goal);
        level.push_stage(run_level(BlockKind::Goal));
        let mut session = PlaySession::prepare(&level, 1, 0);
        let mut host = walking();

        let mut saw_second = false;
        for _ in 0..600 {
            if session.step(&mut host).unwrap() != SessionStatus::Playing {
                break;
            }
            saw_second |= session.stage_index() == 1;
        }
        assert!(saw_second);
        assert_eq!(session.status(), SessionStatus::Won);
    }

    #[test]
    fn coins_are_collected_and_restart_restores_them() {
        let level = run_level(BlockKind::Coin);
        let mut session = PlaySession::prepare(&level, 1, 0);
        play(&mut session, &mut walking(), 120);
        assert_eq!(session.coins(), 1);
        assert_eq!(session.world().kind_at(Coord::new(2, 0)), BlockKind::Air);
        // The source level is untouched and restart rebuilds from it
        assert_eq!(level.kind_at(Coord::new(2, 0)), BlockKind::Coin);
        session.restart();
        assert_eq!(session.coins(), 0);
        assert_eq!(session.world().kind_at(Coord::new(2, 0)), BlockKind::Coin);
    }

    #[test]
    fn frame_skip_interpolates_between_ticks() {
        let level = run_level(BlockKind::Goal);
        let mut session = PlaySession::prepare(&level, 1, 2);
        let mut host = walking();
        for _ in 0..6 {
            session.step(&mut host).unwrap();
        }
        assert_eq!(session.frame(), 6);
        assert_eq!(session.world().tick_time, 2);
    }

    #[test]
    fn crash_blocks_surface_as_errors() {
        let level = run_level(BlockKind::Crash);
        let mut session = PlaySession::prepare(&level, 1, 0);
        let mut host = walking();
        let err = (0..300).find_map(|_| session.step(&mut host).err());
        assert!(matches!(err, Some(SimError::IntentionalCrash { at }) if at == Coord::new(2, 0)));
    }

    #[test]
    fn same_seed_same_run() {
        let mut level = run_level(BlockKind::Goal);
        level.set_block(Coord::new(1, -2), Block::new(BlockKind::GravityRandom));
        level.set_block(
            Coord::new(0, -3),
            Block::with_attrs(BlockKind::Bounce, Attrs::Magnitude(9)),
        );
        let trace = |seed| {
            let mut session = PlaySession::prepare(&level, seed, 1);
            let mut host = Headless::new(TickInput {
                jump: true,
                right: true,
                ..Default::default()
            });
            (0..200)
                .map(|_| {
                    session.step(&mut host).unwrap();
                    let p = &session.players()[0];
                    (p.pos.x.to_bits(), p.pos.y.to_bits(), p.display.y.to_bits())
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(trace(42), trace(42));
    }

    #[test]
    fn levels_at_the_edge_of_the_grid_play() {
        let edge = i32::MAX - 3;
        let mut level = LevelDef::blank("far");
        for x in edge - 2..=i32::MAX {
            level.set_block(Coord::new(x, 1), Block::new(BlockKind::Ground));
        }
        level.players = vec![Coord::new(edge, 0)];
        let level = crate::level::decode(&crate::level::encode(&level)).unwrap();

        let mut session = PlaySession::prepare(&level, 1, 1);
        assert_eq!(play(&mut session, &mut walking(), 240), SessionStatus::Playing);
        let (_, hi) = session.world().bounds;
        let p = &session.players()[0];
        assert!(p.alive);
        assert!(p.grounded);
        assert!(p.pos.x <= hi.origin().0 + crate::consts::CELL_SIZE);
    }

    #[test]
    fn stages_without_players_keep_playing() {
        let mut level = run_level(BlockKind::Goal);
        level.players.clear();
        let mut session = PlaySession::prepare(&level, 1, 0);
        assert_eq!(play(&mut session, &mut walking(), 10), SessionStatus::Playing);
        assert_eq!(session.world().tick_time, 10);
    }
}
