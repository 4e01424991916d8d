//! Gravity Grid entry point
//!
//! Headless front end: lists the editor palette, checks every stored level and
//! can play a level with fixed controls to see how it ends.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use gravity_grid::blocks::palette;
use gravity_grid::host::{Headless, TickInput};
use gravity_grid::settings::{Pace, Settings};
use gravity_grid::store::{Bucket, LevelStore};
use gravity_grid::{PlaySession, SessionStatus};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Offer admin-only blocks (anchors, crash blocks) in the palette.
    #[arg(long)]
    admin: bool,
    /// Settings file to read.
    #[arg(long, value_name = "FILE", default_value = Settings::FILE_NAME)]
    settings: PathBuf,
    /// Level folder; overrides the settings file.
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Play this custom level headlessly after validation.
    #[arg(long, value_name = "NAME")]
    play: Option<String>,
    /// Physics pace (smooth, balanced, light); overrides the settings file.
    #[arg(long, value_name = "PACE", value_parser = parse_pace)]
    pace: Option<Pace>,
    /// Frames to play before giving up.
    #[arg(long, value_name = "FRAMES", default_value_t = 3600)]
    frames: u32,
    /// Hold right while playing.
    #[arg(long)]
    right: bool,
    /// Hold jump while playing.
    #[arg(long)]
    jump: bool,
}

fn parse_pace(s: &str) -> Result<Pace, String> {
    Pace::parse(s).ok_or_else(|| {
        let names: Vec<&str> = Pace::ALL.iter().map(|p| p.as_str()).collect();
        format!("unknown pace {s:?}, expected one of {}", names.join(", "))
    })
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = CliArgs::parse();
    let settings = Settings::load(&args.settings);
    let admin = args.admin || settings.admin;
    let store = LevelStore::new(args.root.clone().unwrap_or_else(|| settings.levels_root.clone()));

    let kinds: Vec<&str> = palette(admin).iter().map(|k| k.name()).collect();
    log::info!("palette ({} kinds{}): {}", kinds.len(), if admin { ", admin" } else { "" }, kinds.join(", "));

    let results = match store.validate_all() {
        Ok(results) => results,
        Err(e) => {
            log::error!("cannot read levels under {}: {e}", store.root().display());
            return ExitCode::FAILURE;
        }
    };
    let mut broken = 0;
    for (bucket, name, result) in &results {
        match result {
            Ok(level) => log::info!("{}/{name}: ok, {} stage(s)", bucket.dir_name(), level.stages().count()),
            Err(e) => {
                broken += 1;
                log::warn!("{}/{name}: {e}", bucket.dir_name());
            }
        }
    }
    log::info!("{} level(s) checked, {broken} broken", results.len());

    if let Some(name) = &args.play {
        let level = match store.load(Bucket::Custom, name) {
            Ok(level) => level,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        };
        let seed = settings.seed.unwrap_or_else(rand::random);
        let pace = args.pace.unwrap_or(settings.pace);
        log::info!("playing {name:?} at {} pace, seed {seed}", pace.as_str());
        let mut session = PlaySession::prepare(&level, seed, pace.frame_skip());
        let input = TickInput {
            jump: args.jump,
            right: args.right,
            left: false,
        };
        let mut host = Headless::with_settings(input, &settings);

        let mut status = SessionStatus::Playing;
        for _ in 0..args.frames {
            status = match session.step(&mut host) {
                Ok(status) => status,
                Err(e) => {
                    log::error!("{name}: {e}");
                    return ExitCode::FAILURE;
                }
            };
            if status != SessionStatus::Playing {
                break;
            }
        }
        log::info!(
            "{name}: {status:?} after {} frames, {} coin(s), {} host event(s)",
            session.frame(),
            session.coins(),
            host.events.len()
        );
    }

    if broken > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
