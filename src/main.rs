//! Tile Tussle entry point
//!
//! Headless run: builds a walled arena, spawns every archetype, runs the
//! simulation for a fixed number of ticks and logs what happened.
//!
//! Usage: `tile-tussle [tuning.json] [seconds]`

use std::process::ExitCode;

use glam::IVec2;

use tile_tussle::consts::*;
use tile_tussle::sim::{EventLog, Faction, GameEvent, TickInput, World, tick};
use tile_tussle::{ConfigError, Tuning};

const ARENA_COLS: i32 = 40;
const ARENA_ROWS: i32 = 24;
const DEFAULT_SECONDS: f32 = 30.0;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Tile Tussle (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match load_tuning(args.next().as_deref()) {
        Ok(tuning) => tuning,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    let mut world = match build_arena(tuning) {
        Ok(world) => world,
        Err(err) => {
            log::error!("failed to populate arena: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let ticks = (seconds / SIM_DT).round() as u64;
    let mut events = EventLog::new();
    for i in 0..ticks {
        // lazy figure-eight so the player sweeps the room
        let input = TickInput {
            rotate_left: (i / 120) % 4 == 1,
            rotate_right: (i / 120) % 4 == 3,
        };
        tick(&mut world, &input, SIM_DT, &mut events);

        for event in events.drain() {
            match event {
                GameEvent::ActorDestroyed { kind, faction } => {
                    log::info!("[{:>7.2}s] {} ({}) destroyed", world.time, kind, faction.as_str());
                }
                GameEvent::HintShown(text) => {
                    log::info!("[{:>7.2}s] hint: {}", world.time, text);
                }
            }
        }
    }

    log::info!("Ran {} ticks ({:.1}s of simulation)", world.time_ticks, world.time);
    for faction in Faction::ORDER {
        log::info!("  {:<8} {} left", faction.as_str(), world.count(faction));
    }
    if let Some(player) = &world.player {
        log::info!("  player   at {} with {:?}", player.body.rect.top_left(), player.eaten_power);
    }
    ExitCode::SUCCESS
}

fn load_tuning(path: Option<&str>) -> Result<Tuning, ConfigError> {
    match path {
        Some(path) => Tuning::load(path),
        None => {
            log::info!("Using default tuning");
            Ok(Tuning::default())
        }
    }
}

fn build_arena(tuning: Tuning) -> Result<World, ConfigError> {
    let tile = tuning.tile_size;
    let mut world = World::new(0x7117_7055, tuning);
    world.add_walls(ARENA_COLS, ARENA_ROWS);

    // a couple of pillars to bounce off
    for row in 8..16 {
        world.add_obstacle_tile(13, row);
        world.add_obstacle_tile(26, row);
    }

    let at = |col: i32, row: i32| IVec2::new(col * tile, row * tile);
    world.spawn_player(at(20, 12));

    let names: Vec<String> = world.tuning.archetypes.iter().map(|a| a.name.clone()).collect();
    for (i, name) in names.iter().enumerate() {
        let col = 3 + (i as i32 * 9) % (ARENA_COLS - 6);
        world.spawn(name, at(col, 3))?;
        world.spawn(name, at(col + 2, ARENA_ROWS - 5))?;
    }
    log::info!(
        "Arena {}x{} tiles, {} obstacles, {} NPCs",
        ARENA_COLS,
        ARENA_ROWS,
        world.obstacles.len(),
        world.npcs.len()
    );
    Ok(world)
}
