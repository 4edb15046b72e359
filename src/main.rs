//! # Delve Main Entry Point
//!
//! Builds a world, replays a key script against it and prints the result.

use clap::Parser;
use delve::{render_ascii, DelveResult, InputHandler, World, WorldConfig};
use log::{info, warn};
use std::path::PathBuf;

/// Command line arguments for the Delve simulation.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "A turn-based dungeon simulation, driven by key scripts")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation and dice
    #[arg(short, long)]
    seed: Option<u64>,

    /// Width of generated levels in tiles
    #[arg(long)]
    width: Option<i32>,

    /// Height of generated levels in tiles
    #[arg(long)]
    height: Option<i32>,

    /// Starting torch radius
    #[arg(long)]
    torch_radius: Option<i32>,

    /// Directory with hand-authored levelNNN.txt files
    #[arg(long)]
    level_dir: Option<PathBuf>,

    /// JSON file with world settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keys to play, e.g. "llljj>" (vi keys or numpad, '.' wait, '<'/'>' stairs)
    #[arg(long, default_value = "")]
    script: String,

    /// Print the final snapshot as JSON instead of ASCII
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting Delve v{}", delve::VERSION);

    let config = build_config(&args)?;
    run_script(&args, config)
}

/// Initializes `env_logger`; `RUST_LOG` wins over the flag.
fn initialize_logging(log_level: &str) {
    let env = env_logger::Env::default().default_filter_or(log_level);
    env_logger::Builder::from_env(env)
        .format_target(false)
        .init();
}

/// Merges the optional config file with command line overrides.
fn build_config(args: &Args) -> DelveResult<WorldConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading world settings from {}", path.display());
            WorldConfig::from_json_file(path)?
        }
        None => WorldConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(radius) = args.torch_radius {
        config.torch_radius = radius;
    }
    if let Some(dir) = &args.level_dir {
        if !dir.is_dir() {
            warn!(
                "level directory {} does not exist, every level will be generated",
                dir.display()
            );
        }
        config.level_dir = Some(dir.clone());
    }
    Ok(config)
}

/// Plays the key script and prints the final state.
fn run_script(args: &Args, config: WorldConfig) -> DelveResult<()> {
    info!("Generating dungeon with seed: {}", config.seed);
    let mut world = World::new(config)?;

    let commands = InputHandler::new().parse_script(&args.script);
    info!("Replaying {} commands", commands.len());
    for command in commands {
        if world.is_game_over() {
            warn!("Game over, ignoring the rest of the script");
            break;
        }
        let outcome = world.execute(command)?;
        if !outcome.accepted {
            info!("{} rejected: {}", command, outcome.messages.join(" / "));
        }
    }

    let snapshot = world.snapshot()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_ascii(&snapshot));
    }

    info!("Simulation ended after {} turns", world.turn());
    Ok(())
}
