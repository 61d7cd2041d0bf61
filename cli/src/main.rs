//! Farmhand command-line harness
//!
//! Offline tooling around the controller core: validate a profile, or
//! replay a recorded sensor scenario and print every action the
//! controller would have sent to the keyboard device.

mod scenario;

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use clap::{Parser, Subcommand};
use farmhand_core::{Controller, profile};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Conditional clicker controller harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a profile file
    Check {
        /// Profile path (default: default.toml in the user profile dir)
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },
    /// Replay a recorded sensor scenario through the controller
    Replay {
        /// Profile path (default: default.toml in the user profile dir)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        #[arg(short, long)]
        scenario: PathBuf,

        /// Seed for interval randomness (reproducible cadence)
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check { profile } => check(&resolve_profile_path(profile)?),
        Commands::Replay {
            profile,
            scenario,
            seed,
        } => replay(&resolve_profile_path(profile)?, &scenario, seed),
    }
}

/// Explicit path, or `default.toml` in the user profile directory.
fn resolve_profile_path(explicit: Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    profile::default_profile_dir()
        .map(|dir| dir.join("default.toml"))
        .ok_or_else(|| "no profile given and no user config directory found".to_string())
}

fn check(path: &Path) -> Result<(), String> {
    let profile = profile::load_file(path).map_err(|e| e.to_string())?;
    profile::validate(&profile).map_err(|e| e.to_string())?;

    println!("profile OK: {}", path.display());
    println!(
        "  targeting: {} every {}-{}ms",
        profile.targeting.key, profile.targeting.min_interval_ms, profile.targeting.max_interval_ms
    );
    println!("  attack keys: {}", profile.attack_keys.len());
    println!("  instant keys: {}", profile.instant_keys.len());
    println!("  status effects: {}", profile.status_effects.len());
    println!("  buffs: {}", profile.buffs.len());
    println!(
        "  unstuck sequence: {} steps",
        profile.stuck.unstuck_sequence.len()
    );
    Ok(())
}

fn replay(profile_path: &Path, scenario_path: &Path, seed: Option<u64>) -> Result<(), String> {
    let profile = profile::load_file(profile_path).map_err(|e| e.to_string())?;
    let scenario = scenario::load_file(scenario_path)?;

    let mut controller = match seed {
        Some(seed) => Controller::start_seeded(profile, seed),
        None => Controller::start(profile),
    }
    .map_err(|e| e.to_string())?;

    let base = NaiveDateTime::default();
    let mut total_actions = 0usize;

    for tick in &scenario.ticks {
        let now = base + Duration::milliseconds(tick.at_ms as i64);
        let actions = controller
            .tick(&tick.snapshot(), now)
            .map_err(|e| e.to_string())?;
        for action in &actions {
            println!("{:>8}ms  {}", tick.at_ms, action);
        }
        total_actions += actions.len();
    }

    println!(
        "replayed {} ticks, {} actions, final state: {}",
        controller.tick_count(),
        total_actions,
        controller.lifecycle()
    );
    Ok(())
}
