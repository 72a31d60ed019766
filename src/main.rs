use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spritefall::{Preset, SimConfig, Simulation, SimulationError};

/// Real-time point-sprite particle simulation.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML scene file
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Built-in scene, overrides the scene file's preset
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Remove particles once their lifetime is used up
    #[arg(long)]
    cull_expired: bool,

    /// Apply gravity through velocity only
    #[arg(long)]
    physical_gravity: bool,
}

fn run(args: Args) -> Result<(), SimulationError> {
    let mut config = match &args.scene {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.cull_expired {
        config.physics.cull_expired = true;
    }
    if args.physical_gravity {
        config.physics.legacy_position_gravity = false;
    }

    Simulation::new().with_config(config).run()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spritefall=info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "spritefall failed");
            ExitCode::FAILURE
        }
    }
}
