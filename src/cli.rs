//! Command line interface for vfield

use clap::Parser;
use thiserror::Error;

use crate::config::{ConfigError, SimulationConfig};
use crate::error::SimulationError;
use crate::physics::fields::registry::FieldRegistry;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file could not be loaded or is invalid
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Invalid field name provided
    #[error("Invalid vector field: {0}")]
    InvalidField(#[from] SimulationError),
}

/// vfield - particle trails advected through vector fields on the sphere
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Number of particles created at startup (overrides config file)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub particles: Option<usize>,

    /// Vector field (e.g., rigid, rigid_unscaled, gibbs1)
    #[arg(short = 'f', long, value_name = "NAME")]
    pub field: Option<String>,

    /// Integration step size
    #[arg(long, value_name = "DT")]
    pub step_size: Option<f64>,

    /// Integration steps per rendered frame
    #[arg(long, value_name = "COUNT")]
    pub steps_per_frame: Option<usize>,

    /// Trail ring depth in samples
    #[arg(short = 'd', long, value_name = "SAMPLES")]
    pub depth: Option<usize>,

    /// Random seed for particle generation
    #[arg(short = 's', long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Start paused
    #[arg(short = 'p', long)]
    pub paused: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// List available vector fields and exit
    #[arg(long)]
    pub list_fields: bool,
}

/// Handles the --list-fields flag by printing available fields
pub fn handle_list_fields() {
    let registry = FieldRegistry::new().with_standard_fields();
    println!("Available vector fields:");
    for name in registry.list_available() {
        println!("  - {name}");
    }

    let aliases = registry.list_aliases();
    if !aliases.is_empty() {
        println!("\nAliases:");
        for (alias, target) in aliases {
            println!("  - {alias} -> {target}");
        }
    }
}

/// Loads configuration from file or defaults, then applies command-line overrides
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {config_path}");
        SimulationConfig::load(config_path)?
    } else {
        user_config_or_default(SimulationConfig::try_load_from_user_config())
    };

    apply_overrides(config, args)
}

/// Runs before the log subscriber exists, so the fallback is reported on stderr
fn user_config_or_default(loaded: Result<SimulationConfig, ConfigError>) -> SimulationConfig {
    loaded.unwrap_or_else(|e| {
        eprintln!("Warning: {e}. Using defaults.");
        SimulationConfig::default()
    })
}

/// Applies command-line values on top of `config` and validates the result
pub fn apply_overrides(
    mut config: SimulationConfig,
    args: &Args,
) -> Result<SimulationConfig, CliError> {
    if let Some(count) = args.particles {
        println!("Overriding particle count to: {count}");
        config.physics.initial_particle_count = count;
    }

    if let Some(field) = &args.field {
        // Resolve aliases so the HUD and config dump show the canonical name
        let resolved = FieldRegistry::new().with_standard_fields().create(field)?;
        println!("Using vector field: {}", resolved.name());
        config.physics.field = resolved.name().to_string();
    }

    if let Some(step_size) = args.step_size {
        println!("Overriding step size to: {step_size}");
        config.physics.step_size = step_size;
    }

    if let Some(steps) = args.steps_per_frame {
        println!("Overriding steps per frame to: {steps}");
        config.physics.steps_per_frame = steps;
    }

    if let Some(depth) = args.depth {
        println!("Overriding trail depth to: {depth}");
        config.trails.depth = depth;
    }

    if let Some(seed) = args.seed {
        println!("Using random seed: {seed}");
        config.physics.initial_seed = Some(seed);
    }

    if args.paused {
        config.physics.start_paused = true;
    }

    config.validate()?;
    Ok(config)
}
