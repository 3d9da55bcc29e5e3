//! Simulation plugin - Self-contained plugin pattern
//!
//! This plugin owns the trajectory store and frame stepper, seeds the initial population,
//! applies [`SimulationCommand`] events and advances the simulation once per frame.

use crate::prelude::*;

pub mod actions;

use crate::config::ConfigError;
use crate::physics::fields::RigidRotation;
use actions::{advance_simulation, handle_simulation_commands, seed_initial_population};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Commands,
    Step,
    Render,
    UI,
}

pub struct SimulationPlugin {
    config: Option<SimulationConfig>,
}

impl SimulationPlugin {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn validated(config: SimulationConfig) -> SimulationConfig {
    match config.validate() {
        Ok(()) => config,
        Err(ConfigError::Invalid(reason)) => {
            warn!("Invalid configuration ({}). Using defaults.", reason);
            SimulationConfig::default()
        }
        Err(e) => {
            warn!("{}. Using defaults.", e);
            SimulationConfig::default()
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = validated(
            self.config
                .clone()
                .unwrap_or_else(SimulationConfig::load_from_user_config),
        );

        match toml::to_string_pretty(&config) {
            Ok(toml_string) => {
                info!("=== Current Configuration (TOML) ===\n{}", toml_string);
                info!("=== End Configuration ===");
            }
            Err(e) => {
                error!("Failed to serialize configuration to TOML: {}", e);
            }
        }

        let fields = Fields::default();
        let field = match fields.create(&config.physics.field) {
            Ok(field) => field,
            Err(e) => {
                warn!("{}. Falling back to rigid", e);
                Box::new(RigidRotation)
            }
        };

        let store = match TrajectoryStore::new(field, config.trails.depth) {
            Ok(store) => store,
            Err(e) => {
                error!("Failed to create trajectory store: {}", e);
                return;
            }
        };
        let stepper = match FrameStepper::new(config.physics.step_params()) {
            Ok(stepper) => stepper,
            Err(e) => {
                error!("Failed to create frame stepper: {}", e);
                return;
            }
        };

        app.insert_resource(SharedRng::from_optional_seed(config.physics.initial_seed));
        app.insert_resource(config);
        app.insert_resource(fields);
        app.insert_resource(Trajectories(store));
        app.insert_resource(Stepper(stepper));
        app.init_resource::<LastDirtyRange>();

        app.add_event::<SimulationCommand>();

        app.configure_sets(
            Update,
            (
                SimulationSet::Input,
                SimulationSet::Commands,
                SimulationSet::Step,
                SimulationSet::Render,
                SimulationSet::UI,
            )
                .chain(),
        );

        app.add_systems(Startup, seed_initial_population);
        app.add_systems(
            Update,
            (
                handle_simulation_commands.in_set(SimulationSet::Commands),
                advance_simulation.in_set(SimulationSet::Step),
            ),
        );
    }
}
