//! Action handlers for simulation commands
//!
//! The functions here operate on plain values so they can be exercised without an `App`; the
//! systems at the bottom adapt them to Bevy resources and events.

use crate::config::TrailsConfig;
use crate::physics::fields::registry::FieldRegistry;
use crate::physics::math::{jitter, random_unit_vector};
use crate::physics::stepper::Clock;
use crate::prelude::*;

/// Step size is scaled by this factor per increase or decrease
pub const STEP_SIZE_FACTOR: Scalar = 1.25;

/// Add `count` particles uniformly distributed on the unit sphere.
pub fn seed_population(
    store: &mut TrajectoryStore,
    rng: &mut impl Rng,
    count: usize,
) -> Result<(), SimulationError> {
    for _ in 0..count {
        store.add(random_unit_vector(rng))?;
    }
    Ok(())
}

pub fn add_random_particle(
    store: &mut TrajectoryStore,
    rng: &mut impl Rng,
) -> Result<usize, SimulationError> {
    store.add(random_unit_vector(rng))
}

/// Add a jittered copy of a random existing particle. Does nothing on an empty store.
pub fn clone_random_particle(
    store: &mut TrajectoryStore,
    rng: &mut impl Rng,
    magnitude: Scalar,
) -> Result<Option<usize>, SimulationError> {
    if store.is_empty() {
        return Ok(None);
    }

    let source = rng.random_range(0..store.count());
    let state = store.states()[source];
    store.add(jitter(state, magnitude, rng)).map(Some)
}

/// Switch to the field after the current one and restart with a fresh population.
///
/// Returns the name of the new field.
pub fn cycle_field(
    store: &mut TrajectoryStore,
    rng: &mut SharedRng,
    registry: &FieldRegistry,
    config: &SimulationConfig,
) -> Result<Option<&'static str>, SimulationError> {
    let Some(next) = registry.next_after(store.field().name()) else {
        return Ok(None);
    };
    let field = registry.create(&next)?;
    let name = field.name();

    store.replace_field(field);
    *rng = SharedRng::from_optional_seed(config.physics.initial_seed);
    seed_population(store, &mut **rng, config.physics.initial_particle_count)?;

    Ok(Some(name))
}

/// Halve or double the ring depth inside the configured bounds.
pub fn resize_trails(
    store: &mut TrajectoryStore,
    trails: &TrailsConfig,
    grow: bool,
) -> Result<bool, SimulationError> {
    let current = store.depth();
    let target = if grow {
        trails.doubled_depth(current)
    } else {
        trails.halved_depth(current)
    };

    if target == current {
        return Ok(false);
    }
    store.set_depth(target)?;
    Ok(true)
}

/// Apply a single command to the simulation state.
///
/// Commands with no effect on the store or stepper (`ToggleHeads`, `Quit`) are ignored.
pub fn apply_command<C: Clock>(
    command: SimulationCommand,
    store: &mut TrajectoryStore,
    stepper: &mut FrameStepper<C>,
    rng: &mut SharedRng,
    registry: &FieldRegistry,
    config: &SimulationConfig,
) -> Result<(), SimulationError> {
    match command {
        SimulationCommand::AddParticle => {
            add_random_particle(store, &mut **rng)?;
        }
        SimulationCommand::CloneParticle => {
            clone_random_particle(store, &mut **rng, config.physics.clone_jitter)?;
        }
        SimulationCommand::Clear => {
            store.clear();
            info!("Cleared all particles");
        }
        SimulationCommand::TogglePause => {
            let paused = stepper.toggle_paused();
            info!("Simulation {}", if paused { "paused" } else { "resumed" });
        }
        SimulationCommand::HalveDepth | SimulationCommand::DoubleDepth => {
            let grow = command == SimulationCommand::DoubleDepth;
            if resize_trails(store, &config.trails, grow)? {
                info!("Trail depth set to {}", store.depth());
            }
        }
        SimulationCommand::IncreaseStepSize => {
            stepper.set_step_size(stepper.step_size() * STEP_SIZE_FACTOR)?;
            info!("Step size set to {}", stepper.step_size());
        }
        SimulationCommand::DecreaseStepSize => {
            stepper.set_step_size(stepper.step_size() / STEP_SIZE_FACTOR)?;
            info!("Step size set to {}", stepper.step_size());
        }
        SimulationCommand::IncreaseStepsPerFrame => {
            stepper.set_steps_per_frame(stepper.steps_per_frame().saturating_add(1))?;
            info!("Steps per frame set to {}", stepper.steps_per_frame());
        }
        SimulationCommand::DecreaseStepsPerFrame => {
            let steps = stepper.steps_per_frame().saturating_sub(1).max(1);
            stepper.set_steps_per_frame(steps)?;
            info!("Steps per frame set to {}", stepper.steps_per_frame());
        }
        SimulationCommand::CycleField => {
            if let Some(name) = cycle_field(store, rng, registry, config)? {
                info!("Switched to vector field '{}'", name);
            }
        }
        SimulationCommand::ToggleHeads | SimulationCommand::Quit => {}
    }
    Ok(())
}

pub fn seed_initial_population(
    mut trajectories: ResMut<Trajectories>,
    mut rng: ResMut<SharedRng>,
    config: Res<SimulationConfig>,
) {
    let count = config.physics.initial_particle_count;
    match seed_population(&mut trajectories.0, &mut rng.0, count) {
        Ok(()) => info!(
            "Seeded {} particles on field '{}'",
            count,
            trajectories.field().name()
        ),
        Err(e) => error!("Failed to seed initial particles: {}", e),
    }
}

pub fn handle_simulation_commands(
    mut commands_reader: EventReader<SimulationCommand>,
    mut trajectories: ResMut<Trajectories>,
    mut stepper: ResMut<Stepper>,
    mut rng: ResMut<SharedRng>,
    fields: Res<Fields>,
    config: Res<SimulationConfig>,
    mut exit: EventWriter<AppExit>,
) {
    for &command in commands_reader.read() {
        if command == SimulationCommand::Quit {
            exit.write_default();
            continue;
        }

        if let Err(e) = apply_command(
            command,
            &mut trajectories.0,
            &mut stepper.0,
            &mut rng,
            &fields,
            &config,
        ) {
            error!("Failed to apply {:?}: {}", command, e);
        }
    }
}

pub fn advance_simulation(
    mut trajectories: ResMut<Trajectories>,
    mut stepper: ResMut<Stepper>,
    mut last_dirty: ResMut<LastDirtyRange>,
) {
    **last_dirty = match stepper.tick(&mut trajectories.0) {
        Ok(range) => range,
        Err(e) => {
            error!("Simulation step failed: {}", e);
            None
        }
    };
}
