//! Centralized event definitions
//!
//! Input handlers translate keys into [`SimulationCommand`] events; the simulation and trail
//! plugins consume them. Keeping every command in one enum keeps the input layer ignorant of
//! which plugin reacts.

use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationCommand {
    /// Add one particle at a uniformly random point on the sphere
    AddParticle,
    /// Add a jittered copy of a randomly chosen existing particle
    CloneParticle,
    Clear,
    TogglePause,
    ToggleHeads,
    HalveDepth,
    DoubleDepth,
    IncreaseStepSize,
    DecreaseStepSize,
    IncreaseStepsPerFrame,
    DecreaseStepsPerFrame,
    /// Switch to the next registered field and restart with a fresh population
    CycleField,
    Quit,
}
