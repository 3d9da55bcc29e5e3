//! vfield prelude module
//!
//! This module re-exports the most commonly used types, traits, and functions
//! across the application to reduce import boilerplate.

// External crate re-exports
pub use bevy::prelude::*;
pub use rand::Rng;

// Internal re-exports - Config
pub use crate::config::SimulationConfig;

// Internal re-exports - Errors
pub use crate::error::SimulationError;

// Internal re-exports - Events
pub use crate::events::SimulationCommand;

// Internal re-exports - Resources
pub use crate::resources::{Fields, LastDirtyRange, SharedRng, Stepper, Trajectories};

// Internal re-exports - Physics
pub use crate::physics::fields::VectorField;
pub use crate::physics::math::{Scalar, Vector};
pub use crate::physics::stepper::{FrameStepper, StepParams};
pub use crate::physics::trajectory::{DirtyRange, TrajectoryStore};
