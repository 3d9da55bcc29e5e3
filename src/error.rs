//! Error types shared by the simulation core

use crate::physics::math::Scalar;
use thiserror::Error;

/// Errors raised by the trajectory store, the frame stepper and field lookup.
///
/// Every variant leaves the store in the state it had before the failing call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("trail depth must be at least 1")]
    ZeroDepth,

    #[error("steps per frame must be at least 1")]
    ZeroSubSteps,

    #[error("step size must be finite and positive, got {0}")]
    InvalidStepSize(Scalar),

    #[error("particle state must be finite, got ({x}, {y}, {z})")]
    NonFiniteState { x: Scalar, y: Scalar, z: Scalar },

    #[error("trail storage for {particles} particles at depth {depth} overflows the index range")]
    CapacityOverflow { particles: usize, depth: usize },

    #[error("failed to allocate trail storage for {particles} particles at depth {depth}")]
    Allocation { particles: usize, depth: usize },

    #[error("Unknown vector field: '{name}'. Available fields: {available}. Aliases: {aliases}")]
    UnknownField {
        name: String,
        available: String,
        aliases: String,
    },
}
