//! vfield library
//!
//! Particles advected along vector fields on the unit sphere, each leaving a fixed-depth trail.
//! The simulation core in [`physics`] has no Bevy schedule dependencies and can be driven
//! directly; [`plugins`] wires it into an interactive application.

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod resources;
pub mod utils;

// Re-export commonly used items
pub use config::SimulationConfig;
pub use error::SimulationError;
pub use events::SimulationCommand;
pub use physics::{
    fields::{VectorField, registry::FieldRegistry},
    integrators,
    math::{Scalar, Vector},
    stepper::{FrameStepper, StepParams},
    trajectory::{DirtyRange, TrajectoryStore},
};
pub use plugins::{
    camera::CameraPlugin, controls::ControlsPlugin, diagnostics_hud::DiagnosticsHudPlugin,
    simulation::SimulationPlugin, trails::TrailsPlugin,
};
