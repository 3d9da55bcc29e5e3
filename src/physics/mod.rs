//! Simulation core: fields, integration, trail storage and the per-frame driver

pub mod fields;
pub mod integrators;
pub mod math;
pub mod stepper;
pub mod trajectory;
