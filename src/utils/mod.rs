//! Shared helpers used by the rendering plugins

pub mod color;
