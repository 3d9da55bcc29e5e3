//! Bevy plugins making up the interactive application

pub mod camera;
pub mod controls;
pub mod diagnostics_hud;
pub mod simulation;
pub mod trails;
