//! Controls plugin - Self-contained plugin pattern
//!
//! Translates keyboard input into [`SimulationCommand`] events.
//!
//! | Key       | Command                     |
//! |-----------|-----------------------------|
//! | `a`       | add a random particle       |
//! | `c`       | clone a random particle     |
//! | `C`       | clear all particles         |
//! | space     | pause / resume              |
//! | `h`       | toggle particle heads       |
//! | `[` / `]` | halve / double trail depth  |
//! | `-` / `=` | smaller / larger step size  |
//! | `,` / `.` | fewer / more steps per frame|
//! | `f`       | next vector field           |
//! | escape    | quit                        |

use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;
use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            keyboard_input_handler.in_set(SimulationSet::Input),
        );
    }
}

/// Command bound to a logical key, if any. Character keys are case sensitive.
pub fn command_for_key(key: &Key) -> Option<SimulationCommand> {
    match key {
        Key::Character(c) => match c.as_str() {
            "a" | "A" => Some(SimulationCommand::AddParticle),
            "c" => Some(SimulationCommand::CloneParticle),
            "C" => Some(SimulationCommand::Clear),
            "h" | "H" => Some(SimulationCommand::ToggleHeads),
            "[" => Some(SimulationCommand::HalveDepth),
            "]" => Some(SimulationCommand::DoubleDepth),
            "-" | "_" => Some(SimulationCommand::DecreaseStepSize),
            "=" | "+" => Some(SimulationCommand::IncreaseStepSize),
            "," | "<" => Some(SimulationCommand::DecreaseStepsPerFrame),
            "." | ">" => Some(SimulationCommand::IncreaseStepsPerFrame),
            "f" | "F" => Some(SimulationCommand::CycleField),
            _ => None,
        },
        Key::Space => Some(SimulationCommand::TogglePause),
        #[cfg(not(target_arch = "wasm32"))]
        Key::Escape => Some(SimulationCommand::Quit),
        _ => None,
    }
}

fn keyboard_input_handler(
    mut keyboard_events: EventReader<KeyboardInput>,
    mut commands: EventWriter<SimulationCommand>,
) {
    for event in keyboard_events.read() {
        if event.state != ButtonState::Pressed || event.repeat {
            continue;
        }

        if let Some(command) = command_for_key(&event.logical_key) {
            commands.write(command);
        }
    }
}
