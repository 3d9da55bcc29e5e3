use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;
use vfield::cli::{Args, handle_list_fields, load_and_apply_config};
use vfield::{CameraPlugin, ControlsPlugin, DiagnosticsHudPlugin, SimulationPlugin, TrailsPlugin};

fn main() -> AppExit {
    let args = Args::parse();

    if args.list_fields {
        handle_list_fields();
        return AppExit::Success;
    }

    let config = match load_and_apply_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return AppExit::error();
        }
    };

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(LogPlugin {
                level: log_level,
                ..default()
            })
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: format!("vfield v{}", env!("CARGO_PKG_VERSION")),
                    ..default()
                }),
                ..default()
            }),
    );

    info!(
        "vfield v{} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_DATE")
    );

    app.add_plugins((
        SimulationPlugin::with_config(config),
        CameraPlugin,
        ControlsPlugin,
        TrailsPlugin,
        DiagnosticsHudPlugin,
    ));

    app.run()
}
