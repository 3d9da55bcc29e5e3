//! Diagnostics HUD (Heads-Up Display) module.
//!
//! Shows particle count and the stepper's FPS estimate as `"<count> @ <fps> FPS"`, followed by a
//! status line with trail depth, the active field, the integration parameters and whether the
//! simulation is paused. The text is refreshed on a timer rather than every frame.

use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;
use core::time::Duration;

#[derive(Component, Copy, Clone, Default, PartialEq, Debug)]
struct StatsTextNode;

#[derive(Component, Copy, Clone, Default, PartialEq, Debug)]
struct StatusTextNode;

#[derive(Resource, Debug)]
pub struct DiagnosticsHudSettings {
    pub enabled: bool,
    pub refresh_interval: Duration,
}

impl Default for DiagnosticsHudSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval: Duration::from_secs_f64(1.0 / 6.0),
        }
    }
}

#[derive(Resource)]
pub struct DiagnosticsHudState {
    pub refresh_timer: Timer,
}

impl Default for DiagnosticsHudState {
    fn default() -> Self {
        Self {
            refresh_timer: Timer::new(
                DiagnosticsHudSettings::default().refresh_interval,
                TimerMode::Repeating,
            ),
        }
    }
}

/// Format `value` with comma thousands separators
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn stats_line(count: usize, fps: u32) -> String {
    format!("{} @ {} FPS", group_thousands(count), fps)
}

pub fn status_line(store: &TrajectoryStore, params: StepParams) -> String {
    let mut line = format!(
        "depth {} | {} | dt {} x {}",
        store.depth(),
        store.field().name(),
        params.step_size,
        params.steps_per_frame
    );
    if params.paused {
        line.push_str(" | paused");
    }
    line
}

pub struct DiagnosticsHudPlugin;

impl DiagnosticsHudPlugin {
    fn spawn_diagnostics_hud(mut commands: Commands, settings: Res<DiagnosticsHudSettings>) {
        let text_font = TextFont::from_font_size(12.0);

        let hud_node = Node {
            position_type: PositionType::Absolute,
            top: Val::Px(5.0),
            right: Val::Px(5.0),
            padding: UiRect::all(Val::Px(5.0)),
            display: if settings.enabled {
                Display::Flex
            } else {
                Display::None
            },
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(1.0),
            ..default()
        };

        commands.spawn((
            hud_node,
            BorderRadius::all(Val::Px(5.0)),
            BackgroundColor(Color::srgba(0.2, 0.2, 0.2, 0.7)),
            children![
                (StatsTextNode, Text::new("-"), text_font.clone()),
                (StatusTextNode, Text::new("-"), text_font.clone()),
            ],
        ));
    }

    fn advance_refresh_timer(mut state: ResMut<DiagnosticsHudState>, time: Res<Time>) {
        state.refresh_timer.tick(time.delta());
    }

    fn update_hud_text(
        state: Res<DiagnosticsHudState>,
        trajectories: Res<Trajectories>,
        stepper: Res<Stepper>,
        mut stats_text: Single<&mut Text, (With<StatsTextNode>, Without<StatusTextNode>)>,
        mut status_text: Single<&mut Text, (With<StatusTextNode>, Without<StatsTextNode>)>,
    ) {
        if !state.refresh_timer.finished() {
            return;
        }

        ***stats_text = stats_line(trajectories.count(), stepper.fps());
        ***status_text = status_line(&trajectories, stepper.params());
    }
}

impl Plugin for DiagnosticsHudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DiagnosticsHudSettings>();
        app.init_resource::<DiagnosticsHudState>();
        app.add_systems(Startup, Self::spawn_diagnostics_hud);
        app.add_systems(
            Update,
            (Self::advance_refresh_timer, Self::update_hud_text)
                .chain()
                .in_set(SimulationSet::UI),
        );
    }
}
