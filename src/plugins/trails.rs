//! Trail rendering
//!
//! The renderer keeps its own copy of the store's trail buffer, standing in for a GPU vertex
//! buffer. Each frame it copies only the slots written by the last tick; after any reallocation
//! of the store it copies everything. Trails are drawn from that copy as gradient line strips
//! that fade toward the oldest sample.

use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;
use crate::physics::trajectory::TrailLayout;
use crate::utils::color::{faded, trail_color};

/// What a [`TrailMirror::sync`] call had to copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// Nothing was written since the last sync
    Unchanged,
    /// The store was reallocated or re-laid out and the whole buffer was copied
    Full,
    /// Every slot was written and the buffer was copied in one piece
    Whole,
    /// Only the dirty slots were copied; holds the number of floats
    Partial(usize),
}

/// Renderer-side copy of the trail buffer
#[derive(Resource, Default, Debug)]
pub struct TrailMirror {
    buffer: Vec<f32>,
    lengths: Vec<usize>,
    depth: usize,
    cursor: usize,
    epoch: Option<u64>,
}

impl TrailMirror {
    pub fn sync(&mut self, store: &TrajectoryStore, dirty: Option<DirtyRange>) -> SyncKind {
        let source = store.trail_buffer();

        let kind = if self.epoch != Some(store.layout_epoch()) {
            self.buffer.clear();
            self.buffer.extend_from_slice(source);
            self.epoch = Some(store.layout_epoch());
            SyncKind::Full
        } else {
            match dirty {
                None => SyncKind::Unchanged,
                Some(range) if range.is_full() => {
                    self.buffer.copy_from_slice(source);
                    SyncKind::Whole
                }
                Some(range) => {
                    let mut floats = 0;
                    for span in store.dirty_spans(&range) {
                        floats += span.len();
                        self.buffer[span.clone()].copy_from_slice(&source[span]);
                    }
                    SyncKind::Partial(floats)
                }
            }
        };

        self.lengths.clear();
        self.lengths.extend_from_slice(store.trail_lengths());
        self.depth = store.depth();
        self.cursor = store.cursor();

        kind
    }

    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    pub fn count(&self) -> usize {
        self.lengths.len()
    }

    pub fn layout(&self) -> TrailLayout<'_> {
        TrailLayout {
            buffer: &self.buffer,
            depth: self.depth,
            cursor: self.cursor,
        }
    }

    /// Samples of `particle` newest first
    pub fn trail(&self, particle: usize) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        let length = self.lengths.get(particle).copied().unwrap_or(0);
        self.layout().walk(particle, length)
    }

    pub fn trail_length(&self, particle: usize) -> usize {
        self.lengths.get(particle).copied().unwrap_or(0)
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TrailSettings {
    pub draw_heads: bool,
    pub alpha: f32,
    pub head_radius: f32,
}

impl From<&SimulationConfig> for TrailSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            draw_heads: config.trails.draw_heads,
            alpha: config.rendering.trail_alpha,
            head_radius: config.rendering.head_radius,
        }
    }
}

pub struct TrailsPlugin;

impl Plugin for TrailsPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<SimulationConfig>()
            .map(TrailSettings::from)
            .unwrap_or_else(|| TrailSettings::from(&SimulationConfig::default()));

        app.insert_resource(settings);
        app.init_resource::<TrailMirror>();

        app.add_systems(
            Update,
            (
                handle_toggle_heads.in_set(SimulationSet::Commands),
                (sync_trail_mirror, draw_trails)
                    .chain()
                    .in_set(SimulationSet::Render),
            ),
        );
    }
}

fn handle_toggle_heads(
    mut commands_reader: EventReader<SimulationCommand>,
    mut settings: ResMut<TrailSettings>,
) {
    for command in commands_reader.read() {
        if matches!(command, SimulationCommand::ToggleHeads) {
            settings.draw_heads = !settings.draw_heads;
        }
    }
}

fn sync_trail_mirror(
    trajectories: Res<Trajectories>,
    last_dirty: Res<LastDirtyRange>,
    mut mirror: ResMut<TrailMirror>,
) {
    if let SyncKind::Full = mirror.sync(&trajectories, **last_dirty) {
        debug!(
            "Trail mirror resynchronized: {} floats",
            mirror.buffer().len()
        );
    }
}

fn draw_trails(mut gizmos: Gizmos, mirror: Res<TrailMirror>, settings: Res<TrailSettings>) {
    for particle in 0..mirror.count() {
        let length = mirror.trail_length(particle);
        if length == 0 {
            continue;
        }

        let base = trail_color(particle);
        let mut samples = mirror.trail(particle).peekable();

        if settings.draw_heads {
            if let Some(&head) = samples.peek() {
                gizmos.sphere(
                    Isometry3d::from_translation(head),
                    settings.head_radius,
                    base.with_alpha(settings.alpha),
                );
            }
        }

        gizmos.linestrip_gradient(
            samples
                .enumerate()
                .map(|(age, sample)| (sample, faded(base, age, length, settings.alpha))),
        );
    }
}
