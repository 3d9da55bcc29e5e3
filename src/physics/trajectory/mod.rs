//! Particle states and their ring-buffer trails
//!
//! Trails are stored flattened as `[particle][slot][xyz]` in a single `f32` buffer so a renderer
//! can upload them directly. All particles share one ring depth and one write cursor, which means
//! a step always writes the same slot for every particle and the changed region of the buffer is
//! described by a single [`DirtyRange`].
//!
//! Storage is sized for `capacity` particles, the smallest power of two holding the current count,
//! so most additions reuse the existing buffer. Growth and depth changes build the new buffer
//! completely before swapping it in; a failed allocation leaves the store untouched.

use crate::error::SimulationError;
use crate::physics::fields::VectorField;
use crate::physics::integrators::{Integrator, RungeKuttaFourthOrder};
use crate::physics::math::{Scalar, Vector, capacity_for};
use bevy::log::debug;
use bevy::math::Vec3;
use core::ops::Range;

pub mod dirty;
pub mod trail;

pub use dirty::DirtyRange;
pub use trail::{COMPONENTS, TrailIter, TrailLayout};

pub struct TrajectoryStore {
    field: Box<dyn VectorField>,
    integrator: Box<dyn Integrator>,
    states: Vec<Vector>,
    /// Valid samples per particle slot, `capacity` entries
    trail_lengths: Vec<usize>,
    trail: Vec<f32>,
    capacity: usize,
    depth: usize,
    cursor: usize,
    layout_epoch: u64,
}

impl TrajectoryStore {
    /// Create an empty store integrating `field` with RK4.
    pub fn new(field: Box<dyn VectorField>, depth: usize) -> Result<Self, SimulationError> {
        if depth == 0 {
            return Err(SimulationError::ZeroDepth);
        }

        Ok(Self {
            field,
            integrator: Box::new(RungeKuttaFourthOrder),
            states: Vec::new(),
            trail_lengths: Vec::new(),
            trail: Vec::new(),
            capacity: 0,
            depth,
            cursor: 0,
            layout_epoch: 0,
        })
    }

    /// Append a particle and return its index.
    ///
    /// The new particle starts with an empty trail even if its slots still hold samples from an
    /// earlier occupant.
    pub fn add(&mut self, state: Vector) -> Result<usize, SimulationError> {
        if !state.is_finite() {
            return Err(SimulationError::NonFiniteState {
                x: state.x,
                y: state.y,
                z: state.z,
            });
        }

        let index = self.states.len();
        let required = capacity_for(index + 1).ok_or(SimulationError::CapacityOverflow {
            particles: index + 1,
            depth: self.depth,
        })?;

        self.states
            .try_reserve(1)
            .map_err(|_| SimulationError::Allocation {
                particles: index + 1,
                depth: self.depth,
            })?;

        if required > self.capacity {
            self.grow(required)?;
        }

        self.trail_lengths[index] = 0;
        self.states.push(state);

        Ok(index)
    }

    /// Remove every particle and release all trail storage.
    pub fn clear(&mut self) {
        self.states = Vec::new();
        self.trail_lengths = Vec::new();
        self.trail = Vec::new();
        self.capacity = 0;
        self.cursor = 0;
        self.layout_epoch += 1;

        debug!("Cleared trajectory store");
    }

    /// Clear the store and integrate `field` from now on. Depth is kept.
    pub fn replace_field(&mut self, field: Box<dyn VectorField>) {
        self.clear();
        self.field = field;
    }

    /// Change the ring depth of every particle.
    ///
    /// The newest `min(depth, old depth)` slots of each particle are kept in order and the cursor
    /// is placed right after them.
    pub fn set_depth(&mut self, depth: usize) -> Result<(), SimulationError> {
        if depth == 0 {
            return Err(SimulationError::ZeroDepth);
        }
        if depth == self.depth {
            return Ok(());
        }

        let old_depth = self.depth;
        let mut trail = allocate(trail_len(self.capacity, depth)?, 0.0, self.capacity, depth)?;
        let retained = depth.min(old_depth);

        for particle in 0..self.states.len() {
            for n in 0..retained {
                let from = (self.cursor + old_depth - 1 - n) % old_depth;
                let to = retained - n - 1;
                let src = (particle * old_depth + from) * COMPONENTS;
                let dst = (particle * depth + to) * COMPONENTS;
                trail[dst..dst + COMPONENTS].copy_from_slice(&self.trail[src..src + COMPONENTS]);
            }
            self.trail_lengths[particle] = self.trail_lengths[particle].min(retained);
        }

        self.trail = trail;
        self.depth = depth;
        self.cursor = retained % depth;
        self.layout_epoch += 1;

        debug!("Resized trails from depth {old_depth} to {depth}");
        Ok(())
    }

    /// Advance every particle by one step and record the new states at the cursor.
    pub fn step(&mut self, dt: Scalar) -> DirtyRange {
        let slot = self.cursor;
        let depth = self.depth;
        self.cursor = (slot + 1) % depth;

        for (particle, state) in self.states.iter_mut().enumerate() {
            *state = self.integrator.advance(*state, self.field.as_ref(), dt);

            let base = (particle * depth + slot) * COMPONENTS;
            self.trail[base..base + COMPONENTS].copy_from_slice(&state.as_vec3().to_array());

            let length = &mut self.trail_lengths[particle];
            *length = (*length + 1).min(depth);
        }

        DirtyRange::single(slot, depth)
    }

    /// Run `sub_steps` consecutive steps and report every slot they wrote as one range.
    pub fn step_many(
        &mut self,
        dt: Scalar,
        sub_steps: usize,
    ) -> Result<DirtyRange, SimulationError> {
        if sub_steps == 0 {
            return Err(SimulationError::ZeroSubSteps);
        }

        let start = self.cursor;
        for _ in 0..sub_steps {
            self.step(dt);
        }

        Ok(DirtyRange::spanning(start, sub_steps, self.depth))
    }

    pub fn count(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Changes whenever the trail buffer is reallocated or re-laid out.
    ///
    /// Consumers holding a copy of the buffer must re-read it in full when this moves.
    pub fn layout_epoch(&self) -> u64 {
        self.layout_epoch
    }

    pub fn field(&self) -> &dyn VectorField {
        self.field.as_ref()
    }

    pub fn integrator(&self) -> &dyn Integrator {
        self.integrator.as_ref()
    }

    pub fn states(&self) -> &[Vector] {
        &self.states
    }

    pub fn state(&self, particle: usize) -> Option<Vector> {
        self.states.get(particle).copied()
    }

    /// Valid trail samples of each active particle
    pub fn trail_lengths(&self) -> &[usize] {
        &self.trail_lengths[..self.states.len()]
    }

    pub fn trail_length(&self, particle: usize) -> Option<usize> {
        self.trail_lengths().get(particle).copied()
    }

    /// The whole flattened buffer, `capacity * depth * 3` floats
    pub fn trail_buffer(&self) -> &[f32] {
        &self.trail
    }

    pub fn layout(&self) -> TrailLayout<'_> {
        TrailLayout {
            buffer: &self.trail,
            depth: self.depth,
            cursor: self.cursor,
        }
    }

    /// Valid samples of `particle`, newest first
    pub fn trail(&self, particle: usize) -> TrailIter<'_> {
        let length = self.trail_length(particle).unwrap_or(0);
        self.layout().walk(particle, length)
    }

    /// Most recent sample of every particle that has one
    pub fn heads(&self) -> impl Iterator<Item = Vec3> + '_ {
        let layout = self.layout();
        let newest = layout.newest_slot();
        self.trail_lengths()
            .iter()
            .enumerate()
            .filter(|(_, length)| **length > 0)
            .map(move |(particle, _)| layout.sample(particle, newest))
    }

    /// Float ranges of `trail_buffer()` covered by `range`, one or two per active particle.
    pub fn dirty_spans(&self, range: &DirtyRange) -> impl Iterator<Item = Range<usize>> + use<> {
        debug_assert_eq!(range.depth(), self.depth);
        let depth = self.depth;
        let range = *range;

        (0..self.states.len()).flat_map(move |particle| {
            range.segments().map(move |segment| {
                let base = particle * depth;
                (base + segment.start()) * COMPONENTS..(base + segment.end() + 1) * COMPONENTS
            })
        })
    }

    fn grow(&mut self, capacity: usize) -> Result<(), SimulationError> {
        let mut trail = allocate(
            trail_len(capacity, self.depth)?,
            0.0,
            capacity,
            self.depth,
        )?;
        let mut trail_lengths = allocate(capacity, 0, capacity, self.depth)?;

        trail[..self.trail.len()].copy_from_slice(&self.trail);
        trail_lengths[..self.trail_lengths.len()].copy_from_slice(&self.trail_lengths);

        self.trail = trail;
        self.trail_lengths = trail_lengths;
        self.capacity = capacity;
        self.layout_epoch += 1;

        debug!(
            "Grew trail storage to {capacity} particles at depth {}",
            self.depth
        );
        Ok(())
    }
}

impl Clone for TrajectoryStore {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone_box(),
            integrator: self.integrator.clone_box(),
            states: self.states.clone(),
            trail_lengths: self.trail_lengths.clone(),
            trail: self.trail.clone(),
            capacity: self.capacity,
            depth: self.depth,
            cursor: self.cursor,
            layout_epoch: self.layout_epoch,
        }
    }
}

fn trail_len(particles: usize, depth: usize) -> Result<usize, SimulationError> {
    particles
        .checked_mul(depth)
        .and_then(|samples| samples.checked_mul(COMPONENTS))
        .ok_or(SimulationError::CapacityOverflow { particles, depth })
}

fn allocate<T: Clone>(
    len: usize,
    fill: T,
    particles: usize,
    depth: usize,
) -> Result<Vec<T>, SimulationError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| SimulationError::Allocation { particles, depth })?;
    buffer.resize(len, fill);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::fields::RigidRotation;

    /// Moves every particle by +1 in x per unit time, so samples are easy to predict
    #[derive(Clone)]
    struct Drift;

    impl VectorField for Drift {
        fn velocity(&self, _: Vector) -> Vector {
            Vector::X
        }

        fn name(&self) -> &'static str {
            "drift"
        }

        fn clone_box(&self) -> Box<dyn VectorField> {
            Box::new(Drift)
        }
    }

    fn drift_store(depth: usize) -> TrajectoryStore {
        TrajectoryStore::new(Box::new(Drift), depth).unwrap()
    }

    fn xs(store: &TrajectoryStore, particle: usize) -> Vec<f32> {
        store.trail(particle).map(|sample| sample.x).collect()
    }

    #[test]
    fn test_new_rejects_zero_depth() {
        assert!(matches!(
            TrajectoryStore::new(Box::new(Drift), 0),
            Err(SimulationError::ZeroDepth)
        ));
    }

    #[test]
    fn test_add_grows_capacity_in_powers_of_two() {
        let mut store = drift_store(4);
        let mut capacities = Vec::new();

        for i in 0..9 {
            assert_eq!(store.add(Vector::ZERO).unwrap(), i);
            capacities.push(store.capacity());
        }

        assert_eq!(capacities, vec![1, 2, 4, 4, 8, 8, 8, 8, 16]);
        assert_eq!(store.trail_buffer().len(), 16 * 4 * COMPONENTS);
    }

    #[test]
    fn test_add_rejects_non_finite_state() {
        let mut store = drift_store(4);

        let result = store.add(Vector::new(Scalar::NAN, 0.0, 0.0));

        assert!(matches!(result, Err(SimulationError::NonFiniteState { .. })));
        assert_eq!(store.count(), 0);
        assert_eq!(store.capacity(), 0);
    }

    #[test]
    fn test_add_overflow_leaves_store_unchanged() {
        let mut store = drift_store(usize::MAX / 2);

        let result = store.add(Vector::ZERO);

        assert!(matches!(
            result,
            Err(SimulationError::CapacityOverflow { .. })
        ));
        assert_eq!(store.count(), 0);
        assert_eq!(store.capacity(), 0);
        assert_eq!(store.layout_epoch(), 0);
    }

    #[test]
    fn test_step_writes_cursor_slot_and_saturates_length() {
        let mut store = drift_store(3);
        store.add(Vector::ZERO).unwrap();

        for expected_slot in [0, 1, 2, 0, 1] {
            let range = store.step(1.0);
            assert_eq!(range, DirtyRange::single(expected_slot, 3));
        }

        assert_eq!(store.trail_length(0), Some(3));
        assert_eq!(store.cursor(), 2);
        assert_eq!(xs(&store, 0), vec![5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_new_particle_starts_with_empty_trail() {
        let mut store = drift_store(4);
        store.add(Vector::ZERO).unwrap();
        store.step(1.0);
        store.step(1.0);

        store.add(Vector::new(10.0, 0.0, 0.0)).unwrap();

        assert_eq!(store.trail_length(1), Some(0));
        assert_eq!(store.trail(1).count(), 0);

        store.step(1.0);
        assert_eq!(xs(&store, 0), vec![3.0, 2.0, 1.0]);
        assert_eq!(xs(&store, 1), vec![11.0]);
    }

    #[test]
    fn test_step_many_rejects_zero_sub_steps() {
        let mut store = drift_store(4);
        store.add(Vector::ZERO).unwrap();

        assert!(matches!(
            store.step_many(1.0, 0),
            Err(SimulationError::ZeroSubSteps)
        ));
        assert_eq!(store.cursor(), 0);
        assert_eq!(store.trail_length(0), Some(0));
    }

    #[test]
    fn test_step_without_particles_still_advances_cursor() {
        let mut store = drift_store(4);

        let range = store.step_many(1.0, 3).unwrap();

        assert_eq!(store.cursor(), 3);
        assert_eq!((range.start(), range.end()), (0, 2));
    }

    #[test]
    fn test_set_depth_rejects_zero() {
        let mut store = drift_store(4);
        store.add(Vector::ZERO).unwrap();
        store.step(1.0);

        assert!(matches!(store.set_depth(0), Err(SimulationError::ZeroDepth)));
        assert_eq!(store.depth(), 4);
        assert_eq!(xs(&store, 0), vec![1.0]);
    }

    #[test]
    fn test_set_depth_shrink_keeps_newest() {
        let mut store = drift_store(8);
        store.add(Vector::ZERO).unwrap();
        for _ in 0..6 {
            store.step(1.0);
        }

        store.set_depth(4).unwrap();

        assert_eq!(store.cursor(), 0);
        assert_eq!(store.trail_length(0), Some(4));
        assert_eq!(xs(&store, 0), vec![6.0, 5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_set_depth_grow_keeps_everything() {
        let mut store = drift_store(4);
        store.add(Vector::ZERO).unwrap();
        for _ in 0..6 {
            store.step(1.0);
        }

        store.set_depth(16).unwrap();

        assert_eq!(store.cursor(), 4);
        assert_eq!(store.trail_length(0), Some(4));
        assert_eq!(xs(&store, 0), vec![6.0, 5.0, 4.0, 3.0]);

        store.step(1.0);
        assert_eq!(xs(&store, 0), vec![7.0, 6.0, 5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_set_depth_same_depth_is_noop() {
        let mut store = drift_store(4);
        store.add(Vector::ZERO).unwrap();
        store.step(1.0);
        let epoch = store.layout_epoch();

        store.set_depth(4).unwrap();

        assert_eq!(store.layout_epoch(), epoch);
        assert_eq!(store.cursor(), 1);
    }

    #[test]
    fn test_clear_releases_storage() {
        let mut store = drift_store(4);
        for _ in 0..3 {
            store.add(Vector::ZERO).unwrap();
        }
        store.step(1.0);

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.capacity(), 0);
        assert_eq!(store.cursor(), 0);
        assert!(store.trail_buffer().is_empty());
        assert_eq!(store.depth(), 4);
    }

    #[test]
    fn test_add_after_clear_matches_fresh_store() {
        let mut reused = TrajectoryStore::new(Box::new(RigidRotation), 8).unwrap();
        for state in [Vector::X, Vector::Y, Vector::new(0.6, 0.0, 0.8)] {
            reused.add(state).unwrap();
        }
        reused.step_many(0.01, 5).unwrap();
        reused.clear();

        let mut fresh = TrajectoryStore::new(Box::new(RigidRotation), 8).unwrap();
        for store in [&mut reused, &mut fresh] {
            store.add(Vector::new(0.0, 0.6, 0.8)).unwrap();
            store.step_many(0.01, 3).unwrap();
        }

        assert_eq!(reused.trail_buffer(), fresh.trail_buffer());
        assert_eq!(reused.cursor(), fresh.cursor());
        assert_eq!(reused.trail_lengths(), fresh.trail_lengths());
        assert_eq!(reused.capacity(), fresh.capacity());
        assert_eq!(reused.count(), 1);
    }

    #[test]
    fn test_replace_field_clears_and_swaps() {
        let mut store = drift_store(8);
        store.add(Vector::new(0.6, 0.0, 0.8)).unwrap();
        store.step(1.0);
        let epoch = store.layout_epoch();

        store.replace_field(Box::new(RigidRotation));

        assert!(store.is_empty());
        assert_eq!(store.depth(), 8);
        assert_eq!(store.field().name(), "rigid");
        assert!(store.layout_epoch() > epoch);
    }

    #[test]
    fn test_layout_epoch_tracks_reallocation() {
        let mut store = drift_store(4);
        assert_eq!(store.layout_epoch(), 0);

        store.add(Vector::ZERO).unwrap(); // 0 -> 1
        store.add(Vector::ZERO).unwrap(); // 1 -> 2
        store.add(Vector::ZERO).unwrap(); // 2 -> 4
        assert_eq!(store.layout_epoch(), 3);

        store.add(Vector::ZERO).unwrap(); // fits
        store.step(1.0);
        assert_eq!(store.layout_epoch(), 3);

        store.set_depth(8).unwrap();
        assert_eq!(store.layout_epoch(), 4);

        store.clear();
        assert_eq!(store.layout_epoch(), 5);
    }

    #[test]
    fn test_heads_are_newest_samples() {
        let mut store = drift_store(4);
        store.add(Vector::ZERO).unwrap();
        store.add(Vector::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(store.heads().count(), 0);

        store.step(0.5);
        store.step(0.5);

        let heads: Vec<Vec3> = store.heads().collect();
        assert_eq!(heads, vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0)]);
    }

    #[test]
    fn test_dirty_spans_cover_each_particle() {
        let mut store = drift_store(4);
        store.add(Vector::ZERO).unwrap();
        store.add(Vector::ZERO).unwrap();
        store.step_many(1.0, 2).unwrap();

        let range = store.step_many(1.0, 3).unwrap();
        let spans: Vec<Range<usize>> = store.dirty_spans(&range).collect();

        // slots 2..=3 and 0..=0 for each of the two particles, 12 floats per particle block
        assert_eq!(spans, vec![6..12, 0..3, 18..24, 12..15]);
    }

    #[test]
    fn test_rigid_rotation_store_keeps_particles_on_sphere() {
        let mut store = TrajectoryStore::new(Box::new(RigidRotation), 16).unwrap();
        store.add(Vector::new(0.0, 0.6, 0.8)).unwrap();

        store.step_many(0.01, 100).unwrap();

        let state = store.state(0).unwrap();
        assert!((state.length() - 1.0).abs() < 1e-9);
        assert_eq!(store.field().name(), "rigid");
        assert_eq!(store.integrator().name(), "rk4");
    }

    #[test]
    fn test_depth_four_rigid_samples_follow_recurrence() {
        let mut store = TrajectoryStore::new(Box::new(RigidRotation), 4).unwrap();
        store.add(Vector::X).unwrap();
        for _ in 0..4 {
            store.step(0.1);
        }

        let mut expected = Vec::new();
        let mut state = Vector::X;
        for _ in 0..4 {
            state = RungeKuttaFourthOrder.advance(state, &RigidRotation, 0.1);
            expected.push(state.as_vec3());
        }
        expected.reverse();

        assert_eq!(store.trail(0).collect::<Vec<Vec3>>(), expected);
        assert_eq!(store.trail_length(0), Some(4));
        assert_eq!(store.cursor(), 0);
    }

    #[test]
    fn test_growth_past_1024_keeps_history() {
        let mut store = drift_store(4);
        store.add(Vector::ZERO).unwrap();
        store.step_many(1.0, 3).unwrap();

        for _ in 1..1025 {
            store.add(Vector::ZERO).unwrap();
        }

        assert_eq!(store.count(), 1025);
        assert_eq!(store.capacity(), 2048);
        assert_eq!(xs(&store, 0), vec![3.0, 2.0, 1.0]);
        assert_eq!(store.trail_length(1024), Some(0));
    }
}
