//! Property tests for the trajectory store
//!
//! A reference history of every particle's states is recorded alongside the store and compared
//! against what the store reports through its trail iterators.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use vfield::physics::fields::GibbsRotation;
use vfield::physics::math::random_unit_vector;
use vfield::physics::trajectory::COMPONENTS;
use vfield::{DirtyRange, SimulationError, TrajectoryStore, Vector};

const DT: f64 = 0.01;

/// Store plus the full state history of each particle, newest last
struct Tracked {
    store: TrajectoryStore,
    history: Vec<Vec<Vector>>,
}

impl Tracked {
    fn new(depth: usize) -> Self {
        Self {
            store: TrajectoryStore::new(Box::new(GibbsRotation), depth).unwrap(),
            history: Vec::new(),
        }
    }

    fn add(&mut self, state: Vector) {
        self.store.add(state).unwrap();
        self.history.push(Vec::new());
    }

    fn step(&mut self) -> DirtyRange {
        let range = self.store.step(DT);
        for (history, state) in self.history.iter_mut().zip(self.store.states()) {
            history.push(*state);
        }
        range
    }

    /// Samples the store should report for `particle`, newest first
    fn expected_trail(&self, particle: usize) -> Vec<[f32; 3]> {
        let length = self.store.trail_length(particle).unwrap();
        self.history[particle]
            .iter()
            .rev()
            .take(length)
            .map(|state| state.as_vec3().to_array())
            .collect()
    }

    fn assert_trails_match(&self) {
        for particle in 0..self.store.count() {
            let actual: Vec<[f32; 3]> = self
                .store
                .trail(particle)
                .map(|sample| sample.to_array())
                .collect();
            assert_eq!(
                actual,
                self.expected_trail(particle),
                "Trail of particle {particle} differs from recorded history"
            );
        }
    }
}

#[test]
fn test_trail_length_saturates_at_depth() {
    let mut tracked = Tracked::new(16);
    tracked.add(Vector::new(0.6, 0.0, 0.8));

    for step in 1..=40 {
        tracked.step();
        assert_eq!(tracked.store.trail_length(0), Some(step.min(16)));
    }
}

#[test]
fn test_trails_follow_history_under_random_operations() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut tracked = Tracked::new(8);
    let depths = [4, 8, 16, 32, 5, 13];

    for _ in 0..400 {
        match rng.random_range(0..10) {
            0..=1 => tracked.add(random_unit_vector(&mut rng)),
            2 => {
                let depth = depths[rng.random_range(0..depths.len())];
                tracked.store.set_depth(depth).unwrap();
            }
            _ => {
                tracked.step();
            }
        }

        assert!(tracked.store.capacity().is_power_of_two() || tracked.store.capacity() == 0);
        assert!(tracked.store.capacity() >= tracked.store.count());
        assert!(tracked.store.cursor() < tracked.store.depth());
        assert!(
            tracked
                .store
                .trail_lengths()
                .iter()
                .all(|&length| length <= tracked.store.depth())
        );
        tracked.assert_trails_match();
    }
}

#[test]
fn test_growth_preserves_existing_trails_bitwise() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut tracked = Tracked::new(32);
    tracked.add(random_unit_vector(&mut rng));
    for _ in 0..20 {
        tracked.step();
    }

    let before: Vec<[f32; 3]> = tracked.store.trail(0).map(|s| s.to_array()).collect();
    for _ in 0..40 {
        tracked.add(random_unit_vector(&mut rng));
    }
    let after: Vec<[f32; 3]> = tracked.store.trail(0).map(|s| s.to_array()).collect();

    assert_eq!(tracked.store.capacity(), 64);
    assert_eq!(before, after);
}

#[test]
fn test_step_many_range_covers_every_written_slot() {
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    for _ in 0..200 {
        let depth = rng.random_range(1..20);
        let warmup = rng.random_range(0..30);
        let sub_steps = rng.random_range(1..30);

        let mut store = TrajectoryStore::new(Box::new(GibbsRotation), depth).unwrap();
        store.add(Vector::new(0.0, 1.0, 0.0)).unwrap();
        for _ in 0..warmup {
            store.step(DT);
        }

        let mut single = store.clone();
        let written: Vec<usize> = (0..sub_steps)
            .map(|_| single.step(DT).start())
            .collect();
        let range = store.step_many(DT, sub_steps).unwrap();

        for slot in 0..depth {
            assert_eq!(
                range.contains(slot),
                written.contains(&slot),
                "depth {depth}, warmup {warmup}, sub steps {sub_steps}, slot {slot}"
            );
        }
        assert_eq!(store.trail_buffer(), single.trail_buffer());
    }
}

#[test]
fn test_dirty_spans_are_the_only_changed_floats() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut store = TrajectoryStore::new(Box::new(GibbsRotation), 16).unwrap();
    for _ in 0..5 {
        store.add(random_unit_vector(&mut rng)).unwrap();
    }
    store.step_many(DT, 11).unwrap();

    let before = store.trail_buffer().to_vec();
    let range = store.step_many(DT, 7).unwrap();
    let after = store.trail_buffer();

    let mut covered = vec![false; after.len()];
    for span in store.dirty_spans(&range) {
        assert_eq!(span.len() % COMPONENTS, 0);
        covered[span].fill(true);
    }
    for (i, (old, new)) in before.iter().zip(after).enumerate() {
        if !covered[i] {
            assert_eq!(old, new, "Float {i} changed outside the dirty spans");
        }
    }
}

#[test]
fn test_rejected_operations_leave_store_unchanged() {
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let mut store = TrajectoryStore::new(Box::new(GibbsRotation), 8).unwrap();
    for _ in 0..3 {
        store.add(random_unit_vector(&mut rng)).unwrap();
    }
    store.step_many(DT, 5).unwrap();
    let snapshot = store.clone();

    assert_eq!(store.set_depth(0), Err(SimulationError::ZeroDepth));
    assert_eq!(store.step_many(DT, 0), Err(SimulationError::ZeroSubSteps));
    assert!(store.add(Vector::new(0.0, f64::INFINITY, 0.0)).is_err());

    assert_eq!(store.trail_buffer(), snapshot.trail_buffer());
    assert_eq!(store.trail_lengths(), snapshot.trail_lengths());
    assert_eq!(store.states(), snapshot.states());
    assert_eq!(store.cursor(), snapshot.cursor());
    assert_eq!(store.depth(), snapshot.depth());
    assert_eq!(store.layout_epoch(), snapshot.layout_epoch());
}

#[test]
fn test_depth_round_trip_keeps_newest_samples() {
    let mut tracked = Tracked::new(64);
    tracked.add(Vector::new(0.6, 0.0, 0.8));
    for _ in 0..100 {
        tracked.step();
    }

    tracked.store.set_depth(16).unwrap();
    tracked.store.set_depth(64).unwrap();

    assert_eq!(tracked.store.trail_length(0), Some(16));
    tracked.assert_trails_match();

    for _ in 0..10 {
        tracked.step();
    }
    assert_eq!(tracked.store.trail_length(0), Some(26));
    tracked.assert_trails_match();
}
