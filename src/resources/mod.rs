use crate::physics::fields::registry::FieldRegistry;
use crate::physics::stepper::FrameStepper;
use crate::physics::trajectory::{DirtyRange, TrajectoryStore};
use bevy::prelude::*;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

#[derive(Resource, Deref, DerefMut, Debug, Clone, PartialEq)]
pub struct SharedRng(pub ChaCha8Rng);

impl SharedRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::default(),
        }
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_rng(&mut rand::rng()))
    }
}

/// The particle store shared by the simulation and trail plugins
#[derive(Resource, Deref, DerefMut)]
pub struct Trajectories(pub TrajectoryStore);

#[derive(Resource, Deref, DerefMut)]
pub struct Stepper(pub FrameStepper);

/// Fields selectable at runtime
#[derive(Resource, Deref, Default)]
pub struct Fields(pub FieldRegistry);

/// Slots written by the most recent tick, `None` when the tick was paused
#[derive(Resource, Deref, DerefMut, Copy, Clone, Default, PartialEq, Debug)]
pub struct LastDirtyRange(pub Option<DirtyRange>);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_shared_rng_deterministic_with_seed() {
        let mut rng1 = SharedRng::from_seed(12345);
        let mut rng2 = SharedRng::from_seed(12345);

        let values1: Vec<f64> = (0..10).map(|_| rng1.random_range(0.0..1.0)).collect();
        let values2: Vec<f64> = (0..10).map(|_| rng2.random_range(0.0..1.0)).collect();

        assert_eq!(values1, values2);
    }

    #[test]
    fn test_shared_rng_from_optional_seed() {
        let mut rng_with_seed = SharedRng::from_optional_seed(Some(54321));
        let mut rng_with_same_seed = SharedRng::from_seed(54321);

        let value1: f64 = rng_with_seed.random_range(0.0..1.0);
        let value2: f64 = rng_with_same_seed.random_range(0.0..1.0);

        assert_eq!(value1, value2);
    }

    #[test]
    fn test_shared_rng_from_optional_seed_none() {
        let mut rng1 = SharedRng::from_optional_seed(None);
        let mut rng2 = SharedRng::from_optional_seed(None);

        let value1: u64 = rng1.random();
        let value2: u64 = rng2.random();

        // Independent entropy-seeded generators
        assert_ne!(value1, value2);
    }
}
