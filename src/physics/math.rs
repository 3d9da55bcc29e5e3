use rand::Rng;

/// Scalar type for integration (f64 for precision)
pub type Scalar = f64;

/// 3D vector type for particle states and velocities
pub type Vector = bevy::math::DVec3;

/// Samples a point uniformly distributed on the unit sphere.
///
/// `z` is uniform in `(-1, 1]` and the azimuth is uniform in `[0, 2π)`, which by
/// Archimedes' hat-box theorem gives a uniform surface density.
pub fn random_unit_vector(rng: &mut impl Rng) -> Vector {
    let u: Scalar = rng.random();
    let v: Scalar = rng.random();

    let z = 1.0 - 2.0 * u;
    let r = libm::sqrt(1.0 - z * z);
    let azimuth = 2.0 * core::f64::consts::PI * v;

    Vector::new(r * libm::cos(azimuth), r * libm::sin(azimuth), z)
}

/// Offsets each coordinate of `state` by an independent value in `[-magnitude/2, magnitude/2)`.
pub fn jitter(state: Vector, magnitude: Scalar, rng: &mut impl Rng) -> Vector {
    let mut offset = || (rng.random::<Scalar>() - 0.5) * magnitude;
    state + Vector::new(offset(), offset(), offset())
}

/// Smallest power of two that holds `count` particles, or zero for an empty store.
pub fn capacity_for(count: usize) -> Option<usize> {
    match count {
        0 => Some(0),
        n => n.checked_next_power_of_two(),
    }
}
