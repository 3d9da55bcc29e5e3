//! Vector fields that drive particle motion
//!
//! A field maps a particle state to its velocity. Fields are stateless and are selected at
//! runtime through the [`registry::FieldRegistry`], so the integrator never needs to know which
//! variant it is advancing.
//!
//! The rigid rotations divide by the horizontal radius `sqrt(x² + y²)`. On the z axis that
//! radius is zero and the velocity comes out as NaN; the value is returned as-is and will
//! propagate through every later step of that particle.

use crate::physics::math::{Scalar, Vector};

pub mod registry;

/// A velocity field over 3D states
pub trait VectorField: Send + Sync {
    /// Velocity at the given state
    fn velocity(&self, state: Vector) -> Vector;

    /// Canonical name used for lookup in the registry
    fn name(&self) -> &'static str;

    /// Alternative names accepted by the registry
    fn aliases(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn clone_box(&self) -> Box<dyn VectorField>;
}

#[inline]
fn horizontal_radius(state: Vector) -> Scalar {
    libm::sqrt(state.x * state.x + state.y * state.y)
}

/// Rotation about the z axis induced by the stream function `Ψ = z` on the unit sphere.
///
/// The azimuthal direction is scaled by `sqrt(1 - z²)`, so on the unit sphere the velocity is
/// exactly `(-y, x, 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RigidRotation;

impl VectorField for RigidRotation {
    fn velocity(&self, state: Vector) -> Vector {
        let scale = libm::sqrt(1.0 - state.z * state.z) / horizontal_radius(state);
        Vector::new(-state.y * scale, state.x * scale, 0.0)
    }

    fn name(&self) -> &'static str {
        "rigid"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["rigid_rotation"]
    }

    fn clone_box(&self) -> Box<dyn VectorField> {
        Box::new(*self)
    }
}

/// Unit-speed azimuthal rotation, the same direction as [`RigidRotation`] without the
/// `sqrt(1 - z²)` factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnscaledRigidRotation;

impl VectorField for UnscaledRigidRotation {
    fn velocity(&self, state: Vector) -> Vector {
        let rho = horizontal_radius(state);
        Vector::new(-state.y / rho, state.x / rho, 0.0)
    }

    fn name(&self) -> &'static str {
        "rigid_unscaled"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["rigid_flat"]
    }

    fn clone_box(&self) -> Box<dyn VectorField> {
        Box::new(*self)
    }
}

/// Differential rotation whose angular speed is an even polynomial in `z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GibbsRotation;

impl GibbsRotation {
    const C0: Scalar = 0.0696;
    const C2: Scalar = 3.0 * 0.0104;
    const C4: Scalar = 5.0 * 0.1;
    const SPEED: Scalar = 10.0;

    /// Angular speed at height `z`
    pub fn angular_speed(z: Scalar) -> Scalar {
        let z2 = z * z;
        Self::SPEED * (Self::C0 + Self::C2 * z2 + Self::C4 * z2 * z2)
    }
}

impl VectorField for GibbsRotation {
    fn velocity(&self, state: Vector) -> Vector {
        let omega = Self::angular_speed(state.z);
        Vector::new(-state.y * omega, state.x * omega, 0.0)
    }

    fn name(&self) -> &'static str {
        "gibbs1"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["gibbs"]
    }

    fn clone_box(&self) -> Box<dyn VectorField> {
        Box::new(*self)
    }
}
