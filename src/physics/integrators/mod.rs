//! Numerical integration of particle states along a vector field

use crate::physics::fields::VectorField;
use crate::physics::math::{Scalar, Vector};

pub mod runge_kutta;

pub use runge_kutta::RungeKuttaFourthOrder;

/// Base trait for fixed-step explicit integrators
pub trait Integrator: Send + Sync {
    /// Advance a single state by one time step of the given field.
    ///
    /// Implementations must not allocate and must return identical results for identical
    /// inputs. Non-finite velocities are carried into the result unchanged.
    fn advance(&self, state: Vector, field: &dyn VectorField, dt: Scalar) -> Vector;

    /// Order of the local truncation error
    fn convergence_order(&self) -> usize;

    fn name(&self) -> &'static str;

    fn clone_box(&self) -> Box<dyn Integrator>;
}
