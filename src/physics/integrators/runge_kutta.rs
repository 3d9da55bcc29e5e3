//! Runge-Kutta integration methods

use super::Integrator;
use crate::physics::fields::VectorField;
use crate::physics::math::{Scalar, Vector};

/// Fourth-order Runge-Kutta integrator (RK4)
///
/// A classic multi-stage integrator that provides fourth-order accuracy
/// by combining four intermediate evaluations of the field.
///
/// The RK4 algorithm:
/// 1. k1 = f(y)
/// 2. k2 = f(y + k1*dt/2)
/// 3. k3 = f(y + k2*dt/2)
/// 4. k4 = f(y + k3*dt)
/// 5. y(t+dt) = y(t) + dt/6 * (k1 + 2*k2 + 2*k3 + k4)
#[derive(Debug, Clone, Copy, Default)]
pub struct RungeKuttaFourthOrder;

impl Integrator for RungeKuttaFourthOrder {
    fn advance(&self, state: Vector, field: &dyn VectorField, dt: Scalar) -> Vector {
        let half_dt = dt / 2.0;

        let k1 = field.velocity(state);
        let k2 = field.velocity(state + k1 * half_dt);
        let k3 = field.velocity(state + k2 * half_dt);
        let k4 = field.velocity(state + k3 * dt);

        state + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
    }

    fn convergence_order(&self) -> usize {
        4
    }

    fn name(&self) -> &'static str {
        "rk4"
    }

    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }
}
