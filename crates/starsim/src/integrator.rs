//! Time integration for the cluster
//!
//! The engine advances bodies with semi-implicit (symplectic) Euler: the
//! velocity is updated from the force first, and the position then moves with
//! the *new* velocity. Explicit Euler is kept for comparison only.

use nalgebra::Vector2;

use crate::body::Body;

/// Advances bodies by one time step given the forces acting on them
pub trait Integrator: Send + Sync {
    /// Advance every body by `dt`
    ///
    /// # Arguments
    ///
    /// * `bodies` - Bodies to update in place
    /// * `forces` - Net force per body, same order as `bodies`
    /// * `dt` - Time step
    fn advance(&self, bodies: &mut [Body], forces: &[Vector2<f64>], dt: f64);
}

/// Semi-implicit Euler integrator (1st order, symplectic)
///
/// 1. Kick: v(t + dt) = v(t) + F(t)/m * dt
/// 2. Drift: x(t + dt) = x(t) + v(t + dt) * dt
///
/// # Examples
///
/// ```
/// use nalgebra::{Point2, Vector2};
/// use starsim::body::Body;
/// use starsim::integrator::{Integrator, SymplecticEuler};
///
/// let mut bodies = [Body::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0), 2.0).unwrap()];
/// let forces = [Vector2::new(0.0, 4.0)];
///
/// SymplecticEuler.advance(&mut bodies, &forces, 0.5);
///
/// // Velocity gains F/m * dt, position moves with the new velocity
/// assert_eq!(bodies[0].velocity, Vector2::new(1.0, 1.0));
/// assert_eq!(bodies[0].position, Point2::new(0.5, 0.5));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymplecticEuler;

impl Integrator for SymplecticEuler {
    fn advance(&self, bodies: &mut [Body], forces: &[Vector2<f64>], dt: f64) {
        bodies
            .iter_mut()
            .zip(forces.iter())
            .for_each(|(body, force)| {
                body.velocity += force / body.mass * dt;
                body.position += body.velocity * dt;
            });
    }
}

/// Explicit Euler integrator (1st order, for testing/comparison only)
///
/// Moves positions with the *old* velocity. It does not conserve energy and
/// a bound cluster slowly heats up; use [`SymplecticEuler`] instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
    fn advance(&self, bodies: &mut [Body], forces: &[Vector2<f64>], dt: f64) {
        bodies
            .iter_mut()
            .zip(forces.iter())
            .for_each(|(body, force)| {
                body.position += body.velocity * dt;
                body.velocity += force / body.mass * dt;
            });
    }
}
