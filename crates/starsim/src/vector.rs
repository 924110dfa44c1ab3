//! 2D vector helpers on top of `nalgebra`.
//!
//! Positions are `Point2<f64>` and velocities/forces are `Vector2<f64>`, the
//! same split `nalgebra` makes between affine points and free vectors.
//! Addition, subtraction, scaling and norms come from `nalgebra` directly;
//! this module only adds the few operations the engine needs on top.

use nalgebra::{Point2, Vector2};

/// Position in simulation (= canvas) units
pub type Position = Point2<f64>;

/// Velocity, force or acceleration
pub type Vec2 = Vector2<f64>;

/// Returns the unit vector pointing along `v`, or zero for a zero vector.
///
/// # Examples
///
/// ```
/// use nalgebra::Vector2;
/// use starsim::vector::unit_or_zero;
///
/// let u = unit_or_zero(Vector2::new(3.0, 4.0));
/// assert!((u.magnitude() - 1.0).abs() < 1e-12);
///
/// assert_eq!(unit_or_zero(Vector2::zeros()), Vector2::zeros());
/// ```
pub fn unit_or_zero(v: Vec2) -> Vec2 {
    let norm = v.magnitude();
    if norm > 0.0 { v / norm } else { Vec2::zeros() }
}

/// Clockwise perpendicular: `(x, y) -> (y, -x)`
pub fn perpendicular_cw(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// True when both components are finite (no NaN, no infinity)
#[inline]
pub fn is_finite(v: &Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// True when both coordinates are finite
#[inline]
pub fn is_finite_point(p: &Position) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
