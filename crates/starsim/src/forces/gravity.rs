//! Direct N-body gravity (O(N²) implementation)

use nalgebra::Vector2;
use rayon::prelude::*;

use crate::body::Body;
use crate::forces::{ForceModel, Newtonian, direct_potential_energy};

/// Direct O(N²) gravitational force computation
///
/// Sums the pull of every other body, in index order, for each body. Simple
/// and exact, and the reference the tree model is checked against.
///
/// # Examples
///
/// ```
/// use nalgebra::{Point2, Vector2};
/// use starsim::body::Body;
/// use starsim::forces::{ExactGravity, ForceModel, Newtonian};
///
/// let bodies = vec![
///     Body::new(Point2::new(0.0, 0.0), Vector2::zeros(), 1.0).unwrap(),
///     Body::new(Point2::new(3.0, 0.0), Vector2::zeros(), 1.0).unwrap(),
/// ];
///
/// let gravity = ExactGravity::new(Newtonian::new(1.0, 0.0));
/// let forces = gravity.forces(&bodies);
///
/// // Equal and opposite
/// assert!(forces[0].x > 0.0);
/// assert_eq!(forces[0], -forces[1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExactGravity {
    pub law: Newtonian,
}

impl ExactGravity {
    pub fn new(law: Newtonian) -> Self {
        Self { law }
    }

    /// Net force on body `idx` from all other bodies
    pub fn force_on(&self, idx: usize, bodies: &[Body]) -> Vector2<f64> {
        let body = &bodies[idx];

        bodies
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != idx)
            .map(|(_, other)| {
                self.law
                    .pair_force(body.position, body.mass, other.position, other.mass)
            })
            .fold(Vector2::zeros(), |acc, f| acc + f)
    }
}

impl ForceModel for ExactGravity {
    fn forces(&self, bodies: &[Body]) -> Vec<Vector2<f64>> {
        (0..bodies.len())
            .into_par_iter()
            .map(|i| self.force_on(i, bodies))
            .collect()
    }

    fn potential_energy(&self, bodies: &[Body]) -> f64 {
        direct_potential_energy(&self.law, bodies)
    }
}
