//! Tree-based gravity using Barnes-Hut algorithm (O(N log N))

use nalgebra::Vector2;
use rayon::prelude::*;

use crate::arena_bhtree::BHTree;
use crate::body::Body;
use crate::forces::{ForceModel, Newtonian, direct_potential_energy};

/// Default opening angle
pub const DEFAULT_THETA: f64 = 0.5;

/// Barnes-Hut tree-based gravitational force computation
///
/// Builds one quadtree per call and evaluates every body against it. The tree
/// is read-only while forces are evaluated, so bodies are processed in
/// parallel.
///
/// # Opening Angle (θ)
///
/// Controls the accuracy/speed tradeoff:
/// - θ = 0.0: Exact (same forces as `ExactGravity`)
/// - θ = 0.5: High accuracy (default)
/// - θ = 1.0: Lower accuracy, faster
///
/// # Examples
///
/// ```
/// use nalgebra::{Point2, Vector2};
/// use starsim::body::Body;
/// use starsim::forces::{BarnesHutGravity, ExactGravity, ForceModel, Newtonian};
///
/// let bodies = vec![
///     Body::new(Point2::new(0.0, 0.0), Vector2::zeros(), 1.0).unwrap(),
///     Body::new(Point2::new(1.0, 0.0), Vector2::zeros(), 1.0).unwrap(),
///     Body::new(Point2::new(20.0, 20.0), Vector2::zeros(), 1.0).unwrap(),
/// ];
///
/// let law = Newtonian::new(1.0, 0.1);
/// let tree = BarnesHutGravity::new(law, 0.0).forces(&bodies);
/// let exact = ExactGravity::new(law).forces(&bodies);
///
/// for (a, b) in tree.iter().zip(&exact) {
///     assert!((a - b).magnitude() < 1e-12);
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BarnesHutGravity {
    pub law: Newtonian,
    /// Opening angle parameter (typically 0.5)
    pub theta: f64,
}

impl BarnesHutGravity {
    pub fn new(law: Newtonian, theta: f64) -> Self {
        Self { law, theta }
    }

    /// Tree gravity with the default opening angle
    pub fn with_default_theta(law: Newtonian) -> Self {
        Self::new(law, DEFAULT_THETA)
    }
}

impl ForceModel for BarnesHutGravity {
    fn forces(&self, bodies: &[Body]) -> Vec<Vector2<f64>> {
        if bodies.is_empty() {
            return Vec::new();
        }

        let tree = BHTree::build(bodies);

        (0..bodies.len())
            .into_par_iter()
            .map(|i| tree.force_on(i, self.theta, &self.law))
            .collect()
    }

    fn potential_energy(&self, bodies: &[Body]) -> f64 {
        direct_potential_energy(&self.law, bodies)
    }
}
