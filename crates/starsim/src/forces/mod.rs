//! Force models for the cluster simulation
//!
//! A force model turns the current body set into one net force per body.
//! Two models share the same softened inverse-square law ([`Newtonian`]):
//!
//! - [`ExactGravity`]: direct O(N²) pairwise summation
//! - [`BarnesHutGravity`]: quadtree approximation, O(N log N)
//!
//! [`Gravity`] selects one of them once, from the run configuration.

use nalgebra::{Point2, Vector2};

use crate::body::Body;
use crate::config::{ModelKind, SimulationConfig};

pub mod gravity;
pub mod tree_gravity;

#[cfg(test)]
mod gravity_test;

pub use gravity::ExactGravity;
pub use tree_gravity::BarnesHutGravity;

/// Softened Newtonian gravity between two point masses
///
/// `F = G m_i m_j (p_j - p_i) / (|p_j - p_i|² + ε²)^(3/2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Newtonian {
    /// Gravitational constant in canvas units
    pub g: f64,
    /// Softening length ε
    pub softening: f64,
}

impl Newtonian {
    pub fn new(g: f64, softening: f64) -> Self {
        Self { g, softening }
    }

    /// Force on mass `mi` at `pi` from mass `mj` at `pj`
    ///
    /// Coincident bodies with zero softening contribute nothing rather than
    /// dividing by zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::Point2;
    /// use starsim::forces::Newtonian;
    ///
    /// let law = Newtonian::new(1.0, 0.0);
    /// let f = law.pair_force(Point2::new(0.0, 0.0), 1.0, Point2::new(2.0, 0.0), 4.0);
    /// assert!((f.x - 1.0).abs() < 1e-12); // G m m / r² = 4 / 4
    /// ```
    #[inline]
    pub fn pair_force(
        &self,
        pi: Point2<f64>,
        mi: f64,
        pj: Point2<f64>,
        mj: f64,
    ) -> Vector2<f64> {
        let dr = pj - pi;
        let dist_sq = dr.magnitude_squared() + self.softening * self.softening;
        if dist_sq == 0.0 {
            return Vector2::zeros();
        }

        dr * (self.g * mi * mj / (dist_sq * dist_sq.sqrt()))
    }

    /// Potential energy of one pair, `-G m_i m_j / sqrt(d² + ε²)`
    #[inline]
    pub fn pair_potential(&self, pi: Point2<f64>, mi: f64, pj: Point2<f64>, mj: f64) -> f64 {
        let dist_sq = (pj - pi).magnitude_squared() + self.softening * self.softening;
        if dist_sq == 0.0 {
            return 0.0;
        }

        -self.g * mi * mj / dist_sq.sqrt()
    }
}

/// Computes the net force on every body from a consistent snapshot
///
/// Implementations are stateless between calls: anything they build (such as
/// a quadtree) lives only for the duration of one `forces` call.
pub trait ForceModel: Send + Sync {
    /// One net force per body, same order and length as `bodies`
    fn forces(&self, bodies: &[Body]) -> Vec<Vector2<f64>>;

    /// Total potential energy of the body set
    fn potential_energy(&self, bodies: &[Body]) -> f64;
}

/// The two force models, selected once per run
#[derive(Debug, Clone, PartialEq)]
pub enum Gravity {
    Exact(ExactGravity),
    BarnesHut(BarnesHutGravity),
}

impl Gravity {
    /// Picks the model named in `config`
    pub fn from_config(config: &SimulationConfig) -> Self {
        let law = Newtonian::new(config.gravitational_constant, config.softening);
        match config.model {
            ModelKind::Exact => Gravity::Exact(ExactGravity::new(law)),
            ModelKind::BarnesHut => Gravity::BarnesHut(BarnesHutGravity::new(law, config.theta)),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Gravity::Exact(_) => ModelKind::Exact,
            Gravity::BarnesHut(_) => ModelKind::BarnesHut,
        }
    }

    pub fn as_force_model(&self) -> &dyn ForceModel {
        match self {
            Gravity::Exact(g) => g,
            Gravity::BarnesHut(g) => g,
        }
    }
}

impl ForceModel for Gravity {
    fn forces(&self, bodies: &[Body]) -> Vec<Vector2<f64>> {
        self.as_force_model().forces(bodies)
    }

    fn potential_energy(&self, bodies: &[Body]) -> f64 {
        self.as_force_model().potential_energy(bodies)
    }
}

/// Direct pairwise potential energy, shared by both models
///
/// The tree model reports this exact sum too, never a tree estimate.
pub(crate) fn direct_potential_energy(law: &Newtonian, bodies: &[Body]) -> f64 {
    bodies
        .iter()
        .enumerate()
        .flat_map(|(i, a)| {
            bodies[i + 1..]
                .iter()
                .map(move |b| law.pair_potential(a.position, a.mass, b.position, b.mass))
        })
        .sum()
}
