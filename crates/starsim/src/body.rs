use nalgebra::{Point2, Vector2};

use crate::error::ConfigError;
use crate::vector::{is_finite, is_finite_point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Point2<f64>,  // canvas units
    pub velocity: Vector2<f64>, // canvas units per time unit
    pub mass: f64,              // strictly positive
}

impl Body {
    /// Creates a body, rejecting non-positive mass and non-finite state.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::{Point2, Vector2};
    /// use starsim::body::Body;
    ///
    /// let body = Body::new(Point2::new(10.0, 20.0), Vector2::new(0.5, 0.0), 1.0).unwrap();
    /// assert_eq!(body.mass, 1.0);
    ///
    /// assert!(Body::new(Point2::origin(), Vector2::zeros(), 0.0).is_err());
    /// ```
    pub fn new(
        position: Point2<f64>,
        velocity: Vector2<f64>,
        mass: f64,
    ) -> Result<Self, ConfigError> {
        let body = Body {
            position,
            velocity,
            mass,
        };
        body.validate()?;
        Ok(body)
    }

    /// Checks the invariants `new` enforces, for bodies built field by field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(ConfigError::InvalidMass(self.mass));
        }
        if !is_finite_point(&self.position) || !is_finite(&self.velocity) {
            return Err(ConfigError::NonFiniteState);
        }
        Ok(())
    }

    pub fn momentum(&self) -> Vector2<f64> {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (self.position - other.position).magnitude()
    }

    /// Angular momentum about `origin` (z-component of r × p)
    pub fn angular_momentum_about(&self, origin: Point2<f64>) -> f64 {
        let r = self.position - origin;
        self.mass * (r.x * self.velocity.y - r.y * self.velocity.x)
    }
}

impl crate::arena_bhtree::Massive for Body {
    fn position(&self) -> Point2<f64> {
        self.position
    }

    fn mass(&self) -> f64 {
        self.mass
    }
}

/// Total linear momentum of a set of bodies
///
/// Zero for a seeded cluster and conserved by gravity alone, so drift here
/// measures numerical error.
pub fn total_momentum(bodies: &[Body]) -> Vector2<f64> {
    bodies
        .iter()
        .map(|b| b.momentum())
        .fold(Vector2::zeros(), |acc, p| acc + p)
}

pub fn total_kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(|b| b.kinetic_energy()).sum()
}

/// Total angular momentum about `origin`
pub fn total_angular_momentum(bodies: &[Body], origin: Point2<f64>) -> f64 {
    bodies
        .iter()
        .map(|b| b.angular_momentum_about(origin))
        .sum()
}

/// Mass-weighted mean position, or `None` for an empty slice
pub fn center_of_mass(bodies: &[Body]) -> Option<Point2<f64>> {
    let (mass, weighted) = bodies
        .iter()
        .fold((0.0f64, Vector2::zeros()), |(m, w), b| {
            (m + b.mass, w + b.position.coords * b.mass)
        });

    (mass > 0.0).then(|| Point2::from(weighted / mass))
}
