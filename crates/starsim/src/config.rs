//! Run configuration.
//!
//! A [`SimulationConfig`] fixes everything about a run up front; it is
//! validated once and never changes while the run is in progress. It can be
//! loaded from YAML, where every field is optional:
//!
//! ```yaml
//! cluster_radius: 12      # lattice radius; 12 seeds 448 bodies
//! step_count: 100
//! model: BarnesHut        # or Exact
//! theta: 0.5              # opening angle, BarnesHut only
//! canvas_width: 1920
//! canvas_height: 1080
//! time_step: 1.0
//! gravitational_constant: 0.01
//! softening: 0.5
//! body_mass: 1.0
//! seed_speed: 0.5
//! ```

use std::fmt;
use std::str::FromStr;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::cluster::{canvas_center, circular_cluster, cluster_size};
use crate::error::ConfigError;
use crate::trajectory::TrajectoryRecord;

/// Which force model computes gravity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Direct pairwise summation
    #[default]
    Exact,
    /// Quadtree approximation
    BarnesHut,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Exact => write!(f, "Exact"),
            ModelKind::BarnesHut => write!(f, "BarnesHut"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("exact") {
            Ok(ModelKind::Exact)
        } else if s.eq_ignore_ascii_case("barneshut") || s.eq_ignore_ascii_case("barnes-hut") {
            Ok(ModelKind::BarnesHut)
        } else {
            Err(ConfigError::UnknownModel(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub cluster_radius: u32,         // lattice radius of the seeded disc
    pub step_count: usize,           // number of recorded steps
    pub model: ModelKind,            // force model
    pub theta: f64,                  // Barnes-Hut opening angle
    pub canvas_width: u32,           // pixels
    pub canvas_height: u32,          // pixels
    pub time_step: f64,              // dt per step
    pub gravitational_constant: f64, // G in canvas units
    pub softening: f64,              // ε, keeps close encounters finite
    pub body_mass: f64,              // mass of every seeded body
    pub seed_speed: f64,             // initial tangential speed
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cluster_radius: 12,
            step_count: 100,
            model: ModelKind::Exact,
            theta: 0.5,
            canvas_width: 1920,
            canvas_height: 1080,
            time_step: 1.0,
            gravitational_constant: 0.01,
            softening: 0.5,
            body_mass: 1.0,
            seed_speed: 0.5,
        }
    }
}

impl SimulationConfig {
    /// Checks every parameter, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster_radius == 0 {
            return Err(ConfigError::ZeroClusterRadius);
        }
        self.validate_run()?;
        self.validate_table(self.body_count())?;
        positive("body_mass", self.body_mass)?;
        if !(self.seed_speed.is_finite() && self.seed_speed >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "seed_speed",
                value: self.seed_speed,
            });
        }
        Ok(())
    }

    /// Checks the parameters that matter when the caller supplies the bodies
    /// (everything except the seeding fields)
    pub fn validate_run(&self) -> Result<(), ConfigError> {
        if self.step_count == 0 {
            return Err(ConfigError::ZeroStepCount);
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::ZeroCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        positive("time_step", self.time_step)?;
        positive("gravitational_constant", self.gravitational_constant)?;
        non_negative("softening", self.softening)?;
        non_negative("theta", self.theta)?;
        Ok(())
    }

    /// Checks that a trajectory of `step_count` frames for `bodies` bodies
    /// can be allocated
    pub fn validate_table(&self, bodies: usize) -> Result<(), ConfigError> {
        match TrajectoryRecord::cell_count(self.step_count, bodies) {
            Some(_) => Ok(()),
            None => Err(ConfigError::TableTooLarge {
                steps: self.step_count,
                bodies,
            }),
        }
    }

    /// Number of bodies the seeded cluster will hold
    pub fn body_count(&self) -> usize {
        cluster_size(self.cluster_radius)
    }

    /// Center of the canvas, where the cluster is seeded
    pub fn center(&self) -> Point2<f64> {
        canvas_center(self.canvas_width, self.canvas_height)
    }

    /// Seeds the circular cluster this configuration describes
    pub fn seed_bodies(&self) -> Result<Vec<Body>, ConfigError> {
        self.validate()?;
        circular_cluster(
            self.cluster_radius,
            self.center(),
            self.seed_speed,
            self.body_mass,
        )
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}
