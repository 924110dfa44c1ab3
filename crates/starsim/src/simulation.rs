//! The simulation driver.
//!
//! A [`Simulation`] owns the bodies, the force model, the integrator and the
//! trajectory table for one run. [`Simulation::run`] executes every step in
//! order:
//!
//! 1. compute forces from the current snapshot,
//! 2. advance velocities then positions,
//! 3. record the new positions as pixels.
//!
//! A run happens once: `Initialized → Running → Completed`, or `Aborted` if
//! the numerics blow up. Steps completed before an abort stay recorded.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::body::{Body, total_kinetic_energy};
use crate::config::{ModelKind, SimulationConfig};
use crate::error::{ConfigError, OutOfRangeWarning, SimulationError};
use crate::forces::{ForceModel, Gravity};
use crate::integrator::{Integrator, SymplecticEuler};
use crate::trajectory::TrajectoryRecord;
use crate::vector::{is_finite, is_finite_point};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Initialized,
    Running,
    Completed,
    Aborted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initialized => write!(f, "initialized"),
            Phase::Running => write!(f, "running"),
            Phase::Completed => write!(f, "completed"),
            Phase::Aborted => write!(f, "aborted"),
        }
    }
}

/// Summary of a run, stored alongside the trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub width: u32,
    pub height: u32,
    pub step_count: usize,
    pub model: ModelKind,
    pub theta: f64,
    pub body_count: usize,
    pub steps_completed: usize,
    pub elapsed: Duration, // wall time spent in `run`
    pub warnings: Vec<OutOfRangeWarning>,
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub metadata: RunMetadata,
    pub trajectory: TrajectoryRecord,
}

pub struct Simulation {
    config: SimulationConfig,
    bodies: Vec<Body>,
    gravity: Gravity,
    integrator: Box<dyn Integrator>,
    trajectory: TrajectoryRecord,
    phase: Phase,
    warnings: Vec<OutOfRangeWarning>,
    elapsed: Duration,
}

impl Simulation {
    /// Creates a simulation over caller-supplied bodies
    ///
    /// The seeding fields of `config` (radius, mass, speed) are ignored; the
    /// body count comes from `bodies`.
    ///
    /// # Arguments
    ///
    /// * `config` - Run parameters, validated here
    /// * `bodies` - Initial bodies; each must have positive mass and finite state
    pub fn new(config: SimulationConfig, bodies: Vec<Body>) -> Result<Self, ConfigError> {
        config.validate_run()?;
        if bodies.is_empty() {
            return Err(ConfigError::NoBodies);
        }
        config.validate_table(bodies.len())?;
        for (index, body) in bodies.iter().enumerate() {
            body.validate().map_err(|reason| ConfigError::InvalidBody {
                index,
                reason: Box::new(reason),
            })?;
        }

        let trajectory = TrajectoryRecord::new(config.step_count, bodies.len());
        let gravity = Gravity::from_config(&config);

        Ok(Self {
            config,
            bodies,
            gravity,
            integrator: Box::new(SymplecticEuler),
            trajectory,
            phase: Phase::Initialized,
            warnings: Vec::new(),
            elapsed: Duration::ZERO,
        })
    }

    /// Seeds the circular cluster described by `config` and wraps it
    ///
    /// # Examples
    ///
    /// ```
    /// use starsim::config::SimulationConfig;
    /// use starsim::simulation::{Phase, Simulation};
    ///
    /// let config = SimulationConfig {
    ///     cluster_radius: 2,
    ///     step_count: 5,
    ///     ..SimulationConfig::default()
    /// };
    ///
    /// let mut sim = Simulation::from_config(config).unwrap();
    /// let metadata = sim.run().unwrap();
    ///
    /// assert_eq!(sim.phase(), Phase::Completed);
    /// assert_eq!(metadata.body_count, 12);
    /// assert_eq!(sim.trajectory().len(), 5 * 12);
    /// ```
    pub fn from_config(config: SimulationConfig) -> Result<Self, ConfigError> {
        let bodies = config.seed_bodies()?;
        Self::new(config, bodies)
    }

    /// Replaces the default symplectic Euler integrator
    pub fn with_integrator(mut self, integrator: impl Integrator + 'static) -> Self {
        self.integrator = Box::new(integrator);
        self
    }

    /// Runs every step, once
    ///
    /// Out-of-range pixel coordinates are clamped and collected as warnings.
    /// A non-finite force, position or velocity aborts the run; the steps
    /// before it remain in the trajectory.
    pub fn run(&mut self) -> Result<RunMetadata, SimulationError> {
        if self.phase != Phase::Initialized {
            return Err(SimulationError::AlreadyRun { phase: self.phase });
        }

        info!(
            "starting run: {} bodies, model {}, canvas {}x{}, {} steps",
            self.bodies.len(),
            self.gravity.kind(),
            self.config.canvas_width,
            self.config.canvas_height,
            self.config.step_count,
        );
        debug!("initial energy {:.6e}", self.total_energy());

        self.phase = Phase::Running;
        let started = Instant::now();
        let result = self.run_steps();
        self.elapsed = started.elapsed();

        match result {
            Ok(()) => {
                self.phase = Phase::Completed;
                info!(
                    "run completed in {:.3}s ({} warnings)",
                    self.elapsed.as_secs_f64(),
                    self.warnings.len()
                );
                debug!("final energy {:.6e}", self.total_energy());
                Ok(self.metadata())
            }
            Err(e) => {
                self.phase = Phase::Aborted;
                error!(
                    "run aborted after {} of {} steps: {}",
                    self.trajectory.steps_recorded(),
                    self.config.step_count,
                    e
                );
                Err(e)
            }
        }
    }

    fn run_steps(&mut self) -> Result<(), SimulationError> {
        let dt = self.config.time_step;

        for step in 0..self.config.step_count {
            let forces = self.gravity.forces(&self.bodies);
            if let Some(body) = forces.iter().position(|f| !is_finite(f)) {
                return Err(SimulationError::NonFiniteForce { step, body });
            }

            self.integrator.advance(&mut self.bodies, &forces, dt);
            if let Some(body) = self
                .bodies
                .iter()
                .position(|b| !is_finite_point(&b.position) || !is_finite(&b.velocity))
            {
                return Err(SimulationError::NonFinitePosition { step, body });
            }

            let warnings = self.trajectory.record(step, &self.bodies)?;
            for w in &warnings {
                warn!("{}", w);
            }
            self.warnings.extend(warnings);

            debug!("step {}/{} recorded", step + 1, self.config.step_count);
        }

        Ok(())
    }

    /// Kinetic plus potential energy of the current state
    pub fn total_energy(&self) -> f64 {
        total_kinetic_energy(&self.bodies) + self.gravity.potential_energy(&self.bodies)
    }

    /// Summary of the run so far
    pub fn metadata(&self) -> RunMetadata {
        RunMetadata {
            width: self.config.canvas_width,
            height: self.config.canvas_height,
            step_count: self.config.step_count,
            model: self.gravity.kind(),
            theta: self.config.theta,
            body_count: self.bodies.len(),
            steps_completed: self.trajectory.steps_recorded(),
            elapsed: self.elapsed,
            warnings: self.warnings.clone(),
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn trajectory(&self) -> &TrajectoryRecord {
        &self.trajectory
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Consumes the simulation, keeping what a caller persists
    pub fn into_output(self) -> RunOutput {
        RunOutput {
            metadata: self.metadata(),
            trajectory: self.trajectory,
        }
    }
}
