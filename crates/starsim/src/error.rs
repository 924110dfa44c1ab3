//! Error and warning types for the simulation engine.
//!
//! - [`ConfigError`]: invalid run parameters or bodies, fatal at construction
//! - [`SimulationError`]: fatal failures while running (non-finite numerics,
//!   misuse of the run lifecycle)
//! - [`TrajectoryError`]: misuse of the trajectory table
//! - [`OutOfRangeWarning`]: a recorded coordinate did not fit the pixel range;
//!   recoverable, carried in the run metadata

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::simulation::Phase;

/// Invalid configuration or initial state.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Cluster radius must be at least 1 (radius 0 seeds no bodies).
    ZeroClusterRadius,
    /// A run needs at least one step.
    ZeroStepCount,
    /// Both canvas dimensions must be non-zero.
    ZeroCanvas { width: u32, height: u32 },
    /// A numeric parameter is out of its valid range.
    InvalidParameter { name: &'static str, value: f64 },
    /// Model name is neither `Exact` nor `BarnesHut`.
    UnknownModel(String),
    /// The body list is empty.
    NoBodies,
    /// Mass must be finite and strictly positive.
    InvalidMass(f64),
    /// Position or velocity has a NaN or infinite component.
    NonFiniteState,
    /// A caller-supplied body failed validation.
    InvalidBody { index: usize, reason: Box<ConfigError> },
    /// `steps x bodies` trajectory cells do not fit in `usize`.
    TableTooLarge { steps: usize, bodies: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroClusterRadius => write!(f, "cluster radius must be at least 1"),
            ConfigError::ZeroStepCount => write!(f, "step count must be at least 1"),
            ConfigError::ZeroCanvas { width, height } => {
                write!(f, "canvas must be non-empty, got {}x{}", width, height)
            }
            ConfigError::InvalidParameter { name, value } => {
                write!(f, "invalid value for {}: {}", name, value)
            }
            ConfigError::UnknownModel(name) => write!(
                f,
                "unknown gravity model {:?}, expected \"Exact\" or \"BarnesHut\"",
                name
            ),
            ConfigError::NoBodies => write!(f, "simulation needs at least one body"),
            ConfigError::InvalidMass(mass) => {
                write!(f, "body mass must be finite and positive, got {}", mass)
            }
            ConfigError::NonFiniteState => {
                write!(f, "body position and velocity must be finite")
            }
            ConfigError::InvalidBody { index, reason } => {
                write!(f, "body {}: {}", index, reason)
            }
            ConfigError::TableTooLarge { steps, bodies } => write!(
                f,
                "trajectory of {} steps x {} bodies is too large",
                steps, bodies
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidBody { reason, .. } => Some(reason.as_ref()),
            _ => None,
        }
    }
}

/// Misuse of a [`TrajectoryRecord`](crate::trajectory::TrajectoryRecord).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrajectoryError {
    /// Steps must be recorded in order, each exactly once.
    OutOfOrder { expected: usize, got: usize },
    /// The body slice does not match the table width.
    BodyCountMismatch { expected: usize, got: usize },
    /// Every step has already been written.
    Full { step_count: usize },
    /// A deserialized table has frames of different widths.
    Ragged { step: usize, expected: usize, got: usize },
}

impl fmt::Display for TrajectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrajectoryError::OutOfOrder { expected, got } => {
                write!(f, "expected to record step {}, got step {}", expected, got)
            }
            TrajectoryError::BodyCountMismatch { expected, got } => {
                write!(f, "trajectory holds {} bodies, got {}", expected, got)
            }
            TrajectoryError::Full { step_count } => {
                write!(f, "all {} steps already recorded", step_count)
            }
            TrajectoryError::Ragged {
                step,
                expected,
                got,
            } => write!(
                f,
                "frame {} has {} bodies, expected {}",
                step, got, expected
            ),
        }
    }
}

impl std::error::Error for TrajectoryError {}

/// Fatal errors raised while constructing or running a simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Configuration or initial bodies rejected.
    Config(ConfigError),
    /// Force computation produced NaN or infinity.
    NonFiniteForce { step: usize, body: usize },
    /// Integration produced a NaN or infinite position or velocity.
    NonFinitePosition { step: usize, body: usize },
    /// `run` was called on a simulation that is not freshly initialized.
    AlreadyRun { phase: Phase },
    /// The recorder rejected a write.
    Trajectory(TrajectoryError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "configuration error: {}", e),
            SimulationError::NonFiniteForce { step, body } => {
                write!(f, "non-finite force on body {} at step {}", body, step)
            }
            SimulationError::NonFinitePosition { step, body } => {
                write!(f, "non-finite state for body {} at step {}", body, step)
            }
            SimulationError::AlreadyRun { phase } => {
                write!(f, "simulation cannot run again (phase: {})", phase)
            }
            SimulationError::Trajectory(e) => write!(f, "trajectory error: {}", e),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            SimulationError::Trajectory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}

impl From<TrajectoryError> for SimulationError {
    fn from(e: TrajectoryError) -> Self {
        SimulationError::Trajectory(e)
    }
}

/// Coordinate axis, used to report which component left the pixel range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// A recorded coordinate fell outside `[0, 65535]` and was clamped.
///
/// Bodies that leave the canvas this far indicate the cluster radius, step
/// count and force parameters let the cluster fly apart; the stored pixel is
/// the nearest representable one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutOfRangeWarning {
    pub step: usize,
    pub body: usize,
    pub axis: Axis,
    /// Unclamped coordinate, after rounding
    pub value: f64,
}

impl fmt::Display for OutOfRangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}: body {} {} = {} outside pixel range, clamped",
            self.step, self.body, self.axis, self.value
        )
    }
}
