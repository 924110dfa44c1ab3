pub mod arena_bhtree;
pub mod body;
pub mod cluster;
pub mod config;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod simulation;
pub mod trajectory;
pub mod vector;

pub use body::Body;
pub use config::{ModelKind, SimulationConfig};
pub use error::{ConfigError, OutOfRangeWarning, SimulationError, TrajectoryError};
pub use simulation::{Phase, RunMetadata, RunOutput, Simulation};
pub use trajectory::{FrameView, Pixel, TrajectoryRecord};

#[cfg(test)]
mod arena_bhtree_test;
#[cfg(test)]
mod integrator_test;
