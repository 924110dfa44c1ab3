//! JSON persistence for run results.
//!
//! A result file is one pretty-printed [`RunOutput`]: the run metadata plus
//! the trajectory as nested `[x, y]` pixel arrays.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use starsim::RunOutput;

/// Errors that can occur while saving or loading a result file.
#[derive(Debug)]
pub enum OutputError {
    /// Failed to open, read or write the file.
    Io(std::io::Error),
    /// The contents are not a valid result document.
    Json(serde_json::Error),
    /// The metadata disagrees with the stored trajectory.
    Inconsistent {
        field: &'static str,
        metadata: usize,
        trajectory: usize,
    },
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "Failed to access result file: {}", e),
            OutputError::Json(e) => write!(f, "Invalid result document: {}", e),
            OutputError::Inconsistent {
                field,
                metadata,
                trajectory,
            } => write!(
                f,
                "Metadata {} is {} but the trajectory holds {}",
                field, metadata, trajectory
            ),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Json(e) => Some(e),
            OutputError::Inconsistent { .. } => None,
        }
    }
}

impl From<std::io::Error> for OutputError {
    fn from(e: std::io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        OutputError::Json(e)
    }
}

/// Serializes `output` to any writer
pub fn write_run_to<W: Write>(mut writer: W, output: &RunOutput) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(&mut writer, output)?;
    writer.flush()?;
    Ok(())
}

/// Parses a result document from any reader
///
/// The metadata must describe the trajectory it comes with: one frame per
/// completed step, each as wide as the body count.
pub fn read_run_from<R: Read>(reader: R) -> Result<RunOutput, OutputError> {
    let output: RunOutput = serde_json::from_reader(reader)?;
    check_consistent(&output)?;
    Ok(output)
}

fn check_consistent(output: &RunOutput) -> Result<(), OutputError> {
    let meta = &output.metadata;
    let trajectory = &output.trajectory;

    if meta.steps_completed != trajectory.steps_recorded() {
        return Err(OutputError::Inconsistent {
            field: "steps_completed",
            metadata: meta.steps_completed,
            trajectory: trajectory.steps_recorded(),
        });
    }
    // An empty trajectory carries no width to compare against
    if trajectory.steps_recorded() > 0 && meta.body_count != trajectory.body_count() {
        return Err(OutputError::Inconsistent {
            field: "body_count",
            metadata: meta.body_count,
            trajectory: trajectory.body_count(),
        });
    }
    Ok(())
}

/// Writes `output` to `path`, replacing any existing file
pub fn write_run(path: impl AsRef<Path>, output: &RunOutput) -> Result<(), OutputError> {
    let file = File::create(path)?;
    write_run_to(BufWriter::new(file), output)
}

pub fn read_run(path: impl AsRef<Path>) -> Result<RunOutput, OutputError> {
    let file = File::open(path)?;
    read_run_from(BufReader::new(file))
}
