//! Command-line arguments for `star-calc` and `star-view`.
//!
//! `star-calc` builds its [`SimulationConfig`] in three layers: built-in
//! defaults, then an optional YAML scenario file, then any flags given
//! explicitly on the command line.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use starsim::{ModelKind, SimulationConfig};

pub const DEFAULT_OUTPUT: &str = "/tmp/output";

/// Run a gravitational cluster simulation and save the trajectory
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CalcArgs {
    /// Cluster radius in lattice units (body count grows with its square)
    #[arg(short, long)]
    pub radius: Option<u32>,

    /// Number of steps to simulate
    #[arg(short, long)]
    pub steps: Option<usize>,

    /// Force model: Exact or BarnesHut
    #[arg(short, long, value_parser = parse_model)]
    pub model: Option<ModelKind>,

    /// Barnes-Hut opening angle
    #[arg(long)]
    pub theta: Option<f64>,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Time step
    #[arg(long)]
    pub dt: Option<f64>,

    /// Where to write the result file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// YAML scenario file; explicit flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Read the result file back and verify it after writing
    #[arg(long, default_value_t = false)]
    pub check: bool,
}

fn parse_model(s: &str) -> Result<ModelKind, String> {
    s.parse::<ModelKind>().map_err(|e| e.to_string())
}

impl CalcArgs {
    /// Resolves the run configuration: defaults, then the scenario file,
    /// then explicit flags
    pub fn resolve_config(&self) -> Result<SimulationConfig> {
        let base = match &self.config {
            Some(path) => load_scenario(path)?,
            None => SimulationConfig::default(),
        };
        Ok(self.apply_overrides(base))
    }

    /// Overwrites every field of `config` that was given as a flag
    pub fn apply_overrides(&self, mut config: SimulationConfig) -> SimulationConfig {
        if let Some(radius) = self.radius {
            config.cluster_radius = radius;
        }
        if let Some(steps) = self.steps {
            config.step_count = steps;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(theta) = self.theta {
            config.theta = theta;
        }
        if let Some(width) = self.width {
            config.canvas_width = width;
        }
        if let Some(height) = self.height {
            config.canvas_height = height;
        }
        if let Some(dt) = self.dt {
            config.time_step = dt;
        }
        config
    }
}

/// Loads a scenario file; fields it leaves out keep their defaults
pub fn load_scenario(path: &Path) -> Result<SimulationConfig> {
    let file = File::open(path)
        .with_context(|| format!("failed to open scenario {}", path.display()))?;
    let config: SimulationConfig = serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse scenario {}", path.display()))?;
    Ok(config)
}

/// Play back a saved run as text
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ViewArgs {
    /// Result file written by star-calc
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub file: PathBuf,

    /// First step to show
    #[arg(short, long, default_value_t = 0)]
    pub step: usize,

    /// Show every k-th step
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub every: u32,
}
