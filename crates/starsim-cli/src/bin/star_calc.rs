use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use starsim::Simulation;
use starsim_cli::{CalcArgs, read_run, write_run};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CalcArgs::parse();
    let config = args.resolve_config()?;

    let mut sim = Simulation::from_config(config).context("invalid simulation parameters")?;
    sim.run().context("simulation aborted")?;

    info!("simulation complete, storing to {}", args.output.display());
    let output = sim.into_output();
    write_run(&args.output, &output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    if args.check {
        let stored = read_run(&args.output)
            .with_context(|| format!("failed to read back {}", args.output.display()))?;
        if stored != output {
            bail!("{} does not match the run that wrote it", args.output.display());
        }
        info!(
            "read back {} steps x {} bodies",
            stored.trajectory.steps_recorded(),
            stored.trajectory.body_count()
        );
    }

    Ok(())
}
