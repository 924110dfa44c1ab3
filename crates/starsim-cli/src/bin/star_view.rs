use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use starsim_cli::{ViewArgs, read_run};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ViewArgs::parse();
    let run = read_run(&args.file)
        .with_context(|| format!("unable to read {}", args.file.display()))?;
    let meta = &run.metadata;

    info!("viewing {}", args.file.display());
    if meta.steps_completed < meta.step_count {
        warn!(
            "run stopped early: {} of {} steps",
            meta.steps_completed, meta.step_count
        );
    }

    let mut view = run.trajectory.view();
    if !view.seek(args.step) {
        bail!(
            "step {} is past the {} recorded steps",
            args.step,
            run.trajectory.steps_recorded()
        );
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    writeln!(
        out,
        "Stars={} Model={} Grid={}x{} Steps={} Time={:.3}s Warnings={}",
        meta.body_count,
        meta.model,
        meta.width,
        meta.height,
        meta.step_count,
        meta.elapsed.as_secs_f64(),
        meta.warnings.len()
    )?;

    let every = args.every as usize;
    while let Some((step, frame)) = view.next_frame() {
        if (step - args.step) % every != 0 {
            continue;
        }
        let pixels: Vec<String> = frame.iter().map(|p| format!("{},{}", p.x, p.y)).collect();
        writeln!(out, "{:>6}: {}", step, pixels.join(" "))?;
    }

    out.flush()?;
    Ok(())
}
