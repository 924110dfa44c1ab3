//! Persistence and argument handling for the command-line tools.

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use starsim::{ModelKind, RunOutput, Simulation, SimulationConfig};
use starsim_cli::cli::{DEFAULT_OUTPUT, load_scenario};
use starsim_cli::{CalcArgs, OutputError, ViewArgs, read_run, read_run_from, write_run, write_run_to};

fn small_run(model: ModelKind) -> RunOutput {
    let config = SimulationConfig {
        cluster_radius: 3,
        step_count: 12,
        model,
        canvas_width: 320,
        canvas_height: 240,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::from_config(config).unwrap();
    sim.run().unwrap();
    sim.into_output()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("starsim-{}-{}", std::process::id(), name))
}

#[test]
fn json_roundtrip_in_memory() {
    for model in [ModelKind::Exact, ModelKind::BarnesHut] {
        let output = small_run(model);

        let mut buffer = Vec::new();
        write_run_to(&mut buffer, &output).unwrap();
        let back = read_run_from(buffer.as_slice()).unwrap();

        assert_eq!(back, output);
        assert!(back.trajectory.is_complete());
    }
}

#[test]
fn json_roundtrip_through_file() {
    let output = small_run(ModelKind::BarnesHut);
    let path = temp_path("roundtrip.json");

    write_run(&path, &output).unwrap();
    let back = read_run(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(back.metadata, output.metadata);
    assert_eq!(back.trajectory, output.trajectory);
}

#[test]
fn json_layout_is_metadata_plus_nested_frames() {
    let output = small_run(ModelKind::Exact);
    let mut buffer = Vec::new();
    write_run_to(&mut buffer, &output).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
    assert_eq!(value["metadata"]["width"], 320);
    assert_eq!(value["metadata"]["model"], "Exact");
    assert_eq!(value["metadata"]["body_count"], 28);

    let frames = value["trajectory"].as_array().unwrap();
    assert_eq!(frames.len(), 12);
    assert_eq!(frames[0].as_array().unwrap().len(), 28);
    assert_eq!(frames[0][0].as_array().unwrap().len(), 2);
}

#[test]
fn extreme_pixels_survive_roundtrip() {
    let mut output = small_run(ModelKind::Exact);
    output.trajectory = starsim::TrajectoryRecord::try_from(vec![
        vec![[0u16, 65535], [65535, 0]],
        vec![[1, 1], [65534, 65534]],
    ])
    .unwrap();
    output.metadata.body_count = 2;
    output.metadata.steps_completed = 2;

    let mut buffer = Vec::new();
    write_run_to(&mut buffer, &output).unwrap();
    let back = read_run_from(buffer.as_slice()).unwrap();

    assert_eq!(back.trajectory, output.trajectory);
}

#[test]
fn full_precision_theta_survives_roundtrip() {
    let config = SimulationConfig {
        cluster_radius: 2,
        step_count: 3,
        model: ModelKind::BarnesHut,
        theta: 0.10037037036737037,
        canvas_width: 100,
        canvas_height: 100,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::from_config(config).unwrap();
    sim.run().unwrap();
    let output = sim.into_output();

    let mut buffer = Vec::new();
    write_run_to(&mut buffer, &output).unwrap();
    let back = read_run_from(buffer.as_slice()).unwrap();

    assert_eq!(back.metadata.theta.to_bits(), output.metadata.theta.to_bits());
    assert_eq!(back, output);
}

#[test]
fn metadata_must_match_trajectory() {
    let output = small_run(ModelKind::Exact);

    let mut wrong_width = output.clone();
    wrong_width.metadata.body_count = 27;
    let mut buffer = Vec::new();
    write_run_to(&mut buffer, &wrong_width).unwrap();
    assert!(matches!(
        read_run_from(buffer.as_slice()),
        Err(OutputError::Inconsistent {
            field: "body_count",
            metadata: 27,
            trajectory: 28,
        })
    ));

    let mut wrong_length = output;
    wrong_length.metadata.steps_completed = 11;
    let mut buffer = Vec::new();
    write_run_to(&mut buffer, &wrong_length).unwrap();
    assert!(matches!(
        read_run_from(buffer.as_slice()),
        Err(OutputError::Inconsistent {
            field: "steps_completed",
            metadata: 11,
            trajectory: 12,
        })
    ));
}

#[test]
fn missing_file_is_io_error() {
    let result = read_run(temp_path("does-not-exist.json"));
    assert!(matches!(result, Err(OutputError::Io(_))));
}

#[test]
fn malformed_document_is_json_error() {
    let result = read_run_from("{\"metadata\": 3}".as_bytes());
    assert!(matches!(result, Err(OutputError::Json(_))));

    let ragged = r#"{"metadata": null, "trajectory": [[[1, 2]], []]}"#;
    assert!(matches!(
        read_run_from(ragged.as_bytes()),
        Err(OutputError::Json(_))
    ));
}

#[test]
fn calc_args_defaults() {
    let args = CalcArgs::try_parse_from(["star-calc"]).unwrap();

    assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT));
    assert!(!args.check);
    assert_eq!(args.resolve_config().unwrap(), SimulationConfig::default());
}

#[test]
fn calc_args_override_defaults() {
    let args = CalcArgs::try_parse_from([
        "star-calc",
        "--radius",
        "5",
        "--steps",
        "40",
        "--model",
        "BarnesHut",
        "--theta",
        "0.3",
        "--width",
        "800",
        "--height",
        "600",
        "--dt",
        "0.5",
        "--check",
    ])
    .unwrap();
    let config = args.resolve_config().unwrap();

    assert_eq!(config.cluster_radius, 5);
    assert_eq!(config.step_count, 40);
    assert_eq!(config.model, ModelKind::BarnesHut);
    assert_eq!(config.theta, 0.3);
    assert_eq!((config.canvas_width, config.canvas_height), (800, 600));
    assert_eq!(config.time_step, 0.5);
    assert!(args.check);
}

#[test]
fn calc_args_reject_unknown_model() {
    assert!(CalcArgs::try_parse_from(["star-calc", "--model", "Leapfrog"]).is_err());
}

#[test]
fn flags_override_scenario_file() {
    let path = temp_path("scenario.yaml");
    fs::write(&path, "cluster_radius: 4\nstep_count: 25\nmodel: BarnesHut\n").unwrap();

    let scenario = load_scenario(&path).unwrap();
    assert_eq!(scenario.cluster_radius, 4);
    assert_eq!(scenario.canvas_width, 1920);

    let args = CalcArgs::try_parse_from([
        "star-calc",
        "--config",
        path.to_str().unwrap(),
        "--steps",
        "7",
    ])
    .unwrap();
    let config = args.resolve_config().unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(config.cluster_radius, 4);
    assert_eq!(config.model, ModelKind::BarnesHut);
    assert_eq!(config.step_count, 7);
}

#[test]
fn view_args() {
    let args = ViewArgs::try_parse_from(["star-view", "--step", "3", "--every", "2"]).unwrap();
    assert_eq!(args.file, PathBuf::from(DEFAULT_OUTPUT));
    assert_eq!((args.step, args.every), (3, 2));

    assert!(ViewArgs::try_parse_from(["star-view", "--every", "0"]).is_err());
}
