//! Integration tests for the `run` command.
use techdiff::cli::{RunOpts, handle_run_command};
use techdiff::settings::Settings;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the example model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("TECHDIFF_LOG_LEVEL", "off") };

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
        debug_model: true,
    };
    handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();

    for file_name in [
        "metadata.toml",
        "production_unit_results.csv",
        "energy_carrier_results.csv",
        "process_comparison.csv",
        "energy_carrier_comparison.csv",
        "site_processes.csv",
        "pipeline_modes.csv",
        "debug_unit_states.csv",
    ] {
        assert!(output_dir.join(file_name).is_file(), "Missing {file_name}");
    }

    // Running again into the same folder fails unless overwriting is allowed
    assert!(handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).is_err());
    let opts = RunOpts {
        overwrite: true,
        ..opts
    };
    handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();
}
