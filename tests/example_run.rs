//! Integration tests for the `example run` command.
use techdiff::cli::example::handle_example_run_command;
use techdiff::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("TECHDIFF_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("simple");
    handle_example_run_command(
        "simple",
        Some(&output_dir),
        false,
        false,
        Some(Settings::default()),
    )
    .unwrap();
    assert!(output_dir.join("production_unit_results.csv").is_file());
    assert!(!output_dir.join("debug_unit_states.csv").exists());
}
