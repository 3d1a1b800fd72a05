//! Invalid configuration -> rejected before the pipeline starts.
//!
//! Validates that bad configuration produces errors naming the problematic field.

use sareport_core::config::SaReportConfig;
use sareport_core::error::{ConfigError, SaReportError};
use sareport_daemon::orchestrator::Orchestrator;

use crate::helpers::workspace::TestWorkspace;

#[tokio::test]
async fn test_e2e_invalid_toml_syntax() {
    let result = SaReportConfig::parse("invalid = [[[toml");
    assert!(matches!(
        result,
        Err(SaReportError::Config(ConfigError::ParseFailed { .. }))
    ));
}

#[tokio::test]
async fn test_e2e_nonexistent_config_path() {
    let result = Orchestrator::build(std::path::Path::new("/nonexistent/sareport.toml")).await;
    let err = result.err().expect("missing file should fail");
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_e2e_empty_extensions_rejected() {
    let mut ws = TestWorkspace::new();
    ws.config.pipeline.extensions.clear();

    let err = Orchestrator::build_from_config(ws.config.clone())
        .err()
        .expect("empty extensions should fail");
    assert!(err.to_string().contains("extensions"));
}

#[tokio::test]
async fn test_e2e_result_dir_equal_to_input_rejected() {
    let mut ws = TestWorkspace::new();
    ws.config.pipeline.result_dir = ws.config.pipeline.input_dir.clone();

    let err = Orchestrator::build_from_config(ws.config.clone())
        .err()
        .expect("result_dir == input_dir should fail");
    assert!(err.to_string().contains("result_dir"));
}

#[tokio::test]
async fn test_e2e_invalid_log_level_rejected() {
    let mut ws = TestWorkspace::new();
    ws.config.general.log_level = "verbose".to_owned();

    let err = Orchestrator::build_from_config(ws.config.clone())
        .err()
        .expect("unknown log level should fail");
    assert!(err.to_string().contains("log_level"));
}

#[tokio::test]
async fn test_e2e_config_file_round_trip() {
    // Given: a config file written to the workspace
    let ws = TestWorkspace::new();
    let path = ws.root().join("sareport.toml");
    let toml = format!(
        "[pipeline]\ninput_dir = {:?}\nresult_dir = {:?}\narchive_dir = {:?}\nreceive_errors = true\n",
        ws.config.pipeline.input_dir, ws.config.pipeline.result_dir, ws.config.pipeline.archive_dir
    );
    std::fs::write(&path, toml).unwrap();

    // When: building from the file
    let orchestrator = Orchestrator::build(&path).await.expect("config should load");

    // Then: file values are applied, others default
    assert!(orchestrator.config().pipeline.receive_errors);
    assert_eq!(orchestrator.config().pipeline.extensions, vec!["txt".to_owned()]);
}
