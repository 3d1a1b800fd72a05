//! Integration tests for metrics server functionality.
//!
//! A global recorder can be installed only once per process, so only the
//! first successful install is asserted; the rest cover rejected configs.

use sareport_core::config::MetricsConfig;
use sareport_daemon::metrics_server;
use serial_test::serial;

#[test]
#[serial]
fn test_install_metrics_recorder_succeeds_with_valid_config() {
    // Given: A valid metrics configuration
    let config = MetricsConfig {
        enabled: true,
        listen_addr: "127.0.0.1".to_string(),
        port: 19180, // Non-standard port to avoid conflicts
        endpoint: "/metrics".to_string(),
    };

    // When: Installing the metrics recorder
    let result = metrics_server::install_metrics_recorder(&config);

    // Then: Should succeed
    assert!(
        result.is_ok(),
        "install_metrics_recorder should succeed with valid config: {:?}",
        result.err()
    );
}

#[test]
#[serial]
fn test_install_metrics_recorder_fails_with_invalid_address() {
    // Given: An invalid listen address
    let config = MetricsConfig {
        enabled: true,
        listen_addr: "999.999.999.999".to_string(),
        port: 9100,
        endpoint: "/metrics".to_string(),
    };

    // When: Installing the metrics recorder
    let result = metrics_server::install_metrics_recorder(&config);

    // Then: Should fail before touching the global recorder
    let err = result.expect_err("invalid address should be rejected");
    assert!(err.to_string().contains("invalid metrics listen address"));
}

#[test]
#[serial]
fn test_install_metrics_recorder_rejects_unsupported_endpoint() {
    let config = MetricsConfig {
        enabled: true,
        listen_addr: "127.0.0.1".to_string(),
        port: 19181,
        endpoint: "/custom".to_string(),
    };

    let result = metrics_server::install_metrics_recorder(&config);

    let err = result.expect_err("custom endpoint should be rejected");
    assert!(err.to_string().contains("unsupported metrics endpoint"));
}
