//! Signal-driven shutdown of the pipeline tasks.

use std::time::Duration;

use sareport_daemon::orchestrator::Orchestrator;
use tokio_util::sync::CancellationToken;

use crate::helpers::assertions::{DEFAULT_TIMEOUT, assert_file_within};
use crate::helpers::reports::SPAM_REPORT;
use crate::helpers::workspace::{TEST_POLL_INTERVAL, TestWorkspace, cancelled};

#[tokio::test]
async fn test_e2e_idle_daemon_stops_promptly() {
    // Given: a running daemon with nothing to do
    let ws = TestWorkspace::new();
    let (token, handle) = ws.start();
    tokio::time::sleep(TEST_POLL_INTERVAL * 3).await;

    // When: shutdown is requested
    token.cancel();

    // Then: run returns Ok within the timeout
    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("shutdown should not hang")
        .expect("orchestrator should not panic");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_e2e_shutdown_before_first_tick() {
    // Given: a shutdown that is already requested
    let ws = TestWorkspace::new();
    ws.write_report("late.txt", SPAM_REPORT);
    let orchestrator = Orchestrator::build_from_config(ws.config.clone())
        .expect("orchestrator should build")
        .with_poll_interval(Duration::from_secs(60));
    let token = CancellationToken::new();
    token.cancel();

    // When: running
    let result = tokio::time::timeout(
        Duration::from_secs(2),
        orchestrator.run_until(cancelled(token)),
    )
    .await
    .expect("shutdown should not hang");

    // Then: nothing processed
    assert!(result.is_ok());
    assert!(ws.input("late.txt").exists());
}

#[tokio::test]
async fn test_e2e_shutdown_with_unread_results() {
    // Given: a report already processed once, and a second one in flight
    let ws = TestWorkspace::new();
    ws.write_report("a.txt", SPAM_REPORT);
    let (token, handle) = ws.start();
    assert_file_within(&ws.archive("a.txt"), DEFAULT_TIMEOUT).await;
    ws.write_report("b.txt", SPAM_REPORT);

    // When: shutdown immediately
    token.cancel();

    // Then: every task stops; b.txt is either fully archived or untouched
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("shutdown should not hang")
        .unwrap()
        .unwrap();
    assert!(ws.input("b.txt").exists() != ws.archive("b.txt").exists());
}

#[tokio::test]
async fn test_e2e_failed_signal_future_still_stops_pipeline() {
    let ws = TestWorkspace::new();
    let orchestrator = Orchestrator::build_from_config(ws.config.clone())
        .expect("orchestrator should build")
        .with_poll_interval(TEST_POLL_INTERVAL);

    let result = tokio::time::timeout(
        Duration::from_secs(2),
        orchestrator.run_until(async { Err(anyhow::anyhow!("no signal handler")) }),
    )
    .await
    .expect("pipeline should stop");

    let err = result.expect_err("signal error should propagate");
    assert!(err.to_string().contains("no signal handler"));
}
