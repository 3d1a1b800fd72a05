//! Fault isolation: item-scoped failures never stop the pipeline.

use std::time::Duration;

use crate::helpers::assertions::{DEFAULT_TIMEOUT, SHORT_TIMEOUT, assert_file_within};
use crate::helpers::reports::{HAM_REPORT, MALFORMED_REPORT, SPAM_REPORT};
use crate::helpers::workspace::TestWorkspace;

#[tokio::test]
async fn test_e2e_bad_report_does_not_block_good_ones() {
    // Given: a malformed report sorted before two good ones
    let ws = TestWorkspace::new().receive_errors(true);
    ws.write_report("a_bad.txt", MALFORMED_REPORT);
    ws.write_report("b_good.txt", SPAM_REPORT);
    ws.write_report("c_good.txt", HAM_REPORT);

    let (token, handle) = ws.start();

    // Then: both good reports are archived
    assert_file_within(&ws.archive("b_good.txt"), DEFAULT_TIMEOUT).await;
    assert_file_within(&ws.archive("c_good.txt"), DEFAULT_TIMEOUT).await;
    assert!(ws.input("a_bad.txt").exists());
    assert!(!ws.result("a_bad.json").exists());

    token.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_e2e_errors_logged_when_error_channel_disabled() {
    // Given: errors are only logged by the processor
    let ws = TestWorkspace::new().receive_errors(false);
    ws.write_report("a_bad.txt", MALFORMED_REPORT);
    ws.write_report("b_good.txt", SPAM_REPORT);

    let (token, handle) = ws.start();
    assert_file_within(&ws.archive("b_good.txt"), DEFAULT_TIMEOUT).await;

    token.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_e2e_lost_input_dir_stops_daemon_with_error() {
    // Given: a running daemon that already archived one report
    let ws = TestWorkspace::new();
    ws.write_report("first.txt", SPAM_REPORT);
    let (_token, handle) = ws.start();
    assert_file_within(&ws.archive("first.txt"), DEFAULT_TIMEOUT).await;

    // When: the input directory disappears
    std::fs::remove_dir_all(ws.input("")).unwrap();

    // Then: run returns the listing error after draining
    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("daemon should stop on listing failure")
        .expect("orchestrator should not panic");
    let err = result.expect_err("listing failure should surface");
    assert!(err.to_string().contains("directory poller failed"));

    // Already archived work is untouched
    assert!(ws.archive("first.txt").exists());
    assert!(ws.result("first.json").exists());
}

#[tokio::test]
async fn test_e2e_report_removed_before_open_is_skipped() {
    // Given: a file that vanishes right away, plus a good one
    let ws = TestWorkspace::new();
    ws.write_report("good.txt", SPAM_REPORT);
    let (token, handle) = ws.start();
    assert_file_within(&ws.archive("good.txt"), DEFAULT_TIMEOUT).await;

    ws.write_report("gone.txt", SPAM_REPORT);
    std::fs::remove_file(ws.input("gone.txt")).unwrap();
    tokio::time::sleep(SHORT_TIMEOUT).await;

    // Then: daemon still runs and processes new work
    ws.write_report("next.txt", HAM_REPORT);
    assert_file_within(&ws.archive("next.txt"), DEFAULT_TIMEOUT).await;
    assert!(!handle.is_finished());

    token.cancel();
    handle.await.unwrap().unwrap();
}
