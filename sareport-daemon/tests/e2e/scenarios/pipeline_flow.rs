//! Report flow: input file -> result JSON + archived source.

use crate::helpers::assertions::{
    DEFAULT_TIMEOUT, SHORT_TIMEOUT, assert_file_within, assert_no_file_within, read_json,
};
use crate::helpers::reports::{HAM_REPORT, MALFORMED_REPORT, SPAM_REPORT};
use crate::helpers::workspace::TestWorkspace;

#[tokio::test]
async fn test_e2e_report_is_written_and_archived() {
    // Given: one well-formed report in the input directory
    let ws = TestWorkspace::new();
    ws.write_report("report1.txt", SPAM_REPORT);

    // When: the daemon runs
    let (token, handle) = ws.start();
    assert_file_within(&ws.archive("report1.txt"), DEFAULT_TIMEOUT).await;

    // Then: result written, source moved
    let result = read_json(&ws.result("report1.json"));
    assert_eq!(result["spamAssassin"]["score"], 6.4);
    assert_eq!(result["spamAssassin"]["headers"][1]["tag"], "BAYES_99");
    assert_eq!(
        result["spamAssassin"]["headers"][1]["description"],
        "BODY: Bayes spam probability is 99 to 100% [score: 1.0000]"
    );
    assert!(!ws.input("report1.txt").exists());

    token.cancel();
    handle
        .await
        .expect("orchestrator should not panic")
        .expect("shutdown should succeed");
}

#[tokio::test]
async fn test_e2e_result_file_is_tab_indented() {
    let ws = TestWorkspace::new();
    ws.write_report("tabs.txt", HAM_REPORT);

    let (token, handle) = ws.start();
    assert_file_within(&ws.archive("tabs.txt"), DEFAULT_TIMEOUT).await;

    let raw = std::fs::read_to_string(ws.result("tabs.json")).expect("result should exist");
    assert!(raw.starts_with("{\n\t\"spamAssassin\": {\n\t\t\"score\": 0.9"));

    token.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_e2e_multiple_reports_all_processed() {
    // Given: several reports, processed one per tick
    let ws = TestWorkspace::new().buffer_size(2);
    for i in 0..4 {
        ws.write_report(&format!("r{}.txt", i), SPAM_REPORT);
    }

    let (token, handle) = ws.start();
    for i in 0..4 {
        assert_file_within(&ws.archive(&format!("r{}.txt", i)), DEFAULT_TIMEOUT).await;
        assert!(ws.result(&format!("r{}.json", i)).exists());
    }

    token.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_e2e_other_extensions_are_ignored() {
    let ws = TestWorkspace::new();
    ws.write_report("notes.md", SPAM_REPORT);
    ws.write_report("upper.TXT", SPAM_REPORT);

    let (token, handle) = ws.start();
    assert_no_file_within(&ws.archive("notes.md"), SHORT_TIMEOUT).await;
    assert!(ws.input("notes.md").exists());
    assert!(ws.input("upper.TXT").exists());

    token.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_e2e_malformed_report_is_not_archived() {
    // Given: a report the parser rejects, errors delivered to the consumer
    let ws = TestWorkspace::new().receive_errors(true);
    ws.write_report("bad.txt", MALFORMED_REPORT);

    let (token, handle) = ws.start();

    // Then: no result, no move
    assert_no_file_within(&ws.result("bad.json"), SHORT_TIMEOUT).await;
    assert!(!ws.archive("bad.txt").exists());
    assert!(ws.input("bad.txt").exists());

    token.cancel();
    handle.await.unwrap().unwrap();
}
