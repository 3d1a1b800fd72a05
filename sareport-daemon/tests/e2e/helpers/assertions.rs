//! File assertion helpers for E2E tests.
//!
//! Provides timeout-based assertions for files appearing on disk.

use std::path::Path;
use std::time::Duration;

/// Default timeout for file assertions.
#[allow(dead_code)]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Short timeout for asserting that nothing happens.
#[allow(dead_code)]
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(200);

/// Assert that `path` exists within the given timeout.
///
/// # Panics
///
/// Panics if the timeout expires before the file appears.
#[allow(dead_code)]
pub async fn assert_file_within(path: &Path, timeout: Duration) {
    let appeared = tokio::time::timeout(timeout, async {
        while !path.exists() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    if appeared.is_err() {
        panic!("timed out after {:?} waiting for {}", timeout, path.display());
    }
}

/// Assert that `path` does not appear within the given timeout.
///
/// # Panics
///
/// Panics if the file exists at any point before the timeout expires.
#[allow(dead_code)]
pub async fn assert_no_file_within(path: &Path, timeout: Duration) {
    let appeared = tokio::time::timeout(timeout, async {
        while !path.exists() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    if appeared.is_ok() {
        panic!("expected {} not to exist", path.display());
    }
}

/// Read a result file as JSON.
///
/// # Panics
///
/// Panics if the file is missing or not valid JSON.
#[allow(dead_code)]
pub fn read_json(path: &Path) -> serde_json::Value {
    let raw = std::fs::read(path).expect("result file should be readable");
    serde_json::from_slice(&raw).expect("result file should be valid JSON")
}
