//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sareport_`
//! - 컴포넌트명: `processor_`, `poller_`, `consumer_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(sareport_core::metrics::PROCESSOR_REPORTS_PROCESSED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Processor 메트릭 ──────────────────────────────────────────────

/// Processor: 처리한 리포트 수, `result` 라벨로 성공/실패 구분 (counter)
pub const PROCESSOR_REPORTS_PROCESSED_TOTAL: &str = "sareport_processor_reports_processed_total";

/// Processor: 파싱에 실패한 리포트 수, 읽기 실패는 제외 (counter)
pub const PROCESSOR_PARSE_ERRORS_TOTAL: &str = "sareport_processor_parse_errors_total";

/// Processor: 스트림 닫기 실패 수 (counter)
pub const PROCESSOR_CLOSE_ERRORS_TOTAL: &str = "sareport_processor_close_errors_total";

// ─── Poller 메트릭 ─────────────────────────────────────────────────

/// Poller: 전달된 신규 파일 수 (counter)
pub const POLLER_FILES_DISCOVERED_TOTAL: &str = "sareport_poller_files_discovered_total";

/// Poller: 직전 전달 파일과 같아 건너뛴 횟수 (counter)
pub const POLLER_DUPLICATES_SKIPPED_TOTAL: &str = "sareport_poller_duplicates_skipped_total";

// ─── Consumer 메트릭 ───────────────────────────────────────────────

/// Consumer: 결과 파일 기록 + 아카이브 이동 수 (counter, label: result)
pub const CONSUMER_ARCHIVED_TOTAL: &str = "sareport_consumer_archived_total";

// ─── Daemon 메트릭 ─────────────────────────────────────────────────

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "sareport_daemon_build_info";

/// 모든 메트릭 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다. recorder가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        PROCESSOR_REPORTS_PROCESSED_TOTAL,
        "Total number of processed reports, labelled by outcome"
    );
    describe_counter!(
        PROCESSOR_PARSE_ERRORS_TOTAL,
        "Total number of reports whose content failed to parse"
    );
    describe_counter!(
        PROCESSOR_CLOSE_ERRORS_TOTAL,
        "Total number of report streams that failed to close"
    );
    describe_counter!(
        POLLER_FILES_DISCOVERED_TOTAL,
        "Total number of report files handed off by the directory poller"
    );
    describe_counter!(
        POLLER_DUPLICATES_SKIPPED_TOTAL,
        "Total number of polls that skipped the last delivered file"
    );
    describe_counter!(
        CONSUMER_ARCHIVED_TOTAL,
        "Result writes and archive moves, labelled by outcome"
    );
    describe_gauge!(DAEMON_BUILD_INFO, "Build information (always 1)");
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        PROCESSOR_REPORTS_PROCESSED_TOTAL,
        PROCESSOR_PARSE_ERRORS_TOTAL,
        PROCESSOR_CLOSE_ERRORS_TOTAL,
        POLLER_FILES_DISCOVERED_TOTAL,
        POLLER_DUPLICATES_SKIPPED_TOTAL,
        CONSUMER_ARCHIVED_TOTAL,
        DAEMON_BUILD_INFO,
    ];

    #[test]
    fn all_metrics_start_with_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("sareport_"),
                "Metric '{}' does not start with 'sareport_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in ALL_METRIC_NAMES.iter().filter(|n| **n != DAEMON_BUILD_INFO) {
            assert!(name.ends_with("_total"), "counter '{}' lacks _total", name);
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }
}
