//! 리포트 파이프라인 에러 타입
//!
//! [`ReportPipelineError`]는 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<ReportPipelineError> for SaReportError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! [`ProcessingError`]는 리포트 한 건의 실패를 test ID와 함께 담는 값으로,
//! Processor의 에러 채널로 전달됩니다.

use std::fmt;
use std::path::PathBuf;

use sareport_core::error::{ConfigError, ParseError, PipelineError, SaReportError};

/// 리포트 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ReportPipelineError {
    /// 처리 루프가 이미 실행 중이거나 실행을 마침
    #[error("processor loop already started")]
    AlreadyRunning,

    /// 디렉토리 목록 조회 실패
    #[error("failed to list directory {}: {source}", path.display())]
    Directory {
        /// 대상 디렉토리
        path: PathBuf,
        /// 원인
        source: std::io::Error,
    },

    /// 결과 기록 또는 아카이브 이동 실패
    #[error("{op} failed for {}: {source}", path.display())]
    Archive {
        /// 수행하던 작업 (create dir, write result, copy, remove source 등)
        op: &'static str,
        /// 대상 경로
        path: PathBuf,
        /// 원인
        source: std::io::Error,
    },

    /// 리포트 JSON 직렬화 실패
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<ReportPipelineError> for SaReportError {
    fn from(err: ReportPipelineError) -> Self {
        match err {
            ReportPipelineError::AlreadyRunning => {
                SaReportError::Pipeline(PipelineError::AlreadyRunning)
            }
            ReportPipelineError::Config { field, reason } => {
                SaReportError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => SaReportError::Pipeline(PipelineError::Failed(other.to_string())),
        }
    }
}

/// 리포트 한 건의 처리 실패 원인
#[derive(Debug)]
pub enum ProcessingErrorKind {
    /// 파서가 리포트를 거부함
    Parse(ParseError),
    /// 리포트 스트림 읽기 실패
    Read(std::io::Error),
}

impl fmt::Display for ProcessingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse failed: {}", e),
            Self::Read(e) => write!(f, "read failed: {}", e),
        }
    }
}

/// 리포트 처리 에러 -- 실패 원인과 해당 test ID
///
/// test ID로 실패를 원본 파일에 다시 연결할 수 있습니다.
#[derive(Debug, thiserror::Error)]
#[error("test_id[{test_id}]: {kind}")]
pub struct ProcessingError {
    /// 실패한 리포트의 test ID
    pub test_id: String,
    /// 실패 원인
    pub kind: ProcessingErrorKind,
}

impl ProcessingError {
    /// 파싱 실패를 test ID로 감쌉니다.
    pub fn parse(test_id: impl Into<String>, err: ParseError) -> Self {
        Self {
            test_id: test_id.into(),
            kind: ProcessingErrorKind::Parse(err),
        }
    }

    /// 읽기 실패를 test ID로 감쌉니다.
    pub fn read(test_id: impl Into<String>, err: std::io::Error) -> Self {
        Self {
            test_id: test_id.into(),
            kind: ProcessingErrorKind::Read(err),
        }
    }

    /// 파싱 실패이면 원인 에러를 반환합니다.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match &self.kind {
            ProcessingErrorKind::Parse(e) => Some(e),
            ProcessingErrorKind::Read(_) => None,
        }
    }
}
