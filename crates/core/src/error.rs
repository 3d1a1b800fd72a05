//! 에러 타입 -- 도메인별 에러 정의

/// sareport 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SaReportError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 리포트 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 리포트 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 처리 루프가 이미 실행 중이거나 실행을 마침
    #[error("processor already running")]
    AlreadyRunning,

    /// 디렉토리 조회, 결과 기록, 아카이브 이동 등 파이프라인 작업 실패
    #[error("pipeline failed: {0}")]
    Failed(String),
}

/// 리포트 파싱 에러
///
/// 파서 구현체가 반환하는 에러입니다. 파이프라인은 이 에러를 test ID와 함께
/// 감싸서 전달하므로 에러 자체에는 입력 식별 정보를 담지 않습니다.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// 빈 입력 (공백만 있는 경우 포함)
    #[error("empty report")]
    Empty,

    /// UTF-8이 아닌 입력
    #[error("report is not valid utf-8: {0}")]
    InvalidUtf8(String),

    /// 인식할 수 있는 리포트 형식이 없음
    #[error("unsupported report format: {0}")]
    UnsupportedFormat(String),

    /// 점수 필드가 숫자가 아님
    #[error("invalid score '{value}' at line {line}")]
    InvalidScore { line: usize, value: String },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}
