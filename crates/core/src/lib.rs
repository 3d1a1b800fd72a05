//! sareport 공통 크레이트
//!
//! 파이프라인, 데몬, CLI가 함께 사용하는 타입을 정의합니다.
//!
//! - [`config`]: `sareport.toml` 설정과 환경변수 오버라이드
//! - [`error`]: 도메인 에러 타입
//! - [`metrics`]: 메트릭 이름 상수
//! - [`pipeline`]: 파서 확장 trait
//! - [`types`]: 파싱된 리포트 모델

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, ParseError, PipelineError, SaReportError};

// 설정
pub use config::SaReportConfig;

// 파이프라인 trait
pub use pipeline::ReportParser;

// 도메인 타입
pub use types::{Header, Report, SpamAssassin};
