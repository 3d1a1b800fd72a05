//! 설정 관리 -- sareport.toml 파싱 및 런타임 설정
//!
//! [`SaReportConfig`]는 모든 컴포넌트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SAREPORT_PIPELINE_INPUT_DIR=/data/in` 형식)
//! 3. 설정 파일 (`sareport.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sareport_core::error::SaReportError> {
//! use sareport_core::config::SaReportConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SaReportConfig::load("sareport.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SaReportConfig::parse("[pipeline]\ninput_dir = \"/data/in\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SaReportError};

/// sareport 통합 설정
///
/// `sareport.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaReportConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 리포트 파이프라인 설정
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl SaReportConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SaReportError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값 + 환경변수 오버라이드로 설정을 만듭니다.
    pub fn from_env() -> Result<Self, SaReportError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SaReportError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SaReportError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SaReportError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SaReportError> {
        toml::from_str(toml_str).map_err(|e| {
            SaReportError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SAREPORT_{SECTION}_{FIELD}`
    /// 예: `SAREPORT_PIPELINE_RECEIVE_ERRORS=true`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SAREPORT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SAREPORT_GENERAL_LOG_FORMAT");

        // Pipeline
        override_string(&mut self.pipeline.input_dir, "SAREPORT_PIPELINE_INPUT_DIR");
        override_string(&mut self.pipeline.result_dir, "SAREPORT_PIPELINE_RESULT_DIR");
        override_string(
            &mut self.pipeline.archive_dir,
            "SAREPORT_PIPELINE_ARCHIVE_DIR",
        );
        override_csv(&mut self.pipeline.extensions, "SAREPORT_PIPELINE_EXTENSIONS");
        override_usize(
            &mut self.pipeline.buffer_size,
            "SAREPORT_PIPELINE_BUFFER_SIZE",
        );
        override_bool(
            &mut self.pipeline.receive_results,
            "SAREPORT_PIPELINE_RECEIVE_RESULTS",
        );
        override_bool(
            &mut self.pipeline.receive_errors,
            "SAREPORT_PIPELINE_RECEIVE_ERRORS",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "SAREPORT_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "SAREPORT_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "SAREPORT_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SaReportError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        let dirs = [
            ("pipeline.input_dir", &self.pipeline.input_dir),
            ("pipeline.result_dir", &self.pipeline.result_dir),
            ("pipeline.archive_dir", &self.pipeline.archive_dir),
        ];
        for (field, dir) in dirs {
            if dir.trim().is_empty() {
                return Err(invalid(field, "directory must not be empty".to_owned()));
            }
        }

        // 결과/아카이브 파일이 감시 디렉토리에 다시 나타나면 재처리됨
        if Path::new(&self.pipeline.result_dir) == Path::new(&self.pipeline.input_dir) {
            return Err(invalid(
                "pipeline.result_dir",
                "must differ from pipeline.input_dir".to_owned(),
            ));
        }
        if Path::new(&self.pipeline.archive_dir) == Path::new(&self.pipeline.input_dir) {
            return Err(invalid(
                "pipeline.archive_dir",
                "must differ from pipeline.input_dir".to_owned(),
            ));
        }

        if self.pipeline.extensions.is_empty() {
            return Err(invalid(
                "pipeline.extensions",
                "at least one extension is required".to_owned(),
            ));
        }
        for ext in &self.pipeline.extensions {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(invalid(
                    "pipeline.extensions",
                    format!("'{}' must be non-empty and given without the leading dot", ext),
                ));
            }
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid(
                "metrics.port",
                "must be non-zero when metrics are enabled".to_owned(),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> SaReportError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 리포트 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 감시할 입력 디렉토리
    pub input_dir: String,
    /// 결과 JSON을 기록할 디렉토리
    pub result_dir: String,
    /// 처리 완료된 입력 파일을 옮길 디렉토리
    pub archive_dir: String,
    /// 처리 대상 확장자 (점 없이, 대소문자 구분)
    pub extensions: Vec<String>,
    /// Processor 채널 버퍼 크기 (0 = 동기 전달)
    pub buffer_size: usize,
    /// 결과 채널 활성화 여부
    pub receive_results: bool,
    /// 에러 채널 활성화 여부 (false면 파싱 에러는 로그로만 남음)
    pub receive_errors: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: "input".to_owned(),
            result_dir: "result".to_owned(),
            archive_dir: "archive".to_owned(),
            extensions: vec!["txt".to_owned()],
            buffer_size: 0,
            receive_results: true,
            receive_errors: false,
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 바인드 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
