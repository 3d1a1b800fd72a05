//! 디렉토리 폴러
//!
//! 감시 디렉토리를 고정 주기로 나열하고, 허용된 확장자를 가진 새 파일 하나를
//! 틱마다 핸드오프 채널로 전달합니다.
//!
//! # 틱 알고리즘
//! 1. 디렉토리를 비재귀적으로 나열하고 하위 디렉토리는 건너뜀
//! 2. 파일 이름 사전순으로 확장자(대소문자 구분, 점 제외)를 검사
//! 3. 직전에 전달한 이름과 같으면 경고 후 건너뜀 (이름 기반, 직전 1건만 비교)
//! 4. 조건을 만족하는 첫 파일을 전달(블로킹)하고 "직전 전달"로 기록한 뒤 틱 종료
//! 5. 나열에 실패하면 폴링 루프를 종료 (재시도 없음)

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use metrics::counter;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use sareport_core::config::PipelineConfig as CorePipelineConfig;
use sareport_core::metrics as m;

use crate::channel::HandoffSender;
use crate::error::ReportPipelineError;

/// 기본 폴링 주기
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// 디렉토리 폴러 설정
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// 감시 디렉토리
    pub dir: PathBuf,
    /// 허용 확장자 (점 제외, 대소문자 구분)
    pub extensions: HashSet<String>,
    /// 폴링 주기
    pub interval: Duration,
}

impl PollerConfig {
    /// 기본 주기(1초)로 설정을 생성합니다.
    pub fn new<I, S>(dir: impl Into<PathBuf>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: dir.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// 폴링 주기를 설정합니다.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// core의 `[pipeline]` 설정으로부터 폴러 설정을 생성합니다.
    pub fn from_core(core: &CorePipelineConfig) -> Self {
        Self::new(&core.input_dir, core.extensions.iter().cloned())
    }

    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> Result<(), ReportPipelineError> {
        if self.interval.is_zero() {
            return Err(ReportPipelineError::Config {
                field: "interval".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        if self.extensions.is_empty() {
            return Err(ReportPipelineError::Config {
                field: "extensions".to_owned(),
                reason: "at least one extension is required".to_owned(),
            });
        }
        Ok(())
    }
}

/// 한 번의 스캔 결과
#[derive(Debug, PartialEq, Eq)]
struct Scan<'a> {
    /// 전달할 파일 이름
    candidate: Option<&'a str>,
    /// 직전 전달과 같아 건너뛴 이름
    skipped: Option<&'a str>,
}

/// 정렬된 파일 이름 목록에서 이번 틱에 전달할 파일을 고릅니다.
fn scan<'a>(names: &'a [String], extensions: &HashSet<String>, last: Option<&str>) -> Scan<'a> {
    let mut skipped = None;
    for name in names {
        if !has_accepted_extension(name, extensions) {
            continue;
        }
        if last == Some(name.as_str()) {
            skipped = Some(name.as_str());
            continue;
        }
        return Scan {
            candidate: Some(name),
            skipped,
        };
    }
    Scan {
        candidate: None,
        skipped,
    }
}

/// 마지막 `.` 뒤의 문자열을 확장자로 봅니다. `.txt` 도 `txt` 확장자입니다.
fn has_accepted_extension(name: &str, extensions: &HashSet<String>) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.contains(ext))
}

/// 틱 처리 결과
enum Tick {
    /// 계속 폴링
    Continue,
    /// 취소되었거나 수신측이 사라져 종료
    Stop,
}

/// 디렉토리 폴러
///
/// 직전에 전달한 파일 이름 하나만 상태로 유지합니다. 상태는 폴러 인스턴스에
/// 한정되며 프로세스 재시작 시에만 초기화됩니다.
#[derive(Debug)]
pub struct DirectoryPoller {
    /// 폴러 설정
    config: PollerConfig,
    /// 직전에 전달한 파일 이름
    last_delivered: Option<String>,
}

impl DirectoryPoller {
    /// 새 디렉토리 폴러를 생성합니다.
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            last_delivered: None,
        }
    }

    /// 직전에 전달한 파일 이름을 반환합니다.
    pub fn last_delivered(&self) -> Option<&str> {
        self.last_delivered.as_deref()
    }

    /// 폴링 루프를 실행합니다.
    ///
    /// 취소되거나 수신측이 사라지면 `Ok(())`, 디렉토리 나열에 실패하면 에러를 반환합니다.
    /// 반환 시 `tx`가 drop되어 핸드오프 채널이 닫힙니다.
    pub async fn run(
        &mut self,
        tx: HandoffSender<String>,
        cancel: CancellationToken,
    ) -> Result<(), ReportPipelineError> {
        self.config.validate()?;

        let period = self.config.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            dir = %self.config.dir.display(),
            interval_ms = period.as_millis() as u64,
            "directory poller started"
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("directory poller cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    if let Tick::Stop = self.poll_once(&tx, &cancel).await? {
                        break;
                    }
                }
            }
        }

        info!("directory poller stopped");
        Ok(())
    }

    /// 디렉토리를 한 번 스캔하고 최대 한 파일을 전달합니다.
    async fn poll_once(
        &mut self,
        tx: &HandoffSender<String>,
        cancel: &CancellationToken,
    ) -> Result<Tick, ReportPipelineError> {
        let names = match list_files(&self.config.dir).await {
            Ok(names) => names,
            Err(e) => {
                error!(dir = %self.config.dir.display(), error = %e, "failed to list directory");
                return Err(ReportPipelineError::Directory {
                    path: self.config.dir.clone(),
                    source: e,
                });
            }
        };

        let found = scan(&names, &self.config.extensions, self.last_delivered.as_deref());
        if let Some(name) = found.skipped {
            counter!(m::POLLER_DUPLICATES_SKIPPED_TOTAL).increment(1);
            warn!(file = name, "file already delivered, skipping");
        }

        let Some(name) = found.candidate else {
            return Ok(Tick::Continue);
        };
        let name = name.to_owned();

        debug!(file = %name, "new report file found");
        tokio::select! {
            biased;

            _ = cancel.cancelled() => Ok(Tick::Stop),
            sent = tx.send(name.clone()) => match sent {
                Ok(()) => {
                    counter!(m::POLLER_FILES_DISCOVERED_TOTAL).increment(1);
                    self.last_delivered = Some(name);
                    Ok(Tick::Continue)
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "hand-off receiver gone, stopping poller");
                    Ok(Tick::Stop)
                }
            },
        }
    }
}

/// 디렉토리의 파일(하위 디렉토리 제외) 이름을 사전순으로 반환합니다.
async fn list_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => debug!(name = ?raw, "skipping non utf-8 file name"),
        }
    }

    names.sort();
    Ok(names)
}
