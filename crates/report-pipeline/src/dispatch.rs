//! Dispatcher / Consumer -- 폴러와 Processor, Processor와 파일 시스템을 잇는 연결부
//!
//! ```text
//! DirectoryPoller --name--> Dispatcher --ReportSource--> Processor
//! Processor --Response/ProcessingError--> Consumer --> result_dir/<stem>.json + archive_dir/
//! ```
//!
//! 두 구성 요소 모두 부수 효과의 실패를 로그로만 남기고 계속 진행합니다.

use std::path::{Path, PathBuf};

use metrics::counter;
use serde::Serialize;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use sareport_core::config::PipelineConfig as CorePipelineConfig;
use sareport_core::metrics as m;
use sareport_core::types::Report;

use crate::archive;
use crate::channel::{HandoffReceiver, HandoffSender};
use crate::error::{ProcessingError, ReportPipelineError};
use crate::processor::Response;
use crate::source::ReportSource;

/// 리포트를 탭 들여쓰기 JSON으로 직렬화합니다.
pub fn render_report(report: &Report) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report.serialize(&mut serializer)?;
    Ok(buf)
}

/// 파일 이름을 열어 Processor 입력으로 제출합니다.
#[derive(Debug)]
pub struct Dispatcher {
    /// 감시 디렉토리 (파일 이름의 기준 경로)
    input_dir: PathBuf,
    /// Processor 입력
    input: HandoffSender<ReportSource>,
}

impl Dispatcher {
    /// 새 Dispatcher를 생성합니다.
    pub fn new(input_dir: impl Into<PathBuf>, input: HandoffSender<ReportSource>) -> Self {
        Self {
            input_dir: input_dir.into(),
            input,
        }
    }

    /// 핸드오프 채널이 닫히거나 취소될 때까지 파일 이름을 받아 제출합니다.
    ///
    /// 각 제출은 별도 태스크에서 수행되므로 파싱이 느려도 다음 파일 수신이 막히지 않습니다.
    /// 채널이 닫히면 남은 제출을 마무리하고, 취소되면 남은 제출을 중단합니다.
    pub async fn run(self, mut names: HandoffReceiver<String>, cancel: CancellationToken) {
        let mut submissions = JoinSet::new();
        info!(dir = %self.input_dir.display(), "dispatcher started");

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                Some(joined) = submissions.join_next(), if !submissions.is_empty() => {
                    log_join(joined);
                }
                next = names.recv() => match next {
                    Some(name) => self.dispatch(name, &mut submissions).await,
                    None => {
                        debug!("hand-off channel closed");
                        break;
                    }
                },
            }
        }

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    if !submissions.is_empty() {
                        debug!(pending = submissions.len(), "aborting pending submissions");
                    }
                    submissions.abort_all();
                    break;
                }
                joined = submissions.join_next() => match joined {
                    Some(joined) => log_join(joined),
                    None => break,
                },
            }
        }

        info!("dispatcher stopped");
    }

    async fn dispatch(&self, name: String, submissions: &mut JoinSet<()>) {
        let path = self.input_dir.join(&name);
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) => {
                error!(file = %path.display(), error = %e, "failed to open report file");
                return;
            }
        };

        let input = self.input.clone();
        submissions.spawn(async move {
            if let Err(e) = input.send(ReportSource::new(file, name.clone())).await {
                warn!(test_id = %name, error = %e, "processor did not accept report");
            }
        });
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if !e.is_cancelled() {
            error!(error = %e, "submission task failed");
        }
    }
}

/// Processor 출력을 결과 파일과 아카이브 이동으로 바꿉니다.
#[derive(Debug, Clone)]
pub struct Consumer {
    input_dir: PathBuf,
    result_dir: PathBuf,
    archive_dir: PathBuf,
}

impl Consumer {
    /// 새 Consumer를 생성합니다.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        result_dir: impl Into<PathBuf>,
        archive_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            result_dir: result_dir.into(),
            archive_dir: archive_dir.into(),
        }
    }

    /// core의 `[pipeline]` 설정으로부터 Consumer를 생성합니다.
    pub fn from_core(core: &CorePipelineConfig) -> Self {
        Self::new(&core.input_dir, &core.result_dir, &core.archive_dir)
    }

    /// 존재하는 출력 채널만 대기하며 결과와 에러를 처리합니다.
    ///
    /// 두 채널이 모두 닫히거나(또는 처음부터 없거나) 취소되면 반환합니다.
    pub async fn run(
        &self,
        mut results: Option<HandoffReceiver<Response>>,
        mut errors: Option<HandoffReceiver<ProcessingError>>,
        cancel: CancellationToken,
    ) {
        info!(
            results = results.is_some(),
            errors = errors.is_some(),
            "consumer started"
        );

        while results.is_some() || errors.is_some() {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                next = recv_or_pending(&mut results) => match next {
                    Some(response) => self.handle_response(response).await,
                    None => results = None,
                },
                next = recv_or_pending(&mut errors) => match next {
                    Some(err) => error!(test_id = %err.test_id, error = %err.kind, "report processing failed"),
                    None => errors = None,
                },
            }
        }

        info!("consumer stopped");
    }

    /// 결과 기록과 아카이브 이동을 각각 시도합니다.
    ///
    /// 결과 기록이 실패해도 원본은 아카이브로 옮겨 다시 발견되지 않게 합니다.
    async fn handle_response(&self, response: Response) {
        let written = match self.write_result(&response).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!(test_id = %response.test_id, error = %e, "failed to write result");
                None
            }
        };

        let archived =
            match archive::move_file(&response.test_id, &self.input_dir, &self.archive_dir).await {
                Ok(path) => Some(path),
                Err(e) => {
                    error!(test_id = %response.test_id, error = %e, "failed to archive report");
                    None
                }
            };

        match (written, archived) {
            (Some(result), Some(archived)) => {
                counter!(m::CONSUMER_ARCHIVED_TOTAL, m::LABEL_RESULT => "success").increment(1);
                info!(
                    test_id = %response.test_id,
                    score = response.report.score(),
                    result = %result.display(),
                    archived = %archived.display(),
                    "report archived"
                );
            }
            _ => {
                counter!(m::CONSUMER_ARCHIVED_TOTAL, m::LABEL_RESULT => "failure").increment(1);
            }
        }
    }

    async fn write_result(&self, response: &Response) -> Result<PathBuf, ReportPipelineError> {
        let content = render_report(&response.report)?;
        archive::write_result(&response.test_id, &self.result_dir, &content).await
    }

    /// 결과 디렉토리
    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// 아카이브 디렉토리
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }
}

/// 채널이 없으면 영원히 대기하는 수신
async fn recv_or_pending<T>(rx: &mut Option<HandoffReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
