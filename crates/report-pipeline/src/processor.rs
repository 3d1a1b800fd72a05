//! Processor -- 리포트 소스를 받아 파싱하고 결과/에러를 채널로 발행합니다.
//!
//! [`Processor`]는 입력 채널 하나와 설정에 따라 존재 여부가 결정되는 출력 채널 두 개
//! (results, errors)를 가집니다. 처리 루프는 인스턴스당 하나이며, 항목을 제출 순서대로
//! 한 번에 하나씩 처리합니다.
//!
//! # 생명주기
//! ```text
//! new() -> input()/results()/errors() 배포 -> process(cancel) 실행
//!       -> close()  : 입력을 닫고 남은 항목을 모두 처리한 뒤 출력 채널을 닫고 종료
//!       -> cancel   : 남은 항목을 버리고 즉시 종료
//! ```
//!
//! 비활성화된 출력 채널에는 절대 전송하지 않습니다. 해당 결과는 로그로만 남습니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use metrics::counter;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use sareport_core::config::PipelineConfig as CorePipelineConfig;
use sareport_core::metrics as m;
use sareport_core::pipeline::ReportParser;
use sareport_core::types::Report;

use crate::channel::{self, HandoffReceiver, HandoffSender};
use crate::error::{ProcessingError, ReportPipelineError};
use crate::parser::SpamAssassinParser;
use crate::source::{ReportSource, ReportStream};

/// Processor 설정
///
/// 생성 시점에 고정되며 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// 채널 버퍼 크기 (0이면 동기 전달)
    pub buffer: usize,
    /// 결과 채널 생성 여부
    pub receive_results: bool,
    /// 에러 채널 생성 여부
    pub receive_errors: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            buffer: 0,
            receive_results: true,
            receive_errors: false,
        }
    }
}

impl ProcessorConfig {
    /// core의 `[pipeline]` 설정으로부터 Processor 설정을 생성합니다.
    pub fn from_core(core: &CorePipelineConfig) -> Self {
        Self {
            buffer: core.buffer_size,
            receive_results: core.receive_results,
            receive_errors: core.receive_errors,
        }
    }
}

/// 파싱 성공 결과 -- test ID와 리포트
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// 원본 소스의 test ID
    pub test_id: String,
    /// 파싱된 리포트
    pub report: Report,
}

/// 처리 루프가 소유하는 채널 끝단
struct LoopParts {
    input_rx: HandoffReceiver<ReportSource>,
    results_tx: Option<HandoffSender<Response>>,
    errors_tx: Option<HandoffSender<ProcessingError>>,
}

/// 출력 전달 결과
enum Delivery {
    /// 전달했거나 수신측이 사라져 버림
    Done,
    /// 전달 대기 중 취소됨
    Cancelled,
}

/// 리포트 Processor
///
/// 여러 태스크에서 공유할 수 있도록 모든 연산이 `&self`를 받습니다.
///
/// # 사용 예시
/// ```ignore
/// let processor = Arc::new(Processor::new_default());
/// let input = processor.input();
/// let mut results = processor.results().expect("results enabled by default");
///
/// let runner = Arc::clone(&processor);
/// tokio::spawn(async move { runner.process(cancel).await });
///
/// input.send(ReportSource::from_bytes(raw, "report1.txt")).await?;
/// let response = results.recv().await;
/// processor.close();
/// ```
pub struct Processor {
    /// 고정된 설정
    config: ProcessorConfig,
    /// 리포트 파서
    parser: Box<dyn ReportParser>,
    /// 입력 채널 송신측 (`input()`으로 복제 배포)
    input_tx: HandoffSender<ReportSource>,
    /// 결과 수신측 (한 번만 꺼낼 수 있음)
    results_rx: Mutex<Option<HandoffReceiver<Response>>>,
    /// 에러 수신측 (한 번만 꺼낼 수 있음)
    errors_rx: Mutex<Option<HandoffReceiver<ProcessingError>>>,
    /// 처리 루프 몫의 채널 (`process()` 첫 호출 시 꺼냄)
    parts: Mutex<Option<LoopParts>>,
    /// close 1회 보장 플래그
    closed: AtomicBool,
    /// 입력 닫힘 신호
    close_signal: CancellationToken,
}

impl Processor {
    /// 기본 SpamAssassin 파서로 새 Processor를 생성합니다.
    pub fn new(config: ProcessorConfig) -> Self {
        Self::with_parser(config, SpamAssassinParser::new())
    }

    /// 기본 설정(버퍼 0, 결과 활성, 에러 비활성)으로 새 Processor를 생성합니다.
    pub fn new_default() -> Self {
        Self::new(ProcessorConfig::default())
    }

    /// 지정한 파서로 새 Processor를 생성합니다.
    pub fn with_parser(config: ProcessorConfig, parser: impl ReportParser + 'static) -> Self {
        let (input_tx, input_rx) = channel::channel(config.buffer);

        let (results_tx, results_rx) = if config.receive_results {
            let (tx, rx) = channel::channel(config.buffer);
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        let (errors_tx, errors_rx) = if config.receive_errors {
            let (tx, rx) = channel::channel(config.buffer);
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        Self {
            config,
            parser: Box::new(parser),
            input_tx,
            results_rx: Mutex::new(results_rx),
            errors_rx: Mutex::new(errors_rx),
            parts: Mutex::new(Some(LoopParts {
                input_rx,
                results_tx,
                errors_tx,
            })),
            closed: AtomicBool::new(false),
            close_signal: CancellationToken::new(),
        }
    }

    /// 설정을 반환합니다.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// 입력 채널 송신 핸들을 반환합니다.
    ///
    /// `close()` 이후의 전송은 [`HandoffError::Closed`](crate::channel::HandoffError::Closed)로
    /// 실패할 수 있습니다. 호출자는 close 이후 전송하지 않아야 합니다.
    pub fn input(&self) -> HandoffSender<ReportSource> {
        self.input_tx.clone()
    }

    /// 결과 채널 수신 핸들을 꺼냅니다.
    ///
    /// 결과 채널이 비활성화되었거나 이미 꺼냈으면 `None`입니다.
    pub fn results(&self) -> Option<HandoffReceiver<Response>> {
        self.results_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// 에러 채널 수신 핸들을 꺼냅니다.
    ///
    /// 에러 채널이 비활성화되었거나 이미 꺼냈으면 `None`입니다.
    pub fn errors(&self) -> Option<HandoffReceiver<ProcessingError>> {
        self.errors_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// 입력 채널을 닫습니다.
    ///
    /// 여러 번, 여러 태스크에서 동시에 호출해도 실제 닫기는 한 번만 일어납니다.
    /// 처리 루프는 이미 적재된 항목을 모두 처리한 뒤 종료합니다.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.close_signal.cancel();
        debug!("processor input close requested");
    }

    /// `close()`가 호출되었는지 확인합니다.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 처리 루프를 실행합니다.
    ///
    /// 입력이 닫히고 비워지거나 `cancel`이 발동하면 반환합니다. 반환 시 출력 채널이 닫힙니다.
    /// 같은 Processor에서 두 번째 호출은 [`ReportPipelineError::AlreadyRunning`]을 반환합니다.
    pub async fn process(&self, cancel: CancellationToken) -> Result<(), ReportPipelineError> {
        let parts = self
            .parts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ReportPipelineError::AlreadyRunning)?;

        let LoopParts {
            mut input_rx,
            results_tx,
            errors_tx,
        } = parts;

        info!(
            buffer = self.config.buffer,
            receive_results = self.config.receive_results,
            receive_errors = self.config.receive_errors,
            parser = self.parser.format_name(),
            "processor started"
        );

        let mut draining = false;
        let mut processed: u64 = 0;

        loop {
            let source = tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!(processed, "processor cancelled");
                    break;
                }
                _ = self.close_signal.cancelled(), if !draining => {
                    draining = true;
                    input_rx.close();
                    debug!("processor input closed, draining queued reports");
                    continue;
                }
                next = input_rx.recv() => match next {
                    Some(source) => source,
                    None => {
                        info!(processed, "processor input drained");
                        break;
                    }
                },
            };

            processed += 1;
            let outcome = self.process_source(source).await;
            if let Delivery::Cancelled = self
                .publish(outcome, results_tx.as_ref(), errors_tx.as_ref(), &cancel)
                .await
            {
                info!(processed, "processor cancelled during delivery");
                break;
            }
        }

        // 루프 몫의 송신측을 drop하여 출력 채널을 닫음
        drop(results_tx);
        drop(errors_tx);
        info!("processor stopped");
        Ok(())
    }

    /// 소스 하나를 읽고 파싱합니다. 스트림은 결과와 상관없이 닫습니다.
    async fn process_source(&self, mut source: ReportSource) -> Result<Response, ProcessingError> {
        let outcome = match read_bounded(source.data.as_mut(), self.parser.max_input_size()).await {
            Ok(raw) => self
                .parser
                .parse(&raw)
                .map(|report| Response {
                    test_id: source.test_id.clone(),
                    report,
                })
                .map_err(|e| ProcessingError::parse(source.test_id.clone(), e)),
            Err(e) => Err(ProcessingError::read(source.test_id.clone(), e)),
        };

        if let Err(e) = source.data.close() {
            counter!(m::PROCESSOR_CLOSE_ERRORS_TOTAL).increment(1);
            error!(test_id = %source.test_id, error = %e, "failed to close report stream");
        }

        outcome
    }

    /// 처리 결과를 해당 채널로 보내거나, 채널이 없으면 로그로 남깁니다.
    async fn publish(
        &self,
        outcome: Result<Response, ProcessingError>,
        results_tx: Option<&HandoffSender<Response>>,
        errors_tx: Option<&HandoffSender<ProcessingError>>,
        cancel: &CancellationToken,
    ) -> Delivery {
        match outcome {
            Ok(response) => {
                counter!(m::PROCESSOR_REPORTS_PROCESSED_TOTAL, m::LABEL_RESULT => "success")
                    .increment(1);
                match results_tx {
                    Some(tx) => deliver(tx, response, cancel, "results").await,
                    None => {
                        info!(
                            test_id = %response.test_id,
                            score = response.report.score(),
                            rules = response.report.headers().len(),
                            "report processed"
                        );
                        Delivery::Done
                    }
                }
            }
            Err(err) => {
                counter!(m::PROCESSOR_REPORTS_PROCESSED_TOTAL, m::LABEL_RESULT => "failure")
                    .increment(1);
                if err.parse_error().is_some() {
                    counter!(m::PROCESSOR_PARSE_ERRORS_TOTAL).increment(1);
                }
                match errors_tx {
                    Some(tx) => deliver(tx, err, cancel, "errors").await,
                    None => {
                        error!(test_id = %err.test_id, error = %err.kind, "report processing failed");
                        Delivery::Done
                    }
                }
            }
        }
    }
}

/// 스트림을 끝까지 읽되, 제한이 있으면 `limit + 1` 바이트에서 멈춥니다.
///
/// 넘친 1바이트로 파서가 크기 초과를 판정합니다.
async fn read_bounded(
    data: &mut dyn ReportStream,
    limit: Option<usize>,
) -> std::io::Result<Vec<u8>> {
    let mut raw = Vec::new();
    match limit {
        Some(max) => {
            let cap = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
            data.take(cap).read_to_end(&mut raw).await?;
        }
        None => {
            data.read_to_end(&mut raw).await?;
        }
    }
    Ok(raw)
}

/// 출력 채널로 항목을 전달합니다. 대기 중 취소되면 전달을 포기합니다.
async fn deliver<T>(
    tx: &HandoffSender<T>,
    item: T,
    cancel: &CancellationToken,
    channel: &'static str,
) -> Delivery {
    tokio::select! {
        biased;

        _ = cancel.cancelled() => Delivery::Cancelled,
        sent = tx.send(item) => {
            if let Err(e) = sent {
                warn!(channel, error = %e, "outcome dropped, receiver is gone");
            }
            Delivery::Done
        }
    }
}
