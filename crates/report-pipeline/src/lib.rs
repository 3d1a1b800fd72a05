//! sareport 리포트 처리 파이프라인
//!
//! # 모듈 구성
//!
//! - [`processor`]: 리포트 소스를 파싱해 결과/에러 채널로 발행하는 [`Processor`]
//! - [`collector`]: 감시 디렉토리에서 새 리포트 파일을 찾는 [`DirectoryPoller`]
//! - [`dispatch`]: 폴러 -> Processor, Processor -> 파일 시스템 연결부
//! - [`parser`]: SpamAssassin 텍스트 리포트 파서
//! - [`archive`]: 결과 파일 기록과 아카이브 이동
//! - [`channel`]: 버퍼 0(동기 전달)을 지원하는 핸드오프 채널
//! - [`source`]: Processor 입력인 [`ReportSource`]
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! input_dir -> DirectoryPoller -> Dispatcher -> Processor -> Consumer -> result_dir + archive_dir
//!                  1 file/tick     open file      parse         .json + move
//! ```

pub mod archive;
pub mod channel;
pub mod collector;
pub mod dispatch;
pub mod error;
pub mod parser;
pub mod processor;
pub mod source;

// --- 주요 타입 re-export ---

// Processor
pub use processor::{Processor, ProcessorConfig, Response};

// 수집기
pub use collector::{DirectoryPoller, PollerConfig};

// 연결부
pub use dispatch::{Consumer, Dispatcher, render_report};

// 채널
pub use channel::{HandoffError, HandoffReceiver, HandoffSender};

// 입력
pub use source::{ReportSource, ReportStream};

// 파서
pub use parser::SpamAssassinParser;

// 에러
pub use error::{ProcessingError, ProcessingErrorKind, ReportPipelineError};
