//! 리포트 파싱 모듈
//!
//! 파서는 core의 [`ReportParser`](sareport_core::pipeline::ReportParser) trait을 구현하며,
//! Processor는 trait object로 파서를 받으므로 다른 형식의 파서로 교체할 수 있습니다.
//!
//! # 사용 예시
//! ```ignore
//! use sareport_core::pipeline::ReportParser;
//! use sareport_pipeline::parser::SpamAssassinParser;
//!
//! let report = SpamAssassinParser::new().parse(raw_bytes)?;
//! println!("score = {}", report.score());
//! ```

pub mod spamassassin;

pub use spamassassin::SpamAssassinParser;
