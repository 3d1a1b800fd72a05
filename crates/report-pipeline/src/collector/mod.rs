//! 리포트 수집 모듈 -- 감시 디렉토리에서 새 리포트 파일을 찾아 전달합니다.
//!
//! # 수집 소스
//! - [`DirectoryPoller`]: 주기적 디렉토리 폴링 (틱당 최대 한 파일)
//!
//! # 아키텍처
//! 폴러는 자체 tokio 태스크에서 실행되며, 발견한 파일 이름을
//! [`HandoffSender<String>`](crate::channel::HandoffSender)로 Dispatcher에 넘깁니다.

pub mod directory;

pub use directory::{DEFAULT_POLL_INTERVAL, DirectoryPoller, PollerConfig};
