//! 리포트 소스 -- Processor에 제출되는 단일 사용 입력
//!
//! [`ReportSource`]는 열린 바이트 스트림과 test ID를 묶습니다.
//! Processor가 소유권을 넘겨받아 끝까지 읽은 뒤, 결과와 상관없이 정확히 한 번 닫습니다.

use std::fmt;
use std::io::Cursor;

use tokio::io::AsyncRead;

/// 리포트 바이트 스트림
///
/// `close`는 Processor가 처리 후 한 번 호출합니다. 실패해도 로그만 남고
/// 파이프라인에는 영향을 주지 않습니다.
pub trait ReportStream: AsyncRead + Send + Unpin {
    /// 스트림을 닫습니다. 기본 구현은 아무 일도 하지 않습니다 (drop 시 해제).
    fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl ReportStream for tokio::fs::File {}

impl ReportStream for Cursor<Vec<u8>> {}

impl ReportStream for &'static [u8] {}

/// Processor 입력 -- 바이트 스트림 + test ID
pub struct ReportSource {
    /// 리포트 바이트 스트림 (독점 소유)
    pub data: Box<dyn ReportStream>,
    /// 입력 식별자 (보통 파일 이름)
    pub test_id: String,
}

impl ReportSource {
    /// 새 리포트 소스를 생성합니다.
    pub fn new(data: impl ReportStream + 'static, test_id: impl Into<String>) -> Self {
        Self {
            data: Box::new(data),
            test_id: test_id.into(),
        }
    }

    /// 메모리 버퍼로 리포트 소스를 생성합니다.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, test_id: impl Into<String>) -> Self {
        Self::new(Cursor::new(bytes.into()), test_id)
    }
}

impl fmt::Debug for ReportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportSource")
            .field("test_id", &self.test_id)
            .finish_non_exhaustive()
    }
}
