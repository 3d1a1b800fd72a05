//! 파이프라인 trait -- 파서 확장 포인트 정의

use crate::error::ParseError;
use crate::types::Report;

/// 리포트 파서 trait
///
/// 새로운 리포트 형식을 지원하려면 이 trait을 구현합니다.
/// 파서는 순수 함수처럼 동작해야 하며, 입력 바이트를 반환 이후까지 보관하지 않습니다.
pub trait ReportParser: Send + Sync {
    /// 지원하는 리포트 형식 이름
    fn format_name(&self) -> &str;

    /// 한 번에 받아들이는 최대 입력 크기 (바이트). `None`이면 제한 없음.
    ///
    /// 호출자는 이 크기보다 1바이트만 더 읽어 넘기면 됩니다.
    fn max_input_size(&self) -> Option<usize> {
        None
    }

    /// 원시 바이트를 리포트로 파싱
    fn parse(&self, raw: &[u8]) -> Result<Report, ParseError>;
}
