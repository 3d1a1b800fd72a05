//! 도메인 타입 -- 파싱된 SpamAssassin 리포트 모델
//!
//! 파서가 생성하고 파이프라인이 JSON으로 직렬화하는 값 타입입니다.
//! 파이프라인 코어는 이 구조를 해석하지 않고 그대로 전달만 합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 파싱된 리포트
///
/// JSON 출력은 `{"spamAssassin": {"score": .., "headers": [..]}}` 형태입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// SpamAssassin 분석 결과
    pub spam_assassin: SpamAssassin,
}

impl Report {
    /// 총점과 규칙 목록으로 리포트를 생성합니다.
    pub fn new(score: f64, headers: Vec<Header>) -> Self {
        Self {
            spam_assassin: SpamAssassin { score, headers },
        }
    }

    /// 리포트 총점
    pub fn score(&self) -> f64 {
        self.spam_assassin.score
    }

    /// 매칭된 규칙 목록
    pub fn headers(&self) -> &[Header] {
        &self.spam_assassin.headers
    }
}

/// SpamAssassin 분석 결과 본문
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpamAssassin {
    /// 총 스팸 점수
    pub score: f64,
    /// 매칭된 규칙 (리포트에 나타난 순서)
    pub headers: Vec<Header>,
}

/// 매칭된 규칙 한 줄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// 규칙 점수 (음수 가능)
    pub score: f64,
    /// 규칙 이름 (예: `URIBL_BLOCKED`)
    pub tag: String,
    /// 규칙 설명 (여러 줄이면 공백 하나로 이어붙임)
    pub description: String,
}

impl Header {
    /// 새 규칙 항목을 생성합니다.
    pub fn new(score: f64, tag: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            score,
            tag: tag.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5.1} {:<24} {}", self.score, self.tag, self.description)
    }
}
