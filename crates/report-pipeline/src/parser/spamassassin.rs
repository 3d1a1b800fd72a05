//! SpamAssassin 텍스트 리포트 파서
//!
//! 두 가지 리포트 레이아웃을 인식합니다.
//!
//! # Content analysis 표
//! ```text
//! Content analysis details:   (6.3 points, 5.0 required)
//!
//!  pts rule name              description
//! ---- ---------------------- --------------------------------------------------
//!  0.0 URIBL_BLOCKED          ADMINISTRATOR NOTICE: The query to URIBL was blocked.
//!                             See http://wiki.apache.org/spamassassin/DnsBlocklists
//!  1.5 HTML_MESSAGE           BODY: HTML included in message
//! ```
//!
//! # X-Spam-Report 헤더
//! ```text
//! X-Spam-Status: Yes, score=6.3 required=5.0 tests=HTML_MESSAGE,URIBL_BLOCKED
//! X-Spam-Report:
//! 	*  0.0 URIBL_BLOCKED ADMINISTRATOR NOTICE: The query to URIBL was blocked.
//! 	*      See http://wiki.apache.org/spamassassin/DnsBlocklists
//! 	*  1.5 HTML_MESSAGE BODY: HTML included in message
//! ```
//!
//! 표가 있으면 표를 우선합니다. 점수 없이 시작하는 행은 직전 규칙 설명의 연속입니다.

use sareport_core::error::ParseError;
use sareport_core::pipeline::ReportParser;
use sareport_core::types::{Header, Report};

/// 기본 최대 입력 크기 (10 MiB)
const DEFAULT_MAX_INPUT_SIZE: usize = 10 * 1024 * 1024;

const DETAILS_MARKER: &str = "Content analysis details:";
const REPORT_HEADER: &str = "X-Spam-Report";
const STATUS_HEADER: &str = "X-Spam-Status";

/// 표 레이아웃에서 이 이상 들여쓴 행은 설명 연속 행
const CONTINUATION_INDENT: usize = 4;

/// SpamAssassin 리포트 파서
///
/// core의 [`ReportParser`] trait을 구현하여 텍스트 리포트를 [`Report`]로 변환합니다.
/// 상태가 없으므로 여러 태스크에서 공유해도 안전합니다.
#[derive(Debug, Clone)]
pub struct SpamAssassinParser {
    /// 최대 허용 입력 크기 (바이트)
    max_input_size: usize,
}

impl SpamAssassinParser {
    /// 기본 설정으로 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
        }
    }

    /// 최대 입력 크기를 설정합니다.
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }
}

impl Default for SpamAssassinParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportParser for SpamAssassinParser {
    fn format_name(&self) -> &str {
        "spamassassin"
    }

    fn max_input_size(&self) -> Option<usize> {
        Some(self.max_input_size)
    }

    fn parse(&self, raw: &[u8]) -> Result<Report, ParseError> {
        if raw.len() > self.max_input_size {
            return Err(ParseError::TooLarge {
                size: raw.len(),
                max: self.max_input_size,
            });
        }

        let text = std::str::from_utf8(raw).map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let lines: Vec<&str> = text.lines().collect();

        if let Some(idx) = lines.iter().position(|l| l.contains(DETAILS_MARKER)) {
            return parse_table(&lines, idx);
        }

        let report_header = lines
            .iter()
            .enumerate()
            .find_map(|(idx, l)| header_value(l, REPORT_HEADER).map(|value| (idx, value)));
        if let Some((idx, value)) = report_header {
            return parse_header_report(&lines, idx, value);
        }

        Err(ParseError::UnsupportedFormat(
            "no content analysis table or X-Spam-Report header found".to_owned(),
        ))
    }
}

/// `Content analysis details:` 표를 파싱합니다.
fn parse_table(lines: &[&str], details_idx: usize) -> Result<Report, ParseError> {
    let details = lines[details_idx];
    let score = details_score(details).ok_or_else(|| ParseError::InvalidScore {
        line: details_idx + 1,
        value: details.trim().to_owned(),
    })?;

    let separator_idx = lines[details_idx + 1..]
        .iter()
        .position(|l| l.trim_start().starts_with("----"))
        .map(|offset| details_idx + 1 + offset)
        .ok_or_else(|| {
            ParseError::UnsupportedFormat("content analysis table has no separator line".to_owned())
        })?;

    let mut headers = Vec::new();
    for (offset, line) in lines[separator_idx + 1..].iter().enumerate() {
        let line_no = separator_idx + 2 + offset;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }

        let indent = line.len() - line.trim_start().len();
        if indent >= CONTINUATION_INDENT {
            append_description(&mut headers, trimmed, line_no)?;
        } else {
            headers.push(parse_rule_row(trimmed, line_no)?);
        }
    }

    Ok(Report::new(score, headers))
}

/// `X-Spam-Report` 헤더를 파싱합니다.
///
/// 헤더 값과 이어지는 `*` 행을 모은 뒤, 첫 번째 `*`가 아닌 행에서 멈춥니다.
fn parse_header_report(lines: &[&str], header_idx: usize, value: &str) -> Result<Report, ParseError> {
    let mut rows: Vec<(usize, &str)> = Vec::new();
    if value.starts_with('*') {
        rows.push((header_idx + 1, value));
    }
    for (offset, line) in lines[header_idx + 1..].iter().enumerate() {
        let trimmed = line.trim();
        if !trimmed.starts_with('*') {
            break;
        }
        rows.push((header_idx + 2 + offset, trimmed));
    }

    let mut headers = Vec::new();
    for (line_no, row) in rows {
        let body = row.trim_start_matches('*').trim();
        if body.is_empty() {
            continue;
        }

        let (first, _) = split_token(body);
        if looks_numeric(first) {
            headers.push(parse_rule_row(body, line_no)?);
        } else {
            append_description(&mut headers, body, line_no)?;
        }
    }

    let score = lines
        .iter()
        .find_map(|l| header_value(l, STATUS_HEADER))
        .and_then(status_score)
        .unwrap_or_else(|| round_score(headers.iter().map(|h| h.score).sum()));

    Ok(Report::new(score, headers))
}

/// `<score> <RULE_NAME> <description>` 행을 파싱합니다.
fn parse_rule_row(text: &str, line_no: usize) -> Result<Header, ParseError> {
    let (score_token, rest) = split_token(text);
    let score = parse_score(score_token, line_no)?;

    let (tag, description) = split_token(rest);
    if tag.is_empty() {
        return Err(ParseError::UnsupportedFormat(format!(
            "rule name missing at line {}",
            line_no
        )));
    }

    Ok(Header::new(score, tag, description))
}

fn append_description(headers: &mut [Header], text: &str, line_no: usize) -> Result<(), ParseError> {
    let Some(last) = headers.last_mut() else {
        return Err(ParseError::UnsupportedFormat(format!(
            "description continuation before first rule at line {}",
            line_no
        )));
    };

    if !last.description.is_empty() {
        last.description.push(' ');
    }
    last.description.push_str(text);
    Ok(())
}

fn parse_score(token: &str, line_no: usize) -> Result<f64, ParseError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidScore {
            line: line_no,
            value: token.to_owned(),
        })
}

/// 첫 토큰과 나머지(앞뒤 공백 제거)로 나눕니다.
fn split_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], text[i..].trim()),
        None => (text, ""),
    }
}

fn looks_numeric(token: &str) -> bool {
    token
        .trim_start_matches(['-', '+'])
        .starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

/// `(6.3 points, 5.0 required)`에서 총점을 꺼냅니다.
fn details_score(line: &str) -> Option<f64> {
    let pos = line.find(DETAILS_MARKER)?;
    let rest = &line[pos + DETAILS_MARKER.len()..];
    let inner = &rest[rest.find('(')? + 1..];

    let mut tokens = inner.split_whitespace();
    let score = tokens.next()?.parse::<f64>().ok().filter(|v| v.is_finite())?;
    tokens.next().filter(|t| t.starts_with("point"))?;
    Some(score)
}

/// `X-Spam-Status` 값의 `score=` 항목을 꺼냅니다.
fn status_score(value: &str) -> Option<f64> {
    let start = value.find("score=")? + "score=".len();
    let rest = &value[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.')))
        .unwrap_or(rest.len());
    rest[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 헤더 이름이 일치하면 콜론 뒤 값을 반환합니다 (이름은 대소문자 무시).
fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let head = line.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    line[name.len()..].strip_prefix(':').map(str::trim)
}

fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
