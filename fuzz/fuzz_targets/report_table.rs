#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use sareport_core::pipeline::ReportParser;
use sareport_core::types::Report;
use sareport_pipeline::parser::SpamAssassinParser;
use sareport_pipeline::render_report;

/// 퍼저용 구조적 content analysis 표 입력
#[derive(Arbitrary, Debug)]
struct FuzzTable {
    total_tenths: i16,
    rows: Vec<FuzzRow>,
}

#[derive(Arbitrary, Debug)]
struct FuzzRow {
    score_tenths: i8,
    tag: String,
    description: String,
    continuation: Option<String>,
}

/// 규칙 이름으로 쓸 수 있는 문자만 남긴다
fn sanitize_tag(raw: &str, i: usize) -> String {
    let tag: String = raw
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_')
        .take(22)
        .collect();
    if tag.is_empty() {
        format!("RULE_{i}")
    } else {
        tag
    }
}

fn sanitize_words(raw: &str) -> String {
    let words: Vec<String> = raw
        .split_whitespace()
        .map(|w| w.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
        .filter(|w| !w.is_empty())
        .take(12)
        .collect();
    if words.is_empty() {
        "description".to_owned()
    } else {
        words.join(" ")
    }
}

fuzz_target!(|input: FuzzTable| {
    // 행 수 제한 (퍼징 성능)
    let rows: Vec<&FuzzRow> = input.rows.iter().take(50).collect();

    let mut text = format!(
        "Content analysis details:   ({:.1} points, 5.0 required)\n\n pts rule name              description\n---- ---------------------- --------------------------------------------------\n",
        f64::from(input.total_tenths) / 10.0
    );
    let mut expected_tags = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let tag = sanitize_tag(&row.tag, i);
        let score = f64::from(row.score_tenths) / 10.0;
        text.push_str(&format!(
            "{:>4.1} {:<22} {}\n",
            score,
            tag,
            sanitize_words(&row.description)
        ));
        if let Some(more) = &row.continuation {
            text.push_str(&format!("{:28}{}\n", "", sanitize_words(more)));
        }
        expected_tags.push(tag);
    }

    let report = SpamAssassinParser::new()
        .parse(text.as_bytes())
        .expect("well-formed table should parse");

    let tags: Vec<&str> = report.headers().iter().map(|h| h.tag.as_str()).collect();
    assert_eq!(tags, expected_tags);

    // 결과 JSON은 같은 리포트로 다시 읽혀야 한다
    let json = render_report(&report).expect("report should serialize");
    let back: Report = serde_json::from_slice(&json).expect("result JSON should deserialize");
    assert_eq!(back.headers().len(), report.headers().len());
});
