//! 리포트 파서 벤치마크
//!
//! Content analysis 표와 X-Spam-Report 헤더 레이아웃의 파싱 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sareport_core::pipeline::ReportParser;
use sareport_pipeline::parser::SpamAssassinParser;

/// Content analysis 표 (실제 리포트)
const TABLE_REPORT: &[u8] = include_bytes!("../tests/testdata/report1.txt");

/// X-Spam-Report 헤더 (실제 리포트)
const HEADER_REPORT: &[u8] = include_bytes!("../tests/testdata/report2.txt");

/// 규칙 행 `rows`개로 이루어진 표 리포트를 생성합니다.
fn table_with_rows(rows: usize) -> Vec<u8> {
    let mut report = String::from(
        "Content analysis details:   (12.0 points, 5.0 required)\n\n pts rule name              description\n---- ---------------------- --------------------------------------------------\n",
    );
    for i in 0..rows {
        report.push_str(&format!(
            " 0.1 RULE_{:<17} Synthetic rule number {} for benchmarking\n                            with a wrapped description line\n",
            i, i
        ));
    }
    report.into_bytes()
}

fn bench_layouts(c: &mut Criterion) {
    let parser = SpamAssassinParser::new();
    let mut group = c.benchmark_group("spamassassin");

    group.throughput(Throughput::Bytes(TABLE_REPORT.len() as u64));
    group.bench_function("table", |b| {
        b.iter(|| parser.parse(black_box(TABLE_REPORT)).unwrap())
    });

    group.throughput(Throughput::Bytes(HEADER_REPORT.len() as u64));
    group.bench_function("header", |b| {
        b.iter(|| parser.parse(black_box(HEADER_REPORT)).unwrap())
    });

    group.finish();
}

fn bench_rule_count(c: &mut Criterion) {
    let parser = SpamAssassinParser::new();
    let mut group = c.benchmark_group("spamassassin_rules");

    for rows in [10, 100, 1000] {
        let report = table_with_rows(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &report, |b, report| {
            b.iter(|| parser.parse(black_box(report)).unwrap())
        });
    }

    group.finish();
}

fn bench_rejection(c: &mut Criterion) {
    let parser = SpamAssassinParser::new();
    let plain = b"Hello,\n\nThis is an ordinary message without any spam analysis attached.\n";

    c.bench_function("spamassassin_unsupported", |b| {
        b.iter(|| parser.parse(black_box(plain)).unwrap_err())
    });
}

criterion_group!(benches, bench_layouts, bench_rule_count, bench_rejection);
criterion_main!(benches);
