#![no_main]

use libfuzzer_sys::fuzz_target;
use sareport_core::pipeline::ReportParser;
use sareport_pipeline::parser::SpamAssassinParser;
use sareport_pipeline::render_report;

fuzz_target!(|data: &[u8]| {
    let parser = SpamAssassinParser::new();

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(report) = parser.parse(data) {
        // 파싱된 리포트는 항상 결과 JSON으로 기록 가능해야 한다
        let _ = render_report(&report);
    }
});
