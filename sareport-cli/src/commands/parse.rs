//! `sareport parse` command handler

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sareport_core::types::Report;
use sareport_pipeline::{
    ProcessingError, ProcessingErrorKind, Processor, ProcessorConfig, ReportSource, Response,
};

use crate::cli::ParseArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `parse` command.
pub async fn execute(args: ParseArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let report = parse_file(&args.file).await?;
    writer.render(&report)
}

/// Parse a single report file through a one-shot [`Processor`].
///
/// # Errors
///
/// - `CliError::Io` if the file cannot be opened or read
/// - `CliError::Parse` if the report is rejected
pub async fn parse_file(path: &Path) -> Result<ParseReport, CliError> {
    info!(path = %path.display(), "parsing report");

    let file = tokio::fs::File::open(path).await?;
    let test_id = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let response = run_once(ReportSource::new(file, test_id)).await?;
    Ok(ParseReport {
        source: path.display().to_string(),
        report: response.report,
    })
}

/// Submit one source and wait for its result or error.
async fn run_once(source: ReportSource) -> Result<Response, CliError> {
    let processor = Arc::new(Processor::new(ProcessorConfig {
        buffer: 0,
        receive_results: true,
        receive_errors: true,
    }));
    let (mut results, mut errors) = match (processor.results(), processor.errors()) {
        (Some(results), Some(errors)) => (results, errors),
        _ => return Err(CliError::Command("processor channels unavailable".to_owned())),
    };

    let cancel = CancellationToken::new();
    let runner = Arc::clone(&processor);
    let loop_cancel = cancel.clone();
    let task = tokio::spawn(async move { runner.process(loop_cancel).await });

    let outcome = match processor.input().send(source).await {
        Ok(()) => tokio::select! {
            Some(response) = results.recv() => Ok(response),
            Some(err) = errors.recv() => Err(processing_failure(err)),
            else => Err(CliError::Command(
                "processor stopped before producing an outcome".to_owned(),
            )),
        },
        Err(e) => Err(CliError::Command(format!("failed to submit report: {}", e))),
    };

    processor.close();
    match task.await {
        Ok(Ok(())) => debug!("processor loop finished"),
        Ok(Err(e)) => warn!(error = %e, "processor loop failed"),
        Err(e) => {
            warn!(error = %e, "processor task panicked");
            cancel.cancel();
        }
    }

    outcome
}

fn processing_failure(err: ProcessingError) -> CliError {
    let ProcessingError { test_id, kind } = err;
    match kind {
        ProcessingErrorKind::Parse(e) => CliError::Parse(format!("{}: {}", test_id, e)),
        ProcessingErrorKind::Read(e) => CliError::Io(e),
    }
}

/// Parsed report output.
///
/// JSON output flattens the report, so it matches the daemon's result files
/// plus a `source` field.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    /// Report file path
    pub source: String,
    /// Parsed report
    #[serde(flatten)]
    pub report: Report,
}

impl Render for ParseReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Report: {}", self.source.bold())?;
        writeln!(
            w,
            "  Score: {}  Rules: {}",
            format!("{:.1}", self.report.score()).bold(),
            self.report.headers().len()
        )?;

        if self.report.headers().is_empty() {
            return Ok(());
        }

        writeln!(w)?;
        writeln!(w, "{:>5} {:<24} {}", "pts", "rule name", "description")?;
        writeln!(w, "{:>5} {:<24} {}", "----", "-".repeat(24), "-".repeat(11))?;
        for header in self.report.headers() {
            writeln!(w, "{}", header)?;
        }

        Ok(())
    }
}
