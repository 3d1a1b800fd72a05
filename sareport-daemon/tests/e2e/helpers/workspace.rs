//! Temporary workspace for E2E tests.
//!
//! Provides [`TestWorkspace`], a temp directory holding the input, result and
//! archive directories plus a matching `SaReportConfig`.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sareport_core::config::SaReportConfig;
use sareport_daemon::orchestrator::Orchestrator;

/// Poll period used by E2E runs.
#[allow(dead_code)]
pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Temp directory tree with a config pointing into it.
///
/// The input directory exists up front; result and archive directories are
/// left for the pipeline to create.
#[allow(dead_code)]
pub struct TestWorkspace {
    dir: tempfile::TempDir,
    /// Config for this workspace (metrics disabled, pretty logs).
    pub config: SaReportConfig,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new workspace with default pipeline settings.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let mut config = SaReportConfig::default();
        config.general.log_format = "pretty".to_owned();
        config.pipeline.input_dir = dir.path().join("input").to_string_lossy().into_owned();
        config.pipeline.result_dir = dir.path().join("result").to_string_lossy().into_owned();
        config.pipeline.archive_dir = dir.path().join("archive").to_string_lossy().into_owned();
        std::fs::create_dir_all(&config.pipeline.input_dir).expect("should create input dir");

        Self { dir, config }
    }

    /// Deliver parse errors on the error channel.
    pub fn receive_errors(mut self, enabled: bool) -> Self {
        self.config.pipeline.receive_errors = enabled;
        self
    }

    /// Set the processor channel buffer size.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.pipeline.buffer_size = size;
        self
    }

    /// Root of the temp tree.
    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn input(&self, name: &str) -> PathBuf {
        PathBuf::from(&self.config.pipeline.input_dir).join(name)
    }

    pub fn result(&self, name: &str) -> PathBuf {
        PathBuf::from(&self.config.pipeline.result_dir).join(name)
    }

    pub fn archive(&self, name: &str) -> PathBuf {
        PathBuf::from(&self.config.pipeline.archive_dir).join(name)
    }

    /// Write a report file into the input directory.
    pub fn write_report(&self, name: &str, content: &str) {
        std::fs::write(self.input(name), content).expect("should write report");
    }

    /// Build an orchestrator and run it until the returned token is cancelled.
    pub fn start(&self) -> (CancellationToken, JoinHandle<anyhow::Result<()>>) {
        let orchestrator = Orchestrator::build_from_config(self.config.clone())
            .expect("orchestrator should build")
            .with_poll_interval(TEST_POLL_INTERVAL);
        let token = CancellationToken::new();
        let handle = tokio::spawn(orchestrator.run_until(cancelled(token.clone())));
        (token, handle)
    }
}

/// Shutdown future resolving when `token` is cancelled.
#[allow(dead_code)]
pub fn cancelled(token: CancellationToken) -> impl Future<Output = anyhow::Result<&'static str>> {
    async move {
        token.cancelled().await;
        Ok("test")
    }
}
