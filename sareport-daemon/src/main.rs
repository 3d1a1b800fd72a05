use anyhow::Result;
use clap::Parser;

use sareport_core::config::SaReportConfig;
use sareport_daemon::cli::DaemonCli;
use sareport_daemon::logging;
use sareport_daemon::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 로드: 파일(있으면) -> 환경변수 -> CLI 인자
    let mut config = match &cli.config {
        Some(path) => SaReportConfig::load(path).await,
        None => SaReportConfig::from_env(),
    }
    .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sareport-daemon starting");

    let orchestrator = Orchestrator::build_from_config(config)?;
    let result = orchestrator.run().await;

    match &result {
        Ok(()) => tracing::info!("sareport-daemon shut down"),
        Err(e) => tracing::error!(error = %e, "sareport-daemon stopped with error"),
    }
    result
}
