//! Pipeline orchestration -- assembly, channel wiring, and lifecycle management.
//!
//! The [`Orchestrator`] builds the [`Processor`] from configuration and runs
//! the four pipeline tasks until shutdown:
//!
//! ```text
//! DirectoryPoller --names--> Dispatcher --ReportSource--> Processor --> Consumer
//! ```
//!
//! # Shutdown Order
//!
//! On SIGTERM/SIGINT:
//!
//! 1. Cancel the shared token (poller, dispatcher and consumer stop)
//! 2. Close the processor input
//! 3. Await the processor loop
//! 4. Await the remaining tasks
//!
//! If the poller stops because the input directory can no longer be listed,
//! discovery ends but reports already submitted are still processed and
//! archived before `run` returns the listing error.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sareport_core::config::SaReportConfig;
use sareport_pipeline::channel;
use sareport_pipeline::collector::DEFAULT_POLL_INTERVAL;
use sareport_pipeline::{
    Consumer, DirectoryPoller, Dispatcher, PollerConfig, Processor, ProcessorConfig,
    ReportPipelineError,
};

use crate::metrics_server;

/// Handles of the running pipeline tasks.
struct PipelineTasks {
    poller: JoinHandle<Result<(), ReportPipelineError>>,
    dispatcher: JoinHandle<()>,
    processor: JoinHandle<Result<(), ReportPipelineError>>,
    consumer: JoinHandle<()>,
}

/// Why the main loop stopped waiting.
enum StopReason {
    Signal(Result<&'static str>),
    Poller(std::result::Result<Result<(), ReportPipelineError>, tokio::task::JoinError>),
}

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: SaReportConfig,
    /// Shared report processor.
    processor: Arc<Processor>,
    /// Cancels every pipeline task.
    cancel: CancellationToken,
    /// Directory poll period.
    poll_interval: Duration,
}

impl Orchestrator {
    /// Load configuration from `config_path` and build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read, parsed or validated.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = SaReportConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config)
    }

    /// Build from an already-loaded configuration.
    ///
    /// Installs the metrics recorder when `[metrics]` is enabled.
    pub fn build_from_config(config: SaReportConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
            tracing::info!(port = config.metrics.port, "metrics endpoint enabled");
        }

        let processor_config = ProcessorConfig::from_core(&config.pipeline);
        tracing::debug!(?processor_config, "creating processor");
        let processor = Arc::new(Processor::new(processor_config));

        Ok(Self {
            config,
            processor,
            cancel: CancellationToken::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Override the directory poll period.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &SaReportConfig {
        &self.config
    }

    /// Run until SIGTERM or SIGINT is received.
    pub async fn run(self) -> Result<()> {
        self.run_until(wait_for_shutdown_signal()).await
    }

    /// Run until `shutdown` resolves or the poller fails.
    ///
    /// `shutdown` yields the name of the trigger for logging.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = Result<&'static str>>,
    {
        let mut tasks = self.spawn_pipeline().await?;

        tracing::info!("entering main loop");
        let reason = tokio::select! {
            signal = shutdown => StopReason::Signal(signal),
            joined = &mut tasks.poller => StopReason::Poller(joined),
        };

        match reason {
            StopReason::Signal(signal) => {
                match &signal {
                    Ok(name) => tracing::info!(signal = name, "shutdown signal received"),
                    Err(e) => tracing::error!(error = %e, "shutdown signal handling failed"),
                }
                self.shutdown(tasks).await;
                signal.map(|_| ())
            }
            StopReason::Poller(joined) => {
                let err = match joined {
                    Ok(Ok(())) => anyhow::anyhow!("directory poller stopped unexpectedly"),
                    Ok(Err(e)) => anyhow::anyhow!("directory poller failed: {}", e),
                    Err(e) => anyhow::anyhow!("directory poller task failed: {}", e),
                };
                tracing::error!(error = %err, "report discovery stopped, draining pipeline");
                self.drain(tasks).await;
                Err(err)
            }
        }
    }

    /// Spawn poller, dispatcher, processor and consumer tasks.
    async fn spawn_pipeline(&self) -> Result<PipelineTasks> {
        let pipeline = &self.config.pipeline;

        tokio::fs::create_dir_all(&pipeline.input_dir)
            .await
            .map_err(|e| {
                anyhow::anyhow!("failed to create input dir '{}': {}", pipeline.input_dir, e)
            })?;

        let results = self.processor.results();
        let errors = self.processor.errors();
        let (names_tx, names_rx) = channel::channel(0);

        let processor = Arc::clone(&self.processor);
        let cancel = self.cancel.clone();
        let processor_task = tokio::spawn(async move { processor.process(cancel).await });

        let consumer = Consumer::from_core(pipeline);
        let cancel = self.cancel.clone();
        let consumer_task = tokio::spawn(async move { consumer.run(results, errors, cancel).await });

        let dispatcher = Dispatcher::new(&pipeline.input_dir, self.processor.input());
        let dispatcher_task = tokio::spawn(dispatcher.run(names_rx, self.cancel.clone()));

        let poller_config = PollerConfig::from_core(pipeline).with_interval(self.poll_interval);
        let cancel = self.cancel.clone();
        let poller_task = tokio::spawn(async move {
            DirectoryPoller::new(poller_config)
                .run(names_tx, cancel)
                .await
        });

        tracing::info!(
            input_dir = %pipeline.input_dir,
            result_dir = %pipeline.result_dir,
            archive_dir = %pipeline.archive_dir,
            "pipeline started"
        );

        Ok(PipelineTasks {
            poller: poller_task,
            dispatcher: dispatcher_task,
            processor: processor_task,
            consumer: consumer_task,
        })
    }

    /// Hard stop: cancel, close input, await processor, then the rest.
    async fn shutdown(&self, tasks: PipelineTasks) {
        tracing::info!("stopping pipeline");
        self.cancel.cancel();
        self.processor.close();

        await_processor(tasks.processor).await;
        await_task("dispatcher", tasks.dispatcher).await;
        await_task("consumer", tasks.consumer).await;
        match tasks.poller.await {
            Ok(Err(e)) => tracing::warn!(error = %e, "directory poller ended with error"),
            Err(e) => tracing::error!(error = %e, "directory poller task panicked"),
            Ok(Ok(())) => {}
        }
        tracing::info!("pipeline stopped");
    }

    /// Discovery is gone: let submitted reports finish, then stop.
    async fn drain(&self, tasks: PipelineTasks) {
        // dispatcher ends once its hand-off channel closes and submissions complete
        await_task("dispatcher", tasks.dispatcher).await;
        self.processor.close();
        await_processor(tasks.processor).await;
        await_task("consumer", tasks.consumer).await;
        self.cancel.cancel();
        tracing::info!("pipeline drained");
    }
}

async fn await_processor(task: JoinHandle<Result<(), ReportPipelineError>>) {
    match task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "processor loop failed"),
        Err(e) => tracing::error!(error = %e, "processor task panicked"),
    }
}

async fn await_task(name: &'static str, task: JoinHandle<()>) {
    if let Err(e) = task.await {
        tracing::error!(task = name, error = %e, "pipeline task panicked");
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}
