//! CLI argument definitions for sareport-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use sareport_core::config::SaReportConfig;

/// SpamAssassin report processing daemon.
///
/// Watches an input directory for report files, parses each one,
/// writes the result as JSON and moves the source into an archive directory.
#[derive(Parser, Debug, Default)]
#[command(name = "sareport-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to sareport.toml configuration file.
    ///
    /// Without it, built-in defaults plus environment overrides are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the watched input directory.
    #[arg(long)]
    pub input_dir: Option<String>,

    /// Override the directory JSON results are written to.
    #[arg(long)]
    pub result_dir: Option<String>,

    /// Override the directory processed reports are moved to.
    #[arg(long)]
    pub archive_dir: Option<String>,

    /// Deliver parse errors on the error channel instead of only logging them in the processor.
    #[arg(long)]
    pub receive_errors: bool,

    /// Validate configuration and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Apply command-line overrides on top of a loaded configuration.
    ///
    /// The caller is expected to validate the result again.
    pub fn apply_overrides(&self, config: &mut SaReportConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(dir) = &self.input_dir {
            config.pipeline.input_dir = dir.clone();
        }
        if let Some(dir) = &self.result_dir {
            config.pipeline.result_dir = dir.clone();
        }
        if let Some(dir) = &self.archive_dir {
            config.pipeline.archive_dir = dir.clone();
        }
        if self.receive_errors {
            config.pipeline.receive_errors = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = DaemonCli::try_parse_from([
            "sareport-daemon",
            "--config",
            "/etc/sareport.toml",
            "--log-level",
            "debug",
            "--log-format",
            "pretty",
            "--input-dir",
            "/data/in",
            "--result-dir",
            "/data/out",
            "--archive-dir",
            "/data/archive",
            "--receive-errors",
            "--validate",
        ])
        .expect("all flags should parse");

        assert_eq!(cli.config, Some(PathBuf::from("/etc/sareport.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.receive_errors);
        assert!(cli.validate);
    }

    #[test]
    fn no_flags_keeps_config_untouched() {
        let cli = DaemonCli::try_parse_from(["sareport-daemon"]).unwrap();
        let mut config = SaReportConfig::default();
        cli.apply_overrides(&mut config);

        let defaults = SaReportConfig::default();
        assert_eq!(config.pipeline.input_dir, defaults.pipeline.input_dir);
        assert_eq!(config.general.log_level, defaults.general.log_level);
        assert!(!config.pipeline.receive_errors);
    }

    #[test]
    fn overrides_take_precedence() {
        let cli = DaemonCli {
            log_format: Some("pretty".to_owned()),
            input_dir: Some("/in".to_owned()),
            result_dir: Some("/out".to_owned()),
            archive_dir: Some("/archive".to_owned()),
            receive_errors: true,
            ..Default::default()
        };
        let mut config = SaReportConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.pipeline.input_dir, "/in");
        assert_eq!(config.pipeline.result_dir, "/out");
        assert_eq!(config.pipeline.archive_dir, "/archive");
        assert!(config.pipeline.receive_errors);
    }
}
