//! CLI argument definitions using clap derive macros
//!
//! Defines the command tree for the `sareport` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// SpamAssassin report tooling.
#[derive(Parser, Debug)]
#[command(name = "sareport", version, about, long_about = None)]
pub struct Cli {
    /// Path to sareport.toml configuration file.
    #[arg(short, long, global = true, default_value = "sareport.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a single SpamAssassin report and print the result.
    Parse(ParseArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- parse ----

/// Run one report through the processor.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Report file to parse.
    pub file: PathBuf,
}

// ---- config ----

/// Manage sareport configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, pipeline, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}
