//! Command-line interface definitions for apod-desktop.
//!
//! # Example
//!
//! ```bash
//! # Cache today's APOD and set it as the background
//! apod-desktop
//!
//! # A specific date, JSON output, without touching the background
//! apod-desktop 2022-05-01 --output json --no-background
//!
//! # Reuse a previously cached date without network access
//! apod-desktop 2022-05-01 --offline
//!
//! # List every cached title
//! apod-desktop --list
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Cache NASA's Astronomy Picture of the Day and set it as the desktop background.
#[derive(Debug, Parser)]
#[command(name = "apod-desktop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// APOD date (format: YYYY-MM-DD), defaults to today
    #[arg(value_name = "DATE")]
    pub date: Option<String>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Cache directory (overrides the configured one)
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// APOD API key
    #[arg(long, value_name = "KEY", env = "APOD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Only look the date up in the cache, never contact the provider
    #[arg(long)]
    pub offline: bool,

    /// Do not change the desktop background
    #[arg(long)]
    pub no_background: bool,

    /// Print the titles of all cached APODs and exit
    #[arg(long, conflicts_with_all = ["date", "offline"])]
    pub list: bool,

    /// Output format for the cached record
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for the cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// A JSON object
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
