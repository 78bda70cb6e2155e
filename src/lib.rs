//! apod-desktop - APOD image cache
//!
//! Downloads NASA's Astronomy Picture of the Day for a date, stores it in a
//! local content-addressed cache (SHA-256 dedup, SQLite metadata) and sets
//! it as the desktop background.

pub mod background;
pub mod cache;
pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod logging;
pub mod provider;

use anyhow::{Context, Result};

use crate::background::{BackgroundSetter, DesktopBackground};
use crate::cache::{CacheManager, CacheRecord};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::{ApodError, ExitCode};
use crate::provider::NasaClient;

/// Run one invocation: resolve the date, cache its APOD, report the record
/// and apply it as the background.
///
/// # Errors
///
/// Returns an error wrapping [`ApodError`] for invalid dates, provider
/// failures and storage failures. Nothing is cached for the date in that
/// case and the background is left unchanged.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load();
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = Some(dir);
    }
    if let Some(key) = cli.api_key {
        config.api_key = key;
    }
    if cli.no_background {
        config.set_background = false;
    }

    // Reject bad dates before the cache is touched
    let date = match cli.date.as_deref() {
        Some(input) => date::parse_apod_date(input, date::today()).map_err(ApodError::from)?,
        None => date::today(),
    };

    let settings = config.cache_settings()?;
    let provider = NasaClient::new(config.provider_settings()).map_err(ApodError::from)?;
    let mut cache = CacheManager::open(&settings, provider).map_err(ApodError::from)?;

    if cli.list {
        for title in cache.list_titles().map_err(ApodError::from)? {
            println!("{}", title);
        }
        cache.close().map_err(ApodError::from)?;
        return Ok(ExitCode::Success);
    }

    let id = if cli.offline {
        cache.lookup_date(date).map_err(ApodError::from)?
    } else {
        Some(cache.add_to_cache(date)?)
    };

    let record = cache.get_info(id).map_err(ApodError::from)?;
    cache.close().map_err(ApodError::from)?;

    if !record.is_available() {
        log::warn!("No cached APOD for {}", date);
        return Ok(ExitCode::NotCached);
    }

    print_record(&record, cli.output)?;

    if config.set_background {
        DesktopBackground
            .apply(&record.file_path)
            .context("Failed to set the desktop background")?;
    }

    Ok(ExitCode::Success)
}

fn print_record(record: &CacheRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("APOD title: {}", record.title);
            println!("APOD file path: {}", record.file_path.display());
            println!("APOD SHA-256: {}", record.hash);
            if !record.explanation.is_empty() {
                println!();
                println!("{}", record.explanation);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
    }
    Ok(())
}
