//! Logging for apod-desktop.
//!
//! Uses the `log` facade with an `env_logger` backend. The level comes from,
//! in priority order:
//!
//! 1. `RUST_LOG` (if set)
//! 2. `--quiet` (errors only) or `--verbose` (`-v` debug, `-vv` trace)
//! 3. Info by default
//!
//! Cache progress ("APOD SHA-256: ...", "Saved image file as ...") is
//! reported at info level, so the default run narrates each step while
//! `-q` leaves only failures.
//!
//! ```rust,no_run
//! use apod_desktop::logging::init_logging;
//!
//! init_logging(1, false); // debug
//! log::debug!("Opened metadata store");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logger from CLI verbosity flags.
///
/// # Panics
///
/// Panics if a logger was already installed for this process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var_os("RUST_LOG").is_some();
    let level = level_for(verbose, quiet);

    let mut builder = Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
    }
    configure_format(&mut builder, verbose > 0);
    builder.init();

    if from_env {
        log::debug!("Log filter taken from RUST_LOG");
    } else {
        log::debug!("Logging initialized at level {}", level);
    }
}

/// Map CLI flags to a level; quiet wins over verbose.
fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, with_module: bool) {
    // Debug builds: timestamp, plus module path when verbose
    #[cfg(debug_assertions)]
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        let timestamp = buf.timestamp_seconds();
        if with_module {
            writeln!(
                buf,
                "{timestamp} {style}{:<5}{style:#} [{}] {}",
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{timestamp} {style}{:<5}{style:#} {}",
                record.level(),
                record.args()
            )
        }
    });

    // Release builds: level and message only
    #[cfg(not(debug_assertions))]
    {
        let _ = with_module;
        builder.format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
        });
    }
}
