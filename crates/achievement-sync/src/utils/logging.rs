//! Logging setup for the command line entry point.
//!
//! Library code only talks to the `log` facade; installing a logger is left to
//! the binary (or to tests through `env_logger::builder().is_test(true)`).

use log::LevelFilter;

/// Install `env_logger` at `level`, unless `RUST_LOG` is set.
///
/// Calling it more than once is harmless.
pub fn init_logging(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    } else {
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("achievement_sync", level)
            .filter_module("rcheevos_api", level);
    }

    builder.format_timestamp_millis();
    if builder.try_init().is_err() {
        log::debug!("[ra-sync] Logger already initialized");
    }
}

/// Map the repeated `-v` flag onto a level
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
