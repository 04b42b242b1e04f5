// csvstrip/src/logger.rs
//! Logger setup for the csvstrip binary. Logs go to stderr so output files
//! and piped stdout stay clean.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes `env_logger`.
///
/// `Some(level)` forces that level for every target; `None` honors `RUST_LOG`
/// and falls back to `info`. Calling it twice is harmless: the second call
/// leaves the first logger in place.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None);
    let _ = builder.try_init();
}

/// Picks the log level from the global flags. `--quiet` wins over `--debug`.
pub fn level_for(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_overrides_debug() {
        assert_eq!(level_for(true, true), Some(LevelFilter::Off));
        assert_eq!(level_for(false, true), Some(LevelFilter::Debug));
        assert_eq!(level_for(false, false), None);
    }
}
