//! Stderr backend for the `log` facade.
//!
//! Level is taken from the `SPINDLE_LOG` environment variable:
//! `off`, `error`, `warn`, `info`, `debug` or `trace` (any case).
//! Unset, empty or unrecognised values mean `warn`.

use std::env;
use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

pub const LEVEL_VAR: &str = "SPINDLE_LOG";
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Map a `SPINDLE_LOG` value to a level filter.
pub fn parse_level(value: Option<&str>) -> LevelFilter {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_LEVEL,
        Some(v) => v.parse().unwrap_or(DEFAULT_LEVEL),
    }
}

/// Install the logger at the level named by `SPINDLE_LOG`.
///
/// Installing twice is harmless; the second call only resets the level.
pub fn init() -> LevelFilter {
    let level = parse_level(env::var(LEVEL_VAR).ok().as_deref());
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
    level
}

/// Raise the level to at least `level`, never lowering it.
pub fn raise_to(level: LevelFilter) {
    if level > log::max_level() {
        log::set_max_level(level);
    }
}
