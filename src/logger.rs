// THEORY:
// The library only ever talks to the `log` facade; this module is the one place
// that decides what a log line looks like. It belongs to the binary's startup:
// `init` is called once, before the runtime exists, and every later record
// from any thread goes through the same `ConsoleLogger`.

use chrono::Utc;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Console backend for the `log` facade: one colored, timestamped line per record.
pub struct ConsoleLogger {
    level: LevelFilter,
}

static LOGGER: std::sync::OnceLock<ConsoleLogger> = std::sync::OnceLock::new();

impl ConsoleLogger {
    fn tag(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m[ERROR]",
            Level::Warn => "\x1b[35m[WARN] ",
            Level::Info => "\x1b[32m[INFO] ",
            Level::Debug => "\x1b[33m[LOG]  ",
            Level::Trace => "\x1b[36m[TRACE]",
        }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        println!(
            "{}[{}]\x1b[0m {}",
            Self::tag(record.level()),
            Utc::now().format("%H:%M:%S"),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Parses a level name such as `"debug"`; unknown names fall back to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}

/// Installs the console logger. Only the first call has any effect.
pub fn init(level: LevelFilter) {
    let logger = LOGGER.get_or_init(|| ConsoleLogger { level });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn records_above_the_level_are_disabled() {
        let logger = ConsoleLogger { level: LevelFilter::Warn };
        let warn = Metadata::builder().level(Level::Warn).build();
        let info = Metadata::builder().level(Level::Info).build();
        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&info));
    }
}
