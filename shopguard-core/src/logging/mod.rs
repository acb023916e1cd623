//! Shopguard logging
//!
//! Built on the standard `log` crate: library code uses `log::info!` and
//! friends, and binaries call [`init_logging`] once at startup to install a
//! structured logger writing JSON, human-readable or logfmt lines.
//!
//! # Example
//!
//! ```rust,no_run
//! use shopguard_core::logging::{LoggingConfig, LogLevel};
//!
//! let config = LoggingConfig::production().with_context_field("service", "admin-dashboard");
//! shopguard_core::logging::init_logging(&config).unwrap();
//!
//! log::info!("Permission guard ready");
//! ```

pub mod config;
pub mod entry;
pub mod formatter;

pub use config::{LogLevel, LogOutput, LoggingConfig};
pub use entry::LogEntry;
pub use formatter::LogFormat;

use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install the Shopguard logger
///
/// Safe to call more than once; only the first call takes effect. Fails if
/// another logger was installed first.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = log::set_boxed_logger(Box::new(ShopguardLogger::new(config.clone())))
            .map(|()| log::set_max_level(config.level.to_level_filter()))
            .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e));
    });
    result
}

/// `log::Log` implementation formatting entries per [`LoggingConfig`]
struct ShopguardLogger {
    config: LoggingConfig,
}

impl ShopguardLogger {
    fn new(config: LoggingConfig) -> Self {
        Self { config }
    }
}

impl log::Log for ShopguardLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.config.level.to_level_filter()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_log_record(record, &self.config);
        let line = self.config.format.format_entry(&entry);

        // A logger has nowhere to report its own write failures
        let _ = match self.config.output {
            LogOutput::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            LogOutput::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        };
    }

    fn flush(&self) {
        let _ = match self.config.output {
            LogOutput::Stdout => std::io::stdout().flush(),
            LogOutput::Stderr => std::io::stderr().flush(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_init_logging_installs_once() {
        let config = LoggingConfig::default().with_level(LogLevel::Warn);

        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&LoggingConfig::development()).is_ok());
        assert_eq!(log::max_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_logger_respects_level() {
        let logger = ShopguardLogger::new(LoggingConfig::default().with_level(LogLevel::Warn));

        let warn = log::Metadata::builder().level(log::Level::Warn).target("shopguard").build();
        let debug = log::Metadata::builder().level(log::Level::Debug).target("shopguard").build();

        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&debug));
    }
}
