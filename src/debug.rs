//! Log bridge for edgepin.
//!
//! Routes every `log::info!()` etc. to stderr as
//! `[timestamp] [LEVEL] [target] message`, keeping stdout for command output.
//!
//! Level precedence: `--log-level` flag, then `RUST_LOG` (a bare level name),
//! then the settings file, then `warn`. The bridge is installed before the
//! settings file is read and its level is settled once settings are known.

use chrono::Local;
use edgepin_config::LogLevel;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::OnceLock;

/// Writes formatted records to a shared sink.
pub struct LogBridge {
    level: Mutex<LevelFilter>,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl LogBridge {
    pub fn new(level: LevelFilter, sink: Box<dyn Write + Send>) -> Self {
        Self {
            level: Mutex::new(level),
            sink: Mutex::new(sink),
        }
    }

    pub fn set_level(&self, level: LevelFilter) {
        *self.level.lock() = level;
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= *self.level.lock()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );
        let mut sink = self.sink.lock();
        let _ = sink.write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = self.sink.lock().flush();
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

/// Pick the effective level from the flag, `RUST_LOG` value and settings.
pub fn resolve_level(
    cli: Option<LogLevel>,
    rust_log: Option<&str>,
    settings: Option<LogLevel>,
) -> LogLevel {
    cli.or_else(|| rust_log.and_then(LogLevel::from_name))
        .or(settings)
        .unwrap_or_default()
}

/// Install the stderr bridge as the global logger. Later calls are no-ops.
pub fn init_log_bridge(level: LogLevel) {
    let filter = level.to_level_filter();
    let bridge = BRIDGE.get_or_init(|| LogBridge::new(filter, Box::new(std::io::stderr())));
    if log::set_logger(bridge).is_ok() {
        log::set_max_level(filter);
    }
}

/// Change the level of an installed bridge.
pub fn set_log_level(level: LogLevel) {
    if let Some(bridge) = BRIDGE.get() {
        let filter = level.to_level_filter();
        bridge.set_level(filter);
        log::set_max_level(filter);
    }
}
