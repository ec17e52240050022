//! Diagnostic logger injected into a `Configuration`.
//!
//! The default logger discards everything. A tracing logger forwards to the
//! `tracing` macros (and so to whatever subscriber the binary installed), and
//! an optional callback sink lets embedding code capture messages directly.

use serde_json::Value;
use std::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};
use tracing::Level;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Sentinel stored in the filter when nothing should be logged.
const OFF: u8 = u8::MAX;

/// Atomic minimum-level filter shared between logger clones.
pub struct LogLevelFilter(AtomicU8);

impl LogLevelFilter {
    /// Create a filter passing `level` and above.
    pub fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    /// Create a filter that passes nothing.
    pub fn off() -> Self {
        Self(AtomicU8::new(OFF))
    }

    /// Current minimum level, `None` when off.
    pub fn get(&self) -> Option<LogLevel> {
        u8_to_level(self.0.load(Ordering::Relaxed))
    }

    /// Set the minimum level, `None` to turn logging off.
    pub fn set(&self, level: Option<LogLevel>) {
        self.0
            .store(level.map_or(OFF, |l| l as u8), Ordering::Relaxed);
    }

    /// Check if a message at the given level should be logged.
    pub fn should_log(&self, level: LogLevel) -> bool {
        let min = self.0.load(Ordering::Relaxed);
        min != OFF && level as u8 >= min
    }
}

impl Default for LogLevelFilter {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

fn u8_to_level(val: u8) -> Option<LogLevel> {
    match val {
        0 => Some(LogLevel::Debug),
        1 => Some(LogLevel::Info),
        2 => Some(LogLevel::Warning),
        3 => Some(LogLevel::Error),
        _ => None,
    }
}

/// Convert a [`LogLevel`] to the tracing level it is emitted at.
pub fn log_level_to_tracing(level: LogLevel) -> Level {
    match level {
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warning => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Callback receiving every message that passes the filter.
pub type LogSink = Arc<dyn Fn(LogLevel, &str, Option<&Value>) + Send + Sync>;

/// Logger handed to a `Configuration` at construction.
#[derive(Clone)]
pub struct Logger {
    /// Forward to tracing.
    tracing: bool,
    /// Extra callback sink (optional).
    sink: Option<LogSink>,
    /// Minimum level to log.
    level_filter: Arc<LogLevelFilter>,
    /// Logger name/category.
    name: Option<String>,
}

impl Logger {
    /// A logger that discards every message.
    pub fn null() -> Self {
        Self {
            tracing: false,
            sink: None,
            level_filter: Arc::new(LogLevelFilter::off()),
            name: None,
        }
    }

    /// A logger forwarding to `tracing` at debug level and above.
    pub fn tracing() -> Self {
        Self {
            tracing: true,
            sink: None,
            level_filter: Arc::new(LogLevelFilter::default()),
            name: None,
        }
    }

    /// Add a callback sink. A null logger starts passing debug and above.
    pub fn with_sink(mut self, sink: LogSink) -> Self {
        if self.level_filter.get().is_none() {
            self.level_filter = Arc::new(LogLevelFilter::default());
        }
        self.sink = Some(sink);
        self
    }

    /// Set the level filter.
    pub fn with_level_filter(mut self, filter: Arc<LogLevelFilter>) -> Self {
        self.level_filter = filter;
        self
    }

    /// Set the logger name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Log a message to all configured endpoints.
    pub fn log(&self, level: LogLevel, message: &str, data: Option<Value>) {
        if !self.level_filter.should_log(level) {
            return;
        }

        if self.tracing {
            let name = self.name.as_deref().unwrap_or("config");
            let data = data.as_ref().map(Value::to_string).unwrap_or_default();
            match log_level_to_tracing(level) {
                Level::ERROR => tracing::error!(logger = %name, severity = %level, data = %data, "{}", message),
                Level::WARN => tracing::warn!(logger = %name, severity = %level, data = %data, "{}", message),
                Level::INFO => tracing::info!(logger = %name, severity = %level, data = %data, "{}", message),
                Level::DEBUG => tracing::debug!(logger = %name, severity = %level, data = %data, "{}", message),
                Level::TRACE => tracing::trace!(logger = %name, severity = %level, data = %data, "{}", message),
            }
        }

        if let Some(ref sink) = self.sink {
            sink(level, message, data.as_ref());
        }
    }

    /// Log a message with structured data.
    pub fn log_with_data(&self, level: LogLevel, message: &str, data: Value) {
        self.log(level, message, Some(data));
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg, None);
    }

    /// Log an info message.
    pub fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg, None);
    }

    /// Log a warning message.
    pub fn warning(&self, msg: &str) {
        self.log(LogLevel::Warning, msg, None);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("tracing", &self.tracing)
            .field("sink", &self.sink.is_some())
            .field("level", &self.level_filter.get())
            .field("name", &self.name)
            .finish()
    }
}
