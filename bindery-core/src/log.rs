//! Progress and diagnostic output

use std::fmt;
use std::sync::Arc;

/// Severity passed to a custom sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
}

/// Callback receiving pipeline messages
pub type LogSink = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Where pipeline messages go, chosen once per generator
#[derive(Clone, Default)]
pub enum Verbosity {
    /// No output at all
    #[default]
    Silent,

    /// `tracing` events under the `bindery_core` target
    Default,

    /// Caller-supplied sink
    Custom(LogSink),
}

impl Verbosity {
    /// Wrap a closure as a custom sink
    pub fn custom<F>(sink: F) -> Self
    where
        F: Fn(LogLevel, &str) + Send + Sync + 'static,
    {
        Verbosity::Custom(Arc::new(sink))
    }
}

impl From<bool> for Verbosity {
    fn from(verbose: bool) -> Self {
        if verbose {
            Verbosity::Default
        } else {
            Verbosity::Silent
        }
    }
}

impl fmt::Debug for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verbosity::Silent => f.write_str("Silent"),
            Verbosity::Default => f.write_str("Default"),
            Verbosity::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Handle passed down the call chain
#[derive(Debug, Clone, Default)]
pub struct Logger {
    verbosity: Verbosity,
}

impl Logger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Warn, message.as_ref());
    }

    fn emit(&self, level: LogLevel, message: &str) {
        match &self.verbosity {
            Verbosity::Silent => {}
            Verbosity::Default => match level {
                LogLevel::Info => tracing::info!("{}", message),
                LogLevel::Warn => tracing::warn!("{}", message),
            },
            Verbosity::Custom(sink) => sink(level, message),
        }
    }
}
