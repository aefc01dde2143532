//! Handle to the logging backend a facade writes to.
//!
//! The backend is whatever implements [`log::Log`]. A [`Backend`] is
//! obtained once when a [`Logger`](crate::Logger) is built and only ever used
//! for two read-only operations: the enablement query and record submission.
//! Both are the backend's responsibility to make thread-safe.

use std::fmt;
use std::sync::Arc;

use log::{Level, Log, Metadata, Record};

/// The logger a facade submits records to.
#[derive(Clone, Default)]
pub enum Backend {
    /// The process-wide logger installed with `log::set_logger`.
    #[default]
    Global,
    /// An explicitly injected logger.
    Custom(Arc<dyn Log>),
}

impl Backend {
    /// Wraps an owned logger.
    #[must_use]
    pub fn custom(logger: impl Log + 'static) -> Self {
        Backend::Custom(Arc::new(logger))
    }

    /// Whether `level` is enabled for `target`.
    ///
    /// For the global logger the static `log::max_level()` gate is checked
    /// first, matching what the `log` macros do.
    #[inline]
    pub fn is_loggable(&self, target: &str, level: Level) -> bool {
        let metadata = Metadata::builder().level(level).target(target).build();
        match self {
            Backend::Global => level <= log::max_level() && log::logger().enabled(&metadata),
            Backend::Custom(logger) => logger.enabled(&metadata),
        }
    }

    /// Hands a finished record to the backend.
    #[inline]
    pub fn submit(&self, record: &Record<'_>) {
        match self {
            Backend::Global => log::logger().log(record),
            Backend::Custom(logger) => logger.log(record),
        }
    }

    /// Flushes buffered records, if the backend buffers.
    pub fn flush(&self) {
        match self {
            Backend::Global => log::logger().flush(),
            Backend::Custom(logger) => logger.flush(),
        }
    }
}

impl From<Arc<dyn Log>> for Backend {
    fn from(logger: Arc<dyn Log>) -> Self {
        Backend::Custom(logger)
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Global => f.write_str("Backend::Global"),
            Backend::Custom(_) => f.write_str("Backend::Custom(..)"),
        }
    }
}
