//! CapturingBackend for recording submitted log records in tests
//!
//! The backend answers enablement queries from a configurable level but
//! stores every record handed to [`Log::log`] without filtering, so tests can
//! observe exactly what the facade submitted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::kv::Key;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::emitter::{CALLER_FUNCTION_KEY, ERROR_KEY};
use crate::level::Severity;

/// A record as seen by the backend, detached from its borrowed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Display text of the attached error, if any.
    pub error: Option<String>,
    /// Display text of the attached error's `source()` chain.
    pub error_chain: Vec<String>,
    pub module_path: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Resolved caller function, when the caller mode reports one.
    pub function: Option<String>,
}

impl CapturedRecord {
    fn from_record(record: &Record<'_>) -> Self {
        let kvs = record.key_values();
        let error = kvs.get(Key::from(ERROR_KEY));

        let mut error_chain = Vec::new();
        if let Some(mut source) = error.as_ref().and_then(|v| v.to_borrowed_error()?.source()) {
            loop {
                error_chain.push(source.to_string());
                match source.source() {
                    Some(next) => source = next,
                    None => break,
                }
            }
        }

        Self {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            error: error.map(|v| v.to_string()),
            error_chain,
            module_path: record.module_path().map(str::to_string),
            file: record.file().map(str::to_string),
            line: record.line(),
            function: kvs.get(Key::from(CALLER_FUNCTION_KEY)).map(|v| v.to_string()),
        }
    }

    /// The record's level as a facade severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::from(self.level)
    }
}

#[derive(Debug)]
struct Inner {
    enabled: Mutex<LevelFilter>,
    queries: AtomicUsize,
    records: Mutex<Vec<CapturedRecord>>,
}

/// A `log` backend that captures records in memory.
///
/// Cloning shares the same buffer, so one clone can be handed to a
/// [`Logger`](crate::Logger) while another is used for assertions.
#[derive(Debug, Clone)]
pub struct CapturingBackend {
    inner: Arc<Inner>,
}

impl Default for CapturingBackend {
    fn default() -> Self {
        Self::new(Level::Trace)
    }
}

impl CapturingBackend {
    /// Create a backend enabling `level` and everything more severe.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self::with_filter(level.to_level_filter())
    }

    /// Create a backend with an explicit filter (`LevelFilter::Off` disables
    /// every level).
    #[must_use]
    pub fn with_filter(filter: LevelFilter) -> Self {
        Self {
            inner: Arc::new(Inner {
                enabled: Mutex::new(filter),
                queries: AtomicUsize::new(0),
                records: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Change the enabled level for subsequent queries.
    pub fn set_filter(&self, filter: LevelFilter) {
        if let Ok(mut enabled) = self.inner.enabled.lock() {
            *enabled = filter;
        }
    }

    fn filter(&self) -> LevelFilter {
        self.inner
            .enabled
            .lock()
            .map(|f| *f)
            .unwrap_or(LevelFilter::Off)
    }

    /// Share this backend as a `log` trait object.
    #[must_use]
    pub fn into_log(self) -> Arc<dyn Log> {
        Arc::new(self)
    }

    /// All captured records, in submission order.
    #[must_use]
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.inner
            .records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of captured records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times [`Log::enabled`] has been asked.
    #[must_use]
    pub fn enabled_queries(&self) -> usize {
        self.inner.queries.load(Ordering::Relaxed)
    }

    /// Number of captured records at `level`.
    #[must_use]
    pub fn count_at(&self, level: Level) -> usize {
        self.inner
            .records
            .lock()
            .map(|r| r.iter().filter(|rec| rec.level == level).count())
            .unwrap_or(0)
    }

    /// Drop all captured records.
    pub fn clear(&self) {
        if let Ok(mut records) = self.inner.records.lock() {
            records.clear();
        }
    }

    /// Check if any captured message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|r| r.message.contains(needle))
    }

    /// Assert that some captured message contains `needle`.
    ///
    /// # Panics
    ///
    /// Panics if no captured message contains the needle string.
    pub fn assert_contains(&self, needle: &str) {
        assert!(
            self.contains(needle),
            "No record contained '{}'. Captured messages:\n{}",
            needle,
            self.records()
                .iter()
                .map(|r| format!("[{}] {}", r.level, r.message))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

impl Log for CapturingBackend {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner.queries.fetch_add(1, Ordering::Relaxed);
        metadata.level() <= self.filter()
    }

    fn log(&self, record: &Record<'_>) {
        let captured = CapturedRecord::from_record(record);
        if let Ok(mut records) = self.inner.records.lock() {
            records.push(captured);
        }
    }

    fn flush(&self) {}
}
