//! The logger facade.
//!
//! A [`Logger`] is a named handle onto a backend. Every severity has the same
//! five entry points:
//!
//! | Method                 | Message source           | Attached error |
//! |------------------------|--------------------------|----------------|
//! | `is_S_enabled()`       | -                        | -              |
//! | `S(template, args)`    | runtime template         | none           |
//! | `S_with(callback)`     | lazily built by callback | none           |
//! | `S_err(e, template, args)` | runtime template     | `e`            |
//! | `S_err_with(e, callback)`  | lazily built by callback | `e`        |
//!
//! Nothing is formatted and no callback runs unless the severity is enabled.
//! None of these methods can fail or panic on account of the message: a bad
//! template or a failing callback produces a warning record instead.

use std::any::type_name;
use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;

use log::Log;

use crate::backend::Backend;
use crate::callback::CallbackResult;
use crate::caller::CallerMode;
use crate::config::FacadeConfig;
use crate::emitter::Emitter;
use crate::level::Severity;

/// Named, level-gated logging handle.
///
/// Cheap to clone; all clones share the same name and backend. A `Logger`
/// holds no mutable state and can be used from any number of threads.
///
/// # Example
///
/// ```
/// use gatelog::Logger;
///
/// let log = Logger::get("billing::invoice");
/// log.info("finalized invoice {} for {}", &[&1042, &"ACME"]);
/// log.debug_with(|| Ok(format!("line items: {:?}", vec![1, 2, 3])));
/// ```
#[derive(Debug, Clone)]
pub struct Logger {
    name: Arc<str>,
    backend: Backend,
    config: FacadeConfig,
}

macro_rules! severity_methods {
    (
        $severity:expr, $label:literal,
        $is_enabled:ident, $fmt:ident, $with:ident, $err:ident, $err_with:ident
    ) => {
        #[doc = concat!("Whether ", $label, " records are enabled for this logger.")]
        #[inline]
        #[must_use]
        pub fn $is_enabled(&self) -> bool {
            self.is_enabled($severity)
        }

        #[doc = concat!("Logs at ", $label, ", applying `args` to `template`.")]
        #[track_caller]
        pub fn $fmt(&self, template: &str, args: &[&dyn Display]) {
            self.log($severity, template, args);
        }

        #[doc = concat!("Logs at ", $label, " with a lazily built message.")]
        ///
        /// The callback only runs when the level is enabled.
        #[track_caller]
        pub fn $with<F>(&self, callback: F)
        where
            F: FnOnce() -> CallbackResult,
        {
            self.log_with($severity, callback);
        }

        #[doc = concat!("Logs `error` at ", $label, ", applying `args` to `template`.")]
        #[track_caller]
        pub fn $err(&self, error: &(dyn Error + 'static), template: &str, args: &[&dyn Display]) {
            self.log_err($severity, error, template, args);
        }

        #[doc = concat!("Logs `error` at ", $label, " with a lazily built message.")]
        #[track_caller]
        pub fn $err_with<F>(&self, error: &(dyn Error + 'static), callback: F)
        where
            F: FnOnce() -> CallbackResult,
        {
            self.log_err_with($severity, error, callback);
        }
    };
}

impl Logger {
    /// Logger named `name`, writing to the global `log` backend with the
    /// process-wide [`FacadeConfig::global`] settings.
    #[must_use]
    pub fn get(name: impl Into<Arc<str>>) -> Self {
        Self::builder(name).build()
    }

    /// Logger named after the fully qualified path of `T`.
    ///
    /// ```
    /// use gatelog::Logger;
    ///
    /// struct Scheduler;
    /// assert!(Logger::of::<Scheduler>().name().ends_with("Scheduler"));
    /// ```
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self::get(type_name::<T>())
    }

    /// Create a logger using the builder pattern.
    #[must_use]
    pub fn builder(name: impl Into<Arc<str>>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    /// The logger name, used as the record target.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backend this logger submits to.
    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// The facade settings this logger was built with.
    #[must_use]
    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Flushes the backend.
    pub fn flush(&self) {
        self.backend.flush();
    }

    /// Whether records at `severity` are enabled. A single backend query.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, severity: Severity) -> bool {
        self.backend.is_loggable(&self.name, severity.as_level())
    }

    /// Logs at `severity`, applying `args` to `template`.
    #[track_caller]
    pub fn log(&self, severity: Severity, template: &str, args: &[&dyn Display]) {
        if self.is_enabled(severity) {
            self.emitter().formatted(severity, None, template, args);
        }
    }

    /// Logs `error` at `severity`, applying `args` to `template`.
    #[track_caller]
    pub fn log_err(
        &self,
        severity: Severity,
        error: &(dyn Error + 'static),
        template: &str,
        args: &[&dyn Display],
    ) {
        if self.is_enabled(severity) {
            self.emitter().formatted(severity, Some(error), template, args);
        }
    }

    /// Logs at `severity` with a message built by `callback`.
    #[track_caller]
    pub fn log_with<F>(&self, severity: Severity, callback: F)
    where
        F: FnOnce() -> CallbackResult,
    {
        if self.is_enabled(severity) {
            self.emitter().lazy(severity, None, callback);
        }
    }

    /// Logs `error` at `severity` with a message built by `callback`.
    ///
    /// If the callback fails, the warning that replaces the message still
    /// carries `error`.
    #[track_caller]
    pub fn log_err_with<F>(&self, severity: Severity, error: &(dyn Error + 'static), callback: F)
    where
        F: FnOnce() -> CallbackResult,
    {
        if self.is_enabled(severity) {
            self.emitter().lazy(severity, Some(error), callback);
        }
    }

    severity_methods!(
        Severity::Trace, "trace",
        is_trace_enabled, trace, trace_with, trace_err, trace_err_with
    );
    severity_methods!(
        Severity::Debug, "debug",
        is_debug_enabled, debug, debug_with, debug_err, debug_err_with
    );
    severity_methods!(
        Severity::Info, "info",
        is_info_enabled, info, info_with, info_err, info_err_with
    );
    severity_methods!(
        Severity::Warn, "warn",
        is_warn_enabled, warn, warn_with, warn_err, warn_err_with
    );
    severity_methods!(
        Severity::Error, "error",
        is_error_enabled, error, error_with, error_err, error_err_with
    );

    // The macros check enablement first and then call these, so an enabled
    // macro emission costs a single backend query.

    #[doc(hidden)]
    #[track_caller]
    pub fn __emit(&self, severity: Severity, template: &str, args: &[&dyn Display]) {
        self.emitter().formatted(severity, None, template, args);
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn __emit_err(
        &self,
        severity: Severity,
        error: &(dyn Error + 'static),
        template: &str,
        args: &[&dyn Display],
    ) {
        self.emitter().formatted(severity, Some(error), template, args);
    }

    fn emitter(&self) -> Emitter<'_> {
        Emitter {
            target: &self.name,
            backend: &self.backend,
            config: &self.config,
        }
    }
}

/// Builder for configuring a [`Logger`].
///
/// # Example
///
/// ```
/// use gatelog::testing::CapturingBackend;
/// use gatelog::{CallerMode, Logger};
///
/// let capture = CapturingBackend::default();
/// let log = Logger::builder("app")
///     .backend(capture.clone().into_log())
///     .caller_mode(CallerMode::Off)
///     .build();
///
/// log.warn("low disk: {}%", &[&7]);
/// capture.assert_contains("low disk: 7%");
/// ```
#[derive(Debug)]
pub struct LoggerBuilder {
    name: Arc<str>,
    backend: Backend,
    config: Option<FacadeConfig>,
    caller_mode: Option<CallerMode>,
}

impl LoggerBuilder {
    /// Create a new builder writing to the global backend.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            backend: Backend::Global,
            config: None,
            caller_mode: None,
        }
    }

    /// Submit to `logger` instead of the global backend.
    #[must_use]
    pub fn backend(mut self, logger: Arc<dyn Log>) -> Self {
        self.backend = Backend::Custom(logger);
        self
    }

    /// Use an explicit backend handle.
    #[must_use]
    pub fn backend_handle(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Use `config` instead of [`FacadeConfig::global`].
    #[must_use]
    pub fn config(mut self, config: FacadeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the call-site resolution strategy.
    #[must_use]
    pub fn caller_mode(mut self, mode: CallerMode) -> Self {
        self.caller_mode = Some(mode);
        self
    }

    /// Finish the logger.
    #[must_use]
    pub fn build(self) -> Logger {
        let mut config = self
            .config
            .unwrap_or_else(|| FacadeConfig::global().clone());
        if let Some(mode) = self.caller_mode {
            config.caller_mode = mode;
        }

        Logger {
            name: self.name,
            backend: self.backend,
            config,
        }
    }
}
