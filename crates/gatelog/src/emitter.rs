//! Record emission.
//!
//! Every facade call that passes its severity check ends here. This is the
//! one place where messages are resolved, failures are turned into warning
//! records, the call site is determined and the record is submitted, so all
//! call shapes get the same treatment.

use std::error::Error;
use std::fmt::Display;
use std::panic::Location;

use log::Record;
use log::kv::{self, Key, Source, Value, VisitSource};

use crate::backend::Backend;
use crate::callback::{CallbackResult, invoke};
use crate::caller::capture;
use crate::config::FacadeConfig;
use crate::format::format_template;
use crate::level::Severity;

/// Key-value key carrying the error attached to a record.
pub const ERROR_KEY: &str = "error";

/// Key-value key carrying the resolved caller function.
pub const CALLER_FUNCTION_KEY: &str = "caller.function";

/// Structured fields of one record.
struct RecordFields<'a> {
    error: Option<&'a (dyn Error + 'static)>,
    function: Option<&'a str>,
}

impl Source for RecordFields<'_> {
    fn visit<'kvs>(&'kvs self, visitor: &mut dyn VisitSource<'kvs>) -> Result<(), kv::Error> {
        if let Some(error) = self.error {
            visitor.visit_pair(Key::from(ERROR_KEY), Value::from_dyn_error(error))?;
        }
        if let Some(function) = self.function {
            visitor.visit_pair(Key::from(CALLER_FUNCTION_KEY), Value::from(function))?;
        }
        Ok(())
    }
}

/// Builds and submits records for one logger.
pub(crate) struct Emitter<'a> {
    pub(crate) target: &'a str,
    pub(crate) backend: &'a Backend,
    pub(crate) config: &'a FacadeConfig,
}

impl Emitter<'_> {
    /// Applies `args` to `template` and emits the result at `severity`.
    ///
    /// A template that cannot be applied is replaced by a warning naming the
    /// template and the failure; the intended message is discarded.
    #[track_caller]
    pub(crate) fn formatted(
        &self,
        severity: Severity,
        error: Option<&(dyn Error + 'static)>,
        template: &str,
        args: &[&dyn Display],
    ) {
        match format_template(template, args, self.config.contain_panics) {
            Ok(message) => self.emit(severity, &message, error),
            Err(err) => self.emit(
                Severity::Warn,
                &format!("Formatting error: `{template}' [{err}]"),
                error,
            ),
        }
    }

    /// Runs `callback` and emits its message at `severity`.
    ///
    /// A failing callback is replaced by a warning describing the failure.
    /// `error` stays attached to whichever record is emitted.
    #[track_caller]
    pub(crate) fn lazy<F>(&self, severity: Severity, error: Option<&(dyn Error + 'static)>, callback: F)
    where
        F: FnOnce() -> CallbackResult,
    {
        match invoke(callback, self.config.contain_panics) {
            Ok(message) => self.emit(severity, &message, error),
            Err(err) => self.emit(Severity::Warn, &format!("Callback error: [{err}]"), error),
        }
    }

    #[track_caller]
    fn emit(&self, severity: Severity, message: &str, error: Option<&(dyn Error + 'static)>) {
        let site = capture(self.config.caller_mode, Location::caller()).unwrap_or_default();
        let fields = RecordFields {
            error,
            function: site.function.as_deref(),
        };

        self.backend.submit(
            &Record::builder()
                .level(severity.as_level())
                .target(self.target)
                .args(format_args!("{message}"))
                .module_path(site.module_path.as_deref())
                .file(site.file.as_deref())
                .line(site.line)
                .key_values(&fields)
                .build(),
        );
    }
}
