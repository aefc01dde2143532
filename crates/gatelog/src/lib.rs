//! Level-gated logging facade over the [`log`] backend.
//!
//! `gatelog` sits between call sites and whatever `log` implementation the
//! application installs. It adds three things a bare `log::info!` does not:
//!
//! - **Lazy messages.** Besides runtime templates, every severity accepts a
//!   callback that builds the message. Neither is evaluated unless the
//!   severity is enabled for the logger's name.
//! - **Contained failures.** A template that does not match its arguments,
//!   or a callback that fails or panics, never reaches the caller. It is
//!   replaced by a warning record describing the failure.
//! - **Accurate call sites.** Records point at the code that called the
//!   facade, not at the facade itself (see [`caller`]).
//!
//! # Usage
//!
//! ```
//! use gatelog::{Logger, log_debug};
//!
//! let log = Logger::get("inventory::sync");
//!
//! log.info("synced {} of {} items", &[&98, &100]);
//! log.debug_with(|| Ok(format!("expensive dump: {:?}", [1, 2, 3])));
//!
//! let err = std::io::Error::other("connection reset");
//! log.warn_err(&err, "retrying in {}s", &[&5]);
//!
//! // Arguments are not even evaluated when debug is disabled.
//! log_debug!(log, "snapshot {}", 42);
//! ```
//!
//! # Backend
//!
//! By default records go to the global logger installed with
//! `log::set_logger`. The logger name becomes the record target, attached
//! errors travel as the key-value pair [`ERROR_KEY`] and the resolved caller
//! function, when known, as [`CALLER_FUNCTION_KEY`].
//!
//! # Configuration
//!
//! See [`FacadeConfig`]; `GATELOG_CALLER=location|backtrace|off` selects the
//! call-site strategy for loggers created with [`Logger::get`].

#![forbid(unsafe_code)]

mod backend;
mod callback;
pub mod caller;
mod config;
mod contain;
mod emitter;
pub mod format;
mod level;
mod logger;
pub mod testing;

pub use backend::Backend;
pub use callback::{BoxError, CallbackError, CallbackResult};
pub use caller::{CallSite, CallerMode, Frame, ParseCallerModeError};
pub use config::{ConfigError, FacadeConfig};
pub use emitter::{CALLER_FUNCTION_KEY, ERROR_KEY};
pub use format::{FormatError, safe_format};
pub use level::{ParseSeverityError, Severity};
pub use logger::{Logger, LoggerBuilder};

/// Log targets used by the facade's own diagnostics.
pub mod targets {
    /// Root target for all facade diagnostics.
    pub const GATELOG: &str = "gatelog";

    /// Configuration loading.
    pub const CONFIG: &str = "gatelog::config";
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($severity:expr, $logger:expr, error: $error:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        if logger.is_enabled($severity) {
            logger.__emit_err(
                $severity,
                $error,
                $template,
                &[$(&$arg as &dyn ::std::fmt::Display),*],
            );
        }
    }};
    ($severity:expr, $logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        if logger.is_enabled($severity) {
            logger.__emit(
                $severity,
                $template,
                &[$(&$arg as &dyn ::std::fmt::Display),*],
            );
        }
    }};
}

/// Logs at trace. Arguments are evaluated only when trace is enabled.
///
/// ```
/// # let log = gatelog::Logger::get("doc");
/// gatelog::log_trace!(log, "frame {} decoded", 7);
/// ```
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::__log_at!($crate::Severity::Trace, $($arg)*)
    };
}

/// Logs at debug. Arguments are evaluated only when debug is enabled.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::__log_at!($crate::Severity::Debug, $($arg)*)
    };
}

/// Logs at info. Arguments are evaluated only when info is enabled.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::__log_at!($crate::Severity::Info, $($arg)*)
    };
}

/// Logs at warn. Arguments are evaluated only when warn is enabled.
///
/// An error can be attached with `error:`:
///
/// ```
/// # let log = gatelog::Logger::get("doc");
/// let err = std::io::Error::other("timeout");
/// gatelog::log_warn!(log, error: &err, "upstream {} slow", "billing");
/// ```
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::__log_at!($crate::Severity::Warn, $($arg)*)
    };
}

/// Logs at error. Arguments are evaluated only when error is enabled.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::__log_at!($crate::Severity::Error, $($arg)*)
    };
}
