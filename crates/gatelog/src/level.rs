//! Severity levels understood by the facade.
//!
//! Each [`Severity`] is bound one-to-one to a [`log::Level`]. Note that the
//! ordering is the natural "more severe is greater" ordering, the inverse of
//! the `log` crate's own ordering (where `Error < Trace`).

use std::fmt;
use std::str::FromStr;

use log::Level;

/// Severity of a log call.
///
/// | Severity | Backend level    | Typical use                        |
/// |----------|------------------|------------------------------------|
/// | `Trace`  | `Level::Trace`   | Wire-level detail, internal state  |
/// | `Debug`  | `Level::Debug`   | Request flow, handler invocations  |
/// | `Info`   | `Level::Info`    | Lifecycle events                   |
/// | `Warn`   | `Level::Warn`    | Recoverable issues                 |
/// | `Error`  | `Level::Error`   | Failures                           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Verbose debugging information
    Trace,
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Warning messages
    Warn,
    /// Error messages
    Error,
}

impl Severity {
    /// All severities, least severe first.
    pub const ALL: [Severity; 5] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    /// The backend level this severity is bound to.
    #[inline]
    #[must_use]
    pub const fn as_level(self) -> Level {
        match self {
            Severity::Trace => Level::Trace,
            Severity::Debug => Level::Debug,
            Severity::Info => Level::Info,
            Severity::Warn => Level::Warn,
            Severity::Error => Level::Error,
        }
    }

    /// Lowercase human name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => Severity::Trace,
            Level::Debug => Severity::Debug,
            Level::Info => Severity::Info,
            Level::Warn => Severity::Warn,
            Level::Error => Severity::Error,
        }
    }
}

impl From<Severity> for Level {
    fn from(severity: Severity) -> Self {
        severity.as_level()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string does not name a severity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity `{0}` (expected trace, debug, info, warn or error)")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Trace < Severity::Debug);
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn all_is_sorted_and_complete() {
        let mut sorted = Severity::ALL;
        sorted.sort();
        assert_eq!(sorted, Severity::ALL);
        assert_eq!(Severity::ALL.len(), 5);
    }

    #[test]
    fn backend_mapping_round_trips() {
        for severity in Severity::ALL {
            assert_eq!(Severity::from(severity.as_level()), severity);
        }
        assert_eq!(Level::from(Severity::Warn), Level::Warn);
    }

    #[test]
    fn ordering_is_inverse_of_backend() {
        // log::Level orders Error lowest
        assert!(Severity::Error > Severity::Trace);
        assert!(Severity::Error.as_level() < Severity::Trace.as_level());
    }

    #[test]
    fn parse_accepts_names_and_aliases() {
        assert_eq!("TRACE".parse::<Severity>(), Ok(Severity::Trace));
        assert_eq!(" info ".parse::<Severity>(), Ok(Severity::Info));
        assert_eq!("warning".parse::<Severity>(), Ok(Severity::Warn));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(Severity::Debug.to_string(), "debug");
        assert_eq!(format!("{}", Severity::Error), "error");
    }
}
