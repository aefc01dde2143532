//! Lazily produced messages.
//!
//! A message callback is any `FnOnce() -> CallbackResult`. It runs only when
//! its severity is enabled, at most once per call, on the caller's thread.
//! Captured data stays owned by the call site.
//!
//! ```
//! use gatelog::CallbackResult;
//!
//! fn describe(items: &[u32]) -> CallbackResult {
//!     let first = items.first().ok_or("empty batch")?;
//!     Ok(format!("batch of {} starting at {first}", items.len()))
//! }
//!
//! assert!(describe(&[]).is_err());
//! assert_eq!(describe(&[4, 5]).unwrap(), "batch of 2 starting at 4");
//! ```

use std::error::Error;

use crate::contain::contain;

/// Boxed error a callback may fail with.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// What a message callback returns.
///
/// The boxed error lets `?` work inside a callback for any error type.
pub type CallbackResult = Result<String, BoxError>;

/// Why a callback did not produce a message.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// The callback returned `Err`.
    #[error("{0}")]
    Failed(#[source] BoxError),

    /// The callback panicked.
    #[error("panicked: {0}")]
    Panicked(String),
}

/// Runs `callback` once, folding both `Err` and (when contained) panics into
/// a [`CallbackError`].
pub(crate) fn invoke<F>(callback: F, contain_panics: bool) -> Result<String, CallbackError>
where
    F: FnOnce() -> CallbackResult,
{
    match contain(contain_panics, callback) {
        Ok(Ok(message)) => Ok(message),
        Ok(Err(source)) => Err(CallbackError::Failed(source)),
        Err(message) => Err(CallbackError::Panicked(message)),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn success_returns_message() {
        let message = invoke(|| Ok("ready".to_string()), true).unwrap();
        assert_eq!(message, "ready");
    }

    #[test]
    fn err_is_wrapped_with_source() {
        let err = invoke(
            || Err(io::Error::new(io::ErrorKind::NotFound, "no such cache").into()),
            true,
        )
        .unwrap_err();

        assert!(matches!(err, CallbackError::Failed(_)));
        assert_eq!(err.to_string(), "no such cache");
        assert!(err.source().is_some());
    }

    #[test]
    fn question_mark_converts_errors() {
        fn parse_port(raw: &str) -> CallbackResult {
            let port: u16 = raw.parse()?;
            Ok(format!("port {port}"))
        }

        assert!(matches!(
            invoke(|| parse_port("nope"), true),
            Err(CallbackError::Failed(_))
        ));
        assert_eq!(invoke(|| parse_port("8080"), true).unwrap(), "port 8080");
    }

    #[test]
    fn panic_is_contained() {
        let err = invoke(|| panic!("lazy message exploded"), true).unwrap_err();
        assert!(matches!(err, CallbackError::Panicked(_)));
        assert_eq!(err.to_string(), "panicked: lazy message exploded");
    }

    #[test]
    fn runs_exactly_once() {
        let mut calls = 0;
        let _ = invoke(
            || {
                calls += 1;
                Ok(String::new())
            },
            true,
        );
        assert_eq!(calls, 1);
    }
}
