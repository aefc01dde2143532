//! Panic containment for call-site supplied code.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Runs `f`, turning a panic into `Err(message)` when `enabled`.
///
/// With containment disabled the panic unwinds into the caller as usual.
pub(crate) fn contain<T>(enabled: bool, f: impl FnOnce() -> T) -> Result<T, String> {
    if !enabled {
        return Ok(f());
    }
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_value_through() {
        assert_eq!(contain(true, || 7), Ok(7));
        assert_eq!(contain(false, || "x"), Ok("x"));
    }

    #[test]
    fn captures_str_and_string_payloads() {
        let err = contain::<()>(true, || panic!("static message")).unwrap_err();
        assert_eq!(err, "static message");

        let code = 42;
        let err = contain::<()>(true, || panic!("code {code}")).unwrap_err();
        assert_eq!(err, "code 42");
    }

    #[test]
    fn opaque_payload_is_described() {
        let err = contain::<()>(true, || std::panic::panic_any(17_u8)).unwrap_err();
        assert_eq!(err, "non-string panic payload");
    }
}
