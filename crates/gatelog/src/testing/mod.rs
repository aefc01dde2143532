//! Testing utilities for code that logs through the facade.
//!
//! Provides [`CapturingBackend`] for capturing and asserting on the records a
//! [`Logger`](crate::Logger) submits.

mod capture;

pub use capture::{CapturedRecord, CapturingBackend};
