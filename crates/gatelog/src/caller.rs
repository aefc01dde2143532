//! Call-site resolution.
//!
//! A record should point at the code that called the facade, not at the
//! facade's own helpers. Two strategies are available:
//!
//! - [`CallerMode::Location`] relies on `#[track_caller]`: every public
//!   emission method and every internal helper down to the emitter carries
//!   the attribute, so `Location::caller()` is the user's call site no matter
//!   how deep the internal chain is.
//! - [`CallerMode::Backtrace`] walks the real stack. Frames are scanned for
//!   the first one owned by this crate, then forward for the first one that
//!   is not; see [`resolve`]. The scan is keyed on the crate's module path,
//!   never on a fixed depth.
//!
//! A miss is never an error: the record is simply emitted without a
//! location.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use serde::Deserialize;

/// Module path prefix that marks a frame as belonging to the facade.
pub const SELF_MARKER: &str = env!("CARGO_CRATE_NAME");

/// How the emitter determines the call site of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerMode {
    /// File and line captured through `#[track_caller]`.
    #[default]
    Location,
    /// Module and function recovered from a captured backtrace.
    Backtrace,
    /// No call site is attached.
    Off,
}

/// Returned when a string does not name a [`CallerMode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown caller mode `{0}` (expected location, backtrace or off)")]
pub struct ParseCallerModeError(pub String);

impl FromStr for CallerMode {
    type Err = ParseCallerModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "location" => Ok(CallerMode::Location),
            "backtrace" => Ok(CallerMode::Backtrace),
            "off" | "none" | "0" => Ok(CallerMode::Off),
            _ => Err(ParseCallerModeError(s.to_string())),
        }
    }
}

impl fmt::Display for CallerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CallerMode::Location => "location",
            CallerMode::Backtrace => "backtrace",
            CallerMode::Off => "off",
        })
    }
}

/// One stack frame, innermost first when in a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Declaring unit: the module or type path owning the function.
    pub unit: String,
    /// Function or method name.
    pub function: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Frame {
    #[must_use]
    pub fn new(unit: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            function: function.into(),
            file: None,
            line: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

/// Resolved call site attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub module_path: Option<String>,
    pub function: Option<String>,
    pub file: Option<Cow<'static, str>>,
    pub line: Option<u32>,
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            module_path: None,
            function: None,
            file: Some(Cow::Borrowed(location.file())),
            line: Some(location.line()),
        }
    }
}

impl From<&Frame> for CallSite {
    fn from(frame: &Frame) -> Self {
        Self {
            module_path: Some(frame.unit.clone()).filter(|unit| !unit.is_empty()),
            function: Some(frame.function.clone()),
            file: frame.file.clone().map(Cow::Owned),
            line: frame.line,
        }
    }
}

/// Whether `unit` is `marker` itself or nested below it.
#[must_use]
pub fn belongs_to(unit: &str, marker: &str) -> bool {
    unit.strip_prefix(marker)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Finds the caller of the facade in `frames` (innermost first).
///
/// Locates the first frame owned by `marker`, then returns the first frame
/// after it that is not. Returns `None` when no frame is owned by `marker`
/// or every frame above the facade's own frames is also the facade's.
///
/// ```
/// use gatelog::caller::{Frame, resolve};
///
/// let stack = [
///     Frame::new("gatelog::emitter::Emitter", "emit"),
///     Frame::new("gatelog::logger::Logger", "info"),
///     Frame::new("billing::invoice", "finalize"),
/// ];
/// let caller = resolve(&stack, "gatelog").unwrap();
/// assert_eq!(caller.function, "finalize");
/// ```
#[must_use]
pub fn resolve<'a>(frames: &'a [Frame], marker: &str) -> Option<&'a Frame> {
    let self_index = frames
        .iter()
        .position(|frame| belongs_to(&frame.unit, marker))?;

    frames[self_index + 1..]
        .iter()
        .find(|frame| !belongs_to(&frame.unit, marker))
}

/// Parses the rendered form of a [`std::backtrace::Backtrace`].
///
/// Unsymbolized frames are dropped; `{{closure}}` segments fold into the
/// enclosing function and `<Type as Trait>::method` reports `Type` as the
/// unit.
#[must_use]
pub fn parse_backtrace(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    let mut last_kept = false;

    for line in text.lines() {
        let line = line.trim();

        if let Some(location) = line.strip_prefix("at ") {
            if last_kept {
                if let Some(frame) = frames.last_mut() {
                    let (file, line) = split_location(location);
                    frame.file = Some(file.to_string());
                    frame.line = line;
                }
            }
            continue;
        }

        let Some((index, symbol)) = line.split_once(": ") else {
            continue;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }

        match split_symbol(symbol) {
            Some((unit, function)) => {
                frames.push(Frame::new(unit, function));
                last_kept = true;
            }
            None => last_kept = false,
        }
    }

    frames
}

/// `path/to/file.rs:12:5` into `("path/to/file.rs", Some(12))`.
fn split_location(location: &str) -> (&str, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let column = parts.next();
    let line = parts.next();
    match (parts.next(), line, column) {
        (Some(file), Some(line), Some(_)) => (file, line.parse().ok()),
        _ => (location, None),
    }
}

/// Splits `a::b::<C as D>::f` at top-level `::`, ignoring separators nested
/// in angle brackets.
fn path_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    let bytes = path.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&path[start..]);
    segments
}

fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()) => {
            head
        }
        _ => symbol,
    }
}

fn is_closure(segment: &str) -> bool {
    segment.starts_with("{{") || segment.starts_with("{closure") || segment.starts_with("{shim")
}

/// Splits a demangled symbol into `(unit, function)`.
fn split_symbol(symbol: &str) -> Option<(String, String)> {
    let symbol = strip_hash(symbol.trim());
    if symbol.is_empty() || symbol.starts_with("<unknown>") || symbol.starts_with("0x") {
        return None;
    }

    let mut segments = path_segments(symbol);
    while segments.len() > 1
        && segments
            .last()
            .is_some_and(|last| is_closure(last) || last.starts_with('<'))
    {
        segments.pop();
    }

    let function = segments.pop()?.to_string();
    let unit = match segments.as_slice() {
        [] => String::new(),
        [qualified, rest @ ..] if qualified.starts_with('<') => {
            let qualified: &str = qualified;
            let inner = qualified
                .strip_prefix('<')
                .and_then(|q| q.strip_suffix('>'))
                .unwrap_or(qualified);
            let self_ty = inner.split(" as ").next().unwrap_or(inner);
            std::iter::once(self_ty)
                .chain(rest.iter().copied())
                .collect::<Vec<_>>()
                .join("::")
        }
        segments => segments.join("::"),
    };

    Some((unit, function))
}

/// Determines the call site for a record being emitted from `location`.
pub(crate) fn capture(mode: CallerMode, location: &'static Location<'static>) -> Option<CallSite> {
    match mode {
        CallerMode::Off => None,
        CallerMode::Location => Some(CallSite::from(location)),
        CallerMode::Backtrace => {
            let trace = Backtrace::force_capture();
            let frames = parse_backtrace(&trace.to_string());
            resolve(&frames, SELF_MARKER).map(CallSite::from)
        }
    }
}
