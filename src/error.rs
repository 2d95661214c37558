use std::ffi::NulError;
use std::path::PathBuf;
use std::str::Utf8Error;
use thiserror::Error;
use crate::handle::HandleKind;
#[derive(Debug, Error)]
pub enum SwiftError {
    #[error("failed to load native library {name}: {source}")]
    LibraryLoad {
        name: String,
        #[source]
        source: libloading::Error,
    },
    /// Message captured by the native exception callback.
    #[error("SWIFT native error: {0}")]
    Native(String),
    #[error("native function {0} returned a null handle")]
    NullHandle(&'static str),
    #[error("expected a native handle of type {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: HandleKind,
    },
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("index {index} is out of range for {what} of length {len}")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("time step of {0} seconds is outside 1..={max}", max = i32::MAX)]
    InvalidTimeStep(u32),
    #[error("element identifier {0} appears more than once; split elements must be unique")]
    DuplicateElement(String),
    #[error("there is already a key '{0}'; cannot add the remaining downstream catchment")]
    ReservedKeyCollision(String),
    #[error("unrecognised {kind} identifier: {value}")]
    UnknownIdentifier { kind: &'static str, value: String },
    #[error("period starts at {start} after its end {end}")]
    InvalidPeriod {
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    },
    #[error("invalid date time from native layer: {0}")]
    InvalidDateTime(String),
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("string contains an interior nul byte: {0}")]
    Nul(#[from] NulError),
    #[error("native string is not valid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid regular expression: {0}")]
    Pattern(#[from] regex::Error),
}
impl SwiftError {
    pub(crate) fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        SwiftError::UnknownIdentifier {
            kind,
            value: value.into(),
        }
    }
    /// Checks that a parallel argument has the length of its reference.
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(SwiftError::LengthMismatch {
                what,
                expected,
                actual,
            })
        }
    }
    pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(SwiftError::IndexOutOfRange { what, index, len })
        }
    }
}
pub type Result<T> = std::result::Result<T, SwiftError>;
