//! Error types for vimacro

use std::fmt;

/// Main error type for macro store operations
#[derive(Debug)]
pub enum MacroError {
    /// Trigger text does not fit the 1-byte length field (max 255 bytes)
    TriggerTooLong(usize),

    /// Macro content does not fit the 2-byte length field (max 65535 bytes)
    ContentTooLong(usize),

    /// Store holds more entries than the 2-byte count field can represent
    StoreTooLarge(usize),

    /// Binary decode would run past the end of the buffer
    TruncatedInput {
        /// Number of bytes the decoder needed to read
        needed: usize,
        /// Number of bytes left in the buffer
        remaining: usize,
    },

    /// Declared entry count cannot fit in the remaining buffer
    MalformedLength(String),

    /// Macro file format not recognized
    UnsupportedFormat(String),

    /// IO error
    IoError(std::io::Error),

    /// JSON parsing error
    JsonError(serde_json::Error),

    /// Generic error with message
    Generic(String),
}

impl fmt::Display for MacroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroError::TriggerTooLong(len) => {
                write!(f, "Trigger too long: {len} bytes (max 255)")
            }
            MacroError::ContentTooLong(len) => {
                write!(f, "Content too long: {len} bytes (max 65535)")
            }
            MacroError::StoreTooLarge(count) => {
                write!(f, "Too many macros: {count} (max 65535)")
            }
            MacroError::TruncatedInput { needed, remaining } => {
                write!(
                    f,
                    "Truncated input: need {needed} bytes, {remaining} remaining"
                )
            }
            MacroError::MalformedLength(msg) => write!(f, "Malformed length: {msg}"),
            MacroError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {msg}"),
            MacroError::IoError(err) => write!(f, "IO error: {err}"),
            MacroError::JsonError(err) => write!(f, "JSON error: {err}"),
            MacroError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for MacroError {}

impl From<std::io::Error> for MacroError {
    fn from(err: std::io::Error) -> Self {
        MacroError::IoError(err)
    }
}

impl From<serde_json::Error> for MacroError {
    fn from(err: serde_json::Error) -> Self {
        MacroError::JsonError(err)
    }
}

/// Result type for macro store operations
pub type Result<T> = std::result::Result<T, MacroError>;
