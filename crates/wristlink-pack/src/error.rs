//! Error types for wristlink-pack.

use thiserror::Error;

/// Errors that can occur while packing or unpacking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    /// Format string is missing the leading `!` byte-order marker.
    #[error("format string must start with '!' (network byte order)")]
    MissingByteOrder,

    /// Unknown format character.
    #[error("unknown format character '{ch}' at position {pos}")]
    UnknownFormat {
        /// The offending character.
        ch: char,
        /// Byte position within the format string.
        pos: usize,
    },

    /// A repeat count or width was not followed by a field character.
    #[error("format string ends after count at position {pos}")]
    DanglingCount {
        /// Byte position where the count starts.
        pos: usize,
    },

    /// Format describes zero bytes, so there is nothing to pack.
    #[error("format string describes an empty layout")]
    EmptyFormat,

    /// Buffer is shorter than the size the format describes.
    #[error("insufficient data: format describes {expected} bytes, buffer holds {actual}")]
    InsufficientData {
        /// Bytes required by the format.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Wrong number of values supplied to `pack`.
    #[error("format expects {expected} values, got {actual}")]
    ValueCount {
        /// Values required by the format.
        expected: usize,
        /// Values actually supplied.
        actual: usize,
    },

    /// A supplied value does not match the field kind at its position.
    #[error("value at index {index} does not match format kind '{kind}'")]
    ValueKind {
        /// Index into the supplied value slice.
        index: usize,
        /// Short name of the expected kind.
        kind: &'static str,
    },

    /// A text field did not contain valid UTF-8.
    #[error("invalid UTF-8 in text field at byte offset {offset}")]
    InvalidUtf8 {
        /// Byte offset of the field within the buffer.
        offset: usize,
    },
}
