use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding or encoding `.spe` files.
///
/// Value-level oddities (non-numeric `TLIVE`, a short trailing payload block)
/// are not errors; they are absorbed by the decoder.
#[derive(Debug, Error)]
pub enum SpeError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The stream ended in the middle of a header line.
    #[error("malformed header line {line}: stream ended before CR LF (partial text {partial:?})")]
    MalformedHeaderLine { line: usize, partial: String },

    /// The stream ended on a line boundary without ever reaching `SPECTR=`.
    #[error("missing SPECTR sentinel: header ended after {lines} line(s)")]
    MissingSentinel { lines: usize },

    #[error("encoding {name} is not a single-byte code page")]
    UnsupportedEncoding { name: &'static str },

    #[error("unknown encoding label: {label}")]
    UnknownEncoding { label: String },

    #[error("header text {text:?} cannot be represented in {encoding}")]
    Unencodable { text: String, encoding: &'static str },

    /// A header entry that would not read back as the same single line.
    #[error("header entry {key:?} cannot be written: {reason}")]
    UnwritableHeader { key: String, reason: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpeError>;
