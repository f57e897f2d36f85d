//! Unified error types for the longan library.
//!
//! Decoder errors for malformed bytes surface here; "unknown template" /
//! "unknown embellishment" conditions during LaTeX emission are not errors
//! (they are collected as diagnostics and emission continues).

use thiserror::Error;

/// Main error type for longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error (DOCX container)
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// MTEF header declares a version this crate does not interpret
    #[error("Unsupported MTEF version: {0} (only version 5 is supported)")]
    UnsupportedVersion(u8),

    /// The 28-byte OLE equation header is malformed or the payload is short
    #[error("Bad equation container: {0}")]
    BadContainer(String),

    /// EOF inside a record's required fields (EOF between records is
    /// normal termination, not an error)
    #[error("Truncated MTEF stream at offset {0}")]
    TruncatedStream(usize),

    /// The input is not an OLE2 compound file
    #[error("Not an OLE compound file")]
    NotOleFile,

    /// Structurally corrupt compound file
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    /// A named stream is missing from the compound file
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// Other malformed structures
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Result type for longan operations.
pub type Result<T> = std::result::Result<T, Error>;
