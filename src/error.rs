//! Error types for layer building and hashing.

use std::path::PathBuf;

/// Result type alias for layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or hashing a layer.
///
/// All failures are non-transient (bad input, bad disk, bad permissions);
/// retrying without caller intervention cannot help, so no variant is
/// recoverable. End-of-input while reading a module blob is success, never
/// an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Layer Build Errors
    // =========================================================================
    /// Destination file creation failed.
    #[error("failed to create layer file at {path}: {reason}")]
    LayerCreateFailed { path: PathBuf, reason: String },

    /// Module blob could not be opened.
    #[error("failed to open blob for module '{id}:{version}': {reason}")]
    BlobOpenFailed {
        id: String,
        version: String,
        reason: String,
    },

    /// Decode or write failure while embedding the module blob.
    ///
    /// A partially written layer file may exist and must be considered
    /// invalid by the caller.
    #[error("failed to build layer for module '{id}:{version}': {reason}")]
    LayerBuildFailed {
        id: String,
        version: String,
        reason: String,
    },

    // =========================================================================
    // Entry Errors
    // =========================================================================
    /// A rewritten entry could not be written to the output archive.
    #[error("failed to write entry '{name}': {reason}")]
    EntryWriteFailed { name: String, reason: String },

    /// An entry's content did not match its declared header size.
    #[error("entry '{name}' declared {expected} bytes but carried {actual}")]
    EntrySizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// Path escape attempt detected in a module blob entry.
    #[error("path escape detected in module blob entry: {path}")]
    PathEscape { path: String },

    // =========================================================================
    // Hash Errors
    // =========================================================================
    /// Reading or compressing the layer file during hashing failed.
    #[error("failed to hash layer at {path}: {reason}")]
    HashFailed { path: PathBuf, reason: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
