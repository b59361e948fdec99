//! # Layer Building Constants
//!
//! Defines the shared constants for layer construction and hashing. These
//! constants are the **single source of truth** for reproducibility-critical
//! values throughout the codebase: any archive this system produces must use
//! the same mount root, timestamp, and compression level, or the
//! byte-identity and digest-stability guarantees break.
//!
//! ## Modification Guidelines
//!
//! Before modifying any constant:
//! 1. Evaluate the impact on reproducibility (identical inputs must keep
//!    producing byte-identical layers and digests)
//! 2. Consider consumers that have already recorded digests of existing
//!    layers
//! 3. Update dependent tests and documentation
//!
//! ## Cross-References
//!
//! - [`crate::identity`]: Uses the mount root for path derivation
//! - [`crate::layer`]: Uses the normalized timestamp and directory mode
//! - [`crate::hash`]: Uses the compression level and hash prefix

// =============================================================================
// Layer Layout
// =============================================================================

/// Fixed absolute path prefix under which every module's content is mounted
/// inside a layer's filesystem view.
///
/// This is a system-wide constant, not per-call configuration: the consuming
/// platform expects module content at this exact location at runtime.
pub const MOUNT_ROOT: &str = "/cnb/buildpacks";

/// Mode for the synthetic directory entries at the head of every layer.
pub const LAYER_DIR_MODE: u32 = 0o755;

/// File extension for produced layer archives.
pub const LAYER_EXT: &str = "tar";

// =============================================================================
// Reproducibility
// =============================================================================

/// Fixed modification time applied to synthetic archive entries
/// (1980-01-01T00:00:01Z, as Unix seconds).
///
/// Using a constant instead of wall-clock time makes two builds with
/// identical inputs produce byte-identical archives. Every archive-producing
/// operation in this system must reuse this value.
pub const NORMALIZED_MTIME: u64 = 315_532_801;

/// Gzip compression level used when deriving a layer's compressed digest.
///
/// Fixed so the compressed digest of identical raw bytes is reproducible on
/// any machine. Level 6 is the gzip default.
pub const LAYER_GZIP_LEVEL: u32 = 6;

// =============================================================================
// Hashing
// =============================================================================

/// Algorithm tag prefixed to every hex digest this crate emits.
pub const DIGEST_ALGORITHM: &str = "sha256";

/// Buffer size for the streaming hash pass (32 KiB).
pub const HASH_BUF_SIZE: usize = 32 * 1024;
