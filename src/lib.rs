//! # layerpack
//!
//! **Module layer construction for container images**
//!
//! This crate turns one module blob (an externally supplied, tar-encoded
//! content bundle) into a single-file container image layer, and derives the
//! two content hashes an image manifest records for it: the uncompressed
//! content hash (diffID) and the compressed content hash (digest).
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            layerpack                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   module blob (tar)                                              │
//! │        │                                                         │
//! │        ▼                                                         │
//! │  ┌──────────────┐  per entry: clean path, rebase under           │
//! │  │ EntryRewriter│  {MOUNT_ROOT}/{EscapedID}/{Version},           │
//! │  └──────┬───────┘  force caller uid/gid                          │
//! │         ▼                                                        │
//! │  ┌──────────────┐  synthetic mount dirs + rewritten entries      │
//! │  │ LayerBuilder │  → {EscapedID}.{Version}.tar                   │
//! │  └──────┬───────┘                                                │
//! │         ▼                                                        │
//! │  ┌──────────────┐  one read pass, fan-out to raw sha256 and      │
//! │  │ LayerDigests │  gzip→sha256 → (diffID, digest)                │
//! │  └──────────────┘                                                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Control flow is strictly sequential, synchronous, and single-threaded;
//! callers wanting parallelism run independent module builds side by side.
//!
//! # Reproducibility
//!
//! The layer filename and every in-archive path are pure functions of the
//! module identity. Synthetic entries use the fixed
//! [`constants::NORMALIZED_MTIME`] timestamp and the compressed digest uses
//! the fixed [`constants::LAYER_GZIP_LEVEL`], so two builds with identical
//! inputs produce byte-identical layers and identical digests on any
//! machine.
//!
//! # Security Model
//!
//! Module blobs are untrusted. Every entry name is lexically cleaned before
//! it is rebased under the mount subtree:
//!
//! - names whose `..` segments resolve above the archive root are rejected
//!   with [`Error::PathEscape`]
//! - absolute names are clamped into the subtree
//! - blob-supplied root entries are suppressed so they cannot override the
//!   synthesized mount directories
//! - each entry's copied content is validated against its declared header
//!   size, so a truncated blob cannot silently corrupt a layer
//!
//! # Example
//!
//! ```rust,ignore
//! use layerpack::{layer_digests, LayerBuilder, ModuleIdentity};
//!
//! let builder = LayerBuilder::new("/tmp/layers", 0, 0);
//! let module = ModuleIdentity::new("com.example/mod", "1.2.3");
//! let layer = builder.build(&module, blob_path.as_path())?;
//! let digests = layer_digests(&layer)?;
//! println!("diffID={} digest={}", digests.diff_id, digests.digest);
//! ```

pub mod constants;
pub mod error;
pub mod hash;
pub mod identity;
pub mod layer;
pub mod rewrite;

// Re-exports
pub use constants::*;
pub use error::{Error, Result};
pub use hash::{layer_digests, LayerDigests};
pub use identity::ModuleIdentity;
pub use layer::{BlobSource, LayerBuilder};
pub use rewrite::EntryRewriter;
