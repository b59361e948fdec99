//! Layer content hashing.
//!
//! Computes the two hashes an image manifest needs for a layer: the hash of
//! its raw bytes (the diffID) and the hash of those bytes gzip-compressed at
//! a fixed level (the digest). Both are derived from a single read pass over
//! the layer file, so hashing never costs more than one disk read regardless
//! of layer size:
//!
//! ```text
//! raw sum  <------------------ +
//!                              |
//! gz sum   <- gzip encoder <-- + <-- layer file
//! ```
//!
//! Every chunk read is fanned out to the raw accumulator and the compressor
//! in the same pass. The compressed digest is only read after the encoder
//! has been finished, so its trailing bytes are accounted for.

use crate::constants::{DIGEST_ALGORITHM, HASH_BUF_SIZE, LAYER_GZIP_LEVEL};
use crate::error::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tracing::debug;

/// The hash pair of a finished layer file.
///
/// Both values are algorithm-tagged lowercase hex digests
/// (`sha256:<64 hex>`), well-formed by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDigests {
    /// Hash of the layer's raw (uncompressed) bytes.
    pub diff_id: String,
    /// Hash of the layer's bytes after gzip compression at the fixed level.
    pub digest: String,
}

impl LayerDigests {
    /// Computes both digests from a single pass over `reader`.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut raw = Sha256::new();
        let mut gz = GzEncoder::new(Sha256::new(), Compression::new(LAYER_GZIP_LEVEL));

        let mut buf = [0u8; HASH_BUF_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            raw.update(&buf[..n]);
            gz.write_all(&buf[..n])?;
        }

        // finish() flushes the gzip trailer into the compressed accumulator;
        // reading the sum before that would drop the trailing bytes.
        let compressed = gz.finish()?;

        Ok(Self {
            diff_id: format_digest(&raw.finalize()),
            digest: format_digest(&compressed.finalize()),
        })
    }
}

/// Computes the [`LayerDigests`] of the layer file at `path` in one read
/// pass.
pub fn layer_digests(path: &Path) -> Result<LayerDigests> {
    let file = File::open(path).map_err(|e| Error::HashFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let digests =
        LayerDigests::from_reader(BufReader::new(file)).map_err(|e| Error::HashFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    debug!(
        "hashed layer {}: diff_id={} digest={}",
        path.display(),
        digests.diff_id,
        digests.digest
    );
    Ok(digests)
}

fn format_digest(bytes: &[u8]) -> String {
    format!("{}:{}", DIGEST_ALGORITHM, hex::encode(bytes))
}
