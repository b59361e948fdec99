//! Archive entry rewriting.
//!
//! Rewrites one source archive entry at a time so it lands under the layer's
//! version subdirectory: the header name is lexically cleaned, rebased onto
//! the target subtree, and ownership is overridden to the caller-supplied
//! uid/gid. Everything else in the header passes through unmodified.
//!
//! ## Security Model
//!
//! Module blobs are untrusted input. A malformed or malicious blob could
//! encode names like `../../etc/passwd`; cleaning happens *before* the name
//! is joined to the subtree root, and any name whose `..` segments pop above
//! the archive root is rejected outright. Absolute names are clamped: leading
//! separators are stripped and the remainder is treated as relative, so
//! `/etc/passwd` lands at `{subtree}/etc/passwd` rather than escaping.
//!
//! This module performs no I/O.

use crate::error::{Error, Result};
use tar::Header;

/// Rewrites source archive entries for embedding under a target subtree.
#[derive(Debug, Clone)]
pub struct EntryRewriter {
    /// Subtree root every rewritten name is joined onto.
    base: String,
    /// Owner uid forced onto every rewritten entry.
    uid: u64,
    /// Owner gid forced onto every rewritten entry.
    gid: u64,
}

impl EntryRewriter {
    /// Creates a rewriter targeting the given subtree root.
    pub fn new(base: impl Into<String>, uid: u64, gid: u64) -> Self {
        Self {
            base: base.into(),
            uid,
            gid,
        }
    }

    /// Rewrites a single entry.
    ///
    /// Returns the entry's new name, or `None` if the entry denotes the
    /// archive root and must be skipped: the destination subtree's own
    /// directory entries are synthesized separately and must not be
    /// duplicated or overridden by a blob-supplied root entry.
    ///
    /// The header's uid/gid are overridden unconditionally; type flag, mode,
    /// size, modification time, and link target pass through unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::PathEscape`] if the cleaned name resolves above the archive
    /// root.
    pub fn rewrite(&self, name: &str, header: &mut Header) -> Result<Option<String>> {
        let cleaned = match clean_relative(name)? {
            Some(cleaned) => cleaned,
            None => return Ok(None),
        };

        header.set_uid(self.uid);
        header.set_gid(self.gid);

        Ok(Some(format!("{}/{}", self.base, cleaned)))
    }
}

/// Lexically cleans an entry name relative to the archive root.
///
/// Drops empty and `.` segments, collapses separators, and resolves `..`
/// against preceding segments. Leading separators are stripped first, so
/// absolute names are reinterpreted as relative.
///
/// Returns `None` when nothing remains after cleaning (the name denoted the
/// archive root), and [`Error::PathEscape`] when a `..` segment would resolve
/// above the root.
fn clean_relative(name: &str) -> Result<Option<String>> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(Error::PathEscape {
                        path: name.to_string(),
                    });
                }
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Ok(None);
    }
    Ok(Some(segments.join("/")))
}
