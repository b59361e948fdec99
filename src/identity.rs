//! Module identity and the paths derived from it.
//!
//! A module is identified by an opaque (ID, Version) pair. The identity is
//! used only to derive two strings: the layer's on-disk filename and the
//! mount subtree embedded inside the layer. Both are pure functions of the
//! identity, which is what makes layer builds reproducible.

use crate::constants::{LAYER_EXT, MOUNT_ROOT};

/// Identity of a module, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentity {
    /// Opaque module ID, e.g. `com.example/mod`.
    pub id: String,
    /// Module version string.
    pub version: String,
}

impl ModuleIdentity {
    /// Creates a module identity.
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    /// Returns the filesystem-safe form of the module ID.
    ///
    /// IDs may contain `/` (e.g. `com.example/mod`), which cannot appear in
    /// a filename and would add spurious path segments inside the archive.
    pub fn escaped_id(&self) -> String {
        self.id.replace('/', "_")
    }

    /// Returns the layer filename for this module: `{EscapedID}.{Version}.tar`.
    pub fn layer_filename(&self) -> String {
        format!("{}.{}.{}", self.escaped_id(), self.version, LAYER_EXT)
    }

    /// Returns the module's top-level mount directory inside the layer:
    /// `{MOUNT_ROOT}/{EscapedID}`.
    pub fn mount_dir(&self) -> String {
        format!("{}/{}", MOUNT_ROOT, self.escaped_id())
    }

    /// Returns the version-specific subdirectory inside the layer:
    /// `{MOUNT_ROOT}/{EscapedID}/{Version}`.
    ///
    /// Every content entry from the module blob is rewritten to live under
    /// this directory.
    pub fn version_dir(&self) -> String {
        format!("{}/{}/{}", MOUNT_ROOT, self.escaped_id(), self.version)
    }
}
