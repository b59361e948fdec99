//! Layer file construction.
//!
//! Re-roots a module blob (a tar-encoded content bundle) under the module's
//! versioned mount directory and writes the result as a single layer tar
//! file. The output always begins with two synthetic directory entries (the
//! module's mount directory and its version subdirectory), followed by every
//! blob entry rewritten to live under that subdirectory, in blob order.
//!
//! Layer construction is strictly sequential: one forward pass over the blob,
//! one write pass over the destination. Concurrent builds are safe as long as
//! each targets a distinct destination file; one destination path, one
//! writer.

use crate::constants::{LAYER_DIR_MODE, NORMALIZED_MTIME};
use crate::error::{Error, Result};
use crate::identity::ModuleIdentity;
use crate::rewrite::EntryRewriter;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tar::{Archive, Builder, EntryType, Header};
use tracing::{debug, info};

/// An openable, once-readable module blob.
///
/// The blob's bytes must decode as a sequential tar archive. `open` is called
/// at most once per build; the returned reader is consumed in a single
/// forward pass and released when the build finishes, on every exit path.
pub trait BlobSource {
    /// Opens the blob for one sequential read.
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

impl BlobSource for Path {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(self)?))
    }
}

impl BlobSource for PathBuf {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        self.as_path().open()
    }
}

impl BlobSource for [u8] {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self))
    }
}

impl BlobSource for Vec<u8> {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        self.as_slice().open()
    }
}

/// Builds module layer files in a destination directory.
///
/// The destination directory must already exist and be writable. The
/// configured uid/gid are forced onto every entry the builder emits,
/// synthetic directories included; no other ownership information is
/// invented.
#[derive(Debug, Clone)]
pub struct LayerBuilder {
    /// Directory layer files are written into.
    dest_dir: PathBuf,
    /// Owner uid for every emitted entry.
    uid: u64,
    /// Owner gid for every emitted entry.
    gid: u64,
}

impl LayerBuilder {
    /// Creates a layer builder writing into `dest_dir`.
    pub fn new(dest_dir: impl Into<PathBuf>, uid: u64, gid: u64) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            uid,
            gid,
        }
    }

    /// Returns the destination directory.
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Returns the path a layer for `module` would be written to:
    /// `{dest_dir}/{EscapedID}.{Version}.tar`.
    pub fn layer_path(&self, module: &ModuleIdentity) -> PathBuf {
        self.dest_dir.join(module.layer_filename())
    }

    /// Builds the layer file for `module` from `blob`.
    ///
    /// Returns the path of the created layer file. On failure a partially
    /// written file may exist at that path and must be considered invalid;
    /// cleanup policy is the caller's.
    pub fn build<B: BlobSource + ?Sized>(
        &self,
        module: &ModuleIdentity,
        blob: &B,
    ) -> Result<PathBuf> {
        let layer_path = self.layer_path(module);
        debug!(
            "building layer for module '{}:{}' at {}",
            module.id,
            module.version,
            layer_path.display()
        );

        let file = File::create(&layer_path).map_err(|e| Error::LayerCreateFailed {
            path: layer_path.clone(),
            reason: e.to_string(),
        })?;

        let mut tw = Builder::new(file);
        let written = self.write_layer(&mut tw, module, blob);

        // The writer is finished on every exit path so the archive always
        // carries its trailing blocks; a build error still wins over a
        // finish error.
        let finished = tw.finish();
        written?;
        finished.map_err(|e| Error::LayerBuildFailed {
            id: module.id.clone(),
            version: module.version.clone(),
            reason: e.to_string(),
        })?;

        info!(
            "built layer for module '{}:{}' at {}",
            module.id,
            module.version,
            layer_path.display()
        );
        Ok(layer_path)
    }

    /// Writes the synthetic directories, then embeds the blob.
    fn write_layer<W: Write, B: BlobSource + ?Sized>(
        &self,
        tw: &mut Builder<W>,
        module: &ModuleIdentity,
        blob: &B,
    ) -> Result<()> {
        self.write_mount_dirs(tw, module)?;

        let reader = blob.open().map_err(|e| Error::BlobOpenFailed {
            id: module.id.clone(),
            version: module.version.clone(),
            reason: e.to_string(),
        })?;

        self.embed_blob(tw, module, reader)
            .map_err(|e| Error::LayerBuildFailed {
                id: module.id.clone(),
                version: module.version.clone(),
                reason: e.to_string(),
            })
    }

    /// Writes the module root and version subdirectory entries.
    ///
    /// These are emitted exactly once, before any content entries, regardless
    /// of whether the blob carries its own top-level directory entries.
    fn write_mount_dirs<W: Write>(&self, tw: &mut Builder<W>, module: &ModuleIdentity) -> Result<()> {
        for dir in [module.mount_dir(), module.version_dir()] {
            let mut header = Header::new_gnu();
            header.set_entry_type(EntryType::dir());
            header.set_mode(LAYER_DIR_MODE);
            header.set_size(0);
            header.set_mtime(NORMALIZED_MTIME);
            header.set_uid(self.uid);
            header.set_gid(self.gid);

            append_entry(tw, &mut header, &dir, None, io::empty()).map_err(|e| {
                Error::EntryWriteFailed {
                    name: dir.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }

    /// Copies every blob entry into the output, rewritten under the module's
    /// version subdirectory.
    ///
    /// The blob is decoded in a single forward pass; the first decode or
    /// write error aborts the remaining entries. End-of-stream is success.
    fn embed_blob<W: Write>(
        &self,
        tw: &mut Builder<W>,
        module: &ModuleIdentity,
        reader: Box<dyn Read + '_>,
    ) -> Result<()> {
        let rewriter = EntryRewriter::new(module.version_dir(), self.uid, self.gid);
        let mut archive = Archive::new(reader);

        for entry in archive.entries()? {
            let mut entry = entry?;
            let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            // The full link target; a GNU long-link record in the blob is
            // attached to the entry, not the raw header.
            let link_target = entry.link_name_bytes().map(|b| b.into_owned());
            let mut header = entry.header().clone();

            let new_name = match rewriter.rewrite(&name, &mut header)? {
                Some(new_name) => new_name,
                None => {
                    debug!("skipping blob root entry '{}'", name);
                    continue;
                }
            };

            // entry.size() honors PAX size overrides; materialize it into
            // the header when it differs, since extension records from the
            // blob are not forwarded.
            let declared = entry.size();
            if header.entry_size().map_or(true, |s| s != declared) {
                header.set_size(declared);
            }

            let mut content = CountingReader::new(&mut entry);
            append_entry(
                tw,
                &mut header,
                &new_name,
                link_target.as_deref(),
                &mut content,
            )
            .map_err(|e| Error::EntryWriteFailed {
                name: new_name.clone(),
                reason: e.to_string(),
            })?;

            // The tar writer pads whatever it copied; a short or long source
            // entry would silently corrupt the layer, so the copied byte
            // count must match the declared header size.
            if content.bytes_read() != declared {
                return Err(Error::EntrySizeMismatch {
                    name: new_name,
                    expected: declared,
                    actual: content.bytes_read(),
                });
            }
        }

        Ok(())
    }
}

/// Appends one entry with an explicit in-archive name and link target.
///
/// Layer entry names are anchored at the mount root (leading slash), which
/// the `tar` path API rejects as non-relative, so the name bytes are written
/// into the header field directly. Names and link targets over the 100-byte
/// ustar fields get GNU long-name/long-link records first, with the
/// truncated value in the real header.
fn append_entry<W: Write>(
    tw: &mut Builder<W>,
    header: &mut Header,
    name: &str,
    link_target: Option<&[u8]>,
    data: impl Read,
) -> io::Result<()> {
    let bytes = name.as_bytes();

    if bytes.len() > 100 {
        let long = gnu_extension_header(EntryType::GNULongName, bytes.len() as u64);
        tw.append(&long, bytes)?;
    }

    if let Some(target) = link_target {
        if target.len() > 100 {
            let long = gnu_extension_header(EntryType::GNULongLink, target.len() as u64);
            tw.append(&long, target)?;
        }
        let n = target.len().min(100);
        let old = header.as_old_mut();
        old.linkname = [0; 100];
        old.linkname[..n].copy_from_slice(&target[..n]);
    }

    let n = bytes.len().min(100);
    let old = header.as_old_mut();
    old.name = [0; 100];
    old.name[..n].copy_from_slice(&bytes[..n]);

    // A source ustar header may carry a name prefix; the rewritten name is
    // complete on its own, and a stale prefix would be rejoined by readers.
    if let Some(ustar) = header.as_ustar_mut() {
        ustar.prefix = [0; 155];
    }

    header.set_cksum();
    tw.append(header, data)
}

/// Builds the synthetic header carrying a GNU long-name or long-link record.
fn gnu_extension_header(entry_type: EntryType, size: u64) -> Header {
    let mut header = Header::new_gnu();
    let name = b"././@LongLink";
    header.as_old_mut().name[..name.len()].copy_from_slice(name);
    header.set_entry_type(entry_type);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    header.set_size(size);
    header.set_cksum();
    header
}

/// Reader adapter that counts the bytes pulled through it.
struct CountingReader<R> {
    inner: R,
    read: u64,
}

impl<R: Read> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, read: 0 }
    }

    fn bytes_read(&self) -> u64 {
        self.read
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        Ok(n)
    }
}
