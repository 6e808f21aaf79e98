//! One concrete implementation of the filesystem-traversal collaborator
//! `spec.md` leaves external: walks a real directory tree and yields the
//! `(name, mtime, kind)` tuples `Packer` needs, in depth-first order.
//!
//! Grounded on the directory-walking idiom used by `arx`'s pack writer:
//! `walkdir::WalkDir` for traversal, Unix permission bits for the
//! executable flag, `Metadata::modified()` converted to archive ticks.
//! This is reference/demo code, not part of the stable core — `Packer`
//! itself never calls into this module.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::card::ticks_from_system_time;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Symlink,
    RegularFile { executable: bool },
}

pub struct Entry {
    /// Archive-relative name (forward-slash separated, no leading slash).
    pub name: String,
    pub mtime: i64,
    pub kind: EntryKind,
    /// Absolute path on the local filesystem this entry was read from.
    pub path: PathBuf,
}

/// Walks `root`, yielding one [`Entry`] per filesystem object beneath it
/// (not including `root` itself), in the order `walkdir` visits them.
pub fn walk(root: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for item in WalkDir::new(root).min_depth(1).follow_links(false) {
        let item = item.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let relative = item.path().strip_prefix(root).unwrap_or(item.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let metadata = item.path().symlink_metadata()?;
        let mtime = ticks_from_system_time(metadata.modified()?);

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.file_type().is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::RegularFile { executable: is_executable(&metadata) }
        };

        entries.push(Entry { name, mtime, kind, path: item.path().to_path_buf() });
    }
    Ok(entries)
}

pub fn read_symlink_target(path: &Path) -> Result<Vec<u8>> {
    let target = fs::read_link(path)?;
    Ok(target.to_string_lossy().into_owned().into_bytes())
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}
