//! High-level convenience wrapper over the core Packer/Reader pipelines:
//! pack a real directory tree into a LIP file, or unpack one back out.
//!
//! Plays the same role the teacher's `Archive` type played over its
//! `Superblock`/`IoStream` pair — a batteries-included entry point the
//! CLI calls into, while the lower-level `Packer`/`Reader`/`Content` APIs
//! stay usable directly for callers who need finer control.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::card::{FType, Features};
use crate::content::Content;
use crate::error::Result;
use crate::packer::Packer;
use crate::reader::Reader;
use crate::walk::{self, EntryKind};

/// Walks every path in `roots` and packs all of their entries into one new
/// archive at `output`. `compress` selects which regular files get the
/// `lz4_compressed` feature bit — the simplest policy, "all of them",
/// matching the CLI's `--lz4` flag.
///
/// The sink is created and the `Packer` started exactly once before any
/// root is walked, so multiple inputs land in a single archive rather
/// than each truncating the last one's work.
pub fn pack_directories(roots: &[impl AsRef<Path>], output: &Path, compress: bool) -> Result<()> {
    let sink = BufWriter::new(File::create(output)?);
    let mut packer = Packer::new();
    packer.start(sink)?;

    for root in roots {
        for entry in walk::walk(root.as_ref())? {
            let name = entry.name.as_bytes();
            match entry.kind {
                EntryKind::Directory => {
                    packer.add_directory(name, entry.mtime)?;
                }
                EntryKind::Symlink => {
                    let target = walk::read_symlink_target(&entry.path)?;
                    packer.add_symlink(name, entry.mtime, &target)?;
                }
                EntryKind::RegularFile { executable } => {
                    let file = File::open(&entry.path)?;
                    let mut features = Features::NONE;
                    if compress {
                        features = features | Features::LZ4_COMPRESSED;
                    }
                    if executable {
                        features = features | Features::EXECUTABLE;
                    }
                    packer.add_regular_file(name, entry.mtime, file, features)?;
                }
            }
        }
    }

    packer.finish()?;
    Ok(())
}

/// Opens `input` as a LIP archive and recreates every member under `into`.
///
/// Directories always sort before their descendants in lexicographic
/// order (a path is a byte-wise prefix of everything beneath it), so a
/// single pass over `reader.iter()` is enough — no separate directory
/// pre-pass is needed, though `create_dir_all` is used defensively per
/// entry in case a directory member was itself omitted from the archive.
pub fn unpack_archive(input: &Path, into: &Path) -> Result<()> {
    let file = File::open(input)?;
    let file_size = file.metadata()?.len() as i64;
    let reader = Reader::open(&file, file_size)?;

    for (name, card) in reader.iter() {
        let dest = into.join(String::from_utf8_lossy(name).as_ref());
        match card.ftype()? {
            FType::Directory => {
                fs::create_dir_all(&dest)?;
            }
            FType::Symlink => {
                let target = Content::retrieve(&file, card)?;
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                symlink(&String::from_utf8_lossy(&target), &dest)?;
            }
            FType::RegularFile => {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&dest)?;
                Content::copy(&file, card, &mut out)?;
                #[cfg(unix)]
                if card.is_executable() {
                    use std::os::unix::fs::PermissionsExt;
                    let mut perms = fs::metadata(&dest)?.permissions();
                    perms.set_mode(perms.mode() | 0o111);
                    fs::set_permissions(&dest, perms)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &str, dest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(windows)]
fn symlink(target: &str, dest: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, dest)
}
