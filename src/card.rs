//! On-disk primitives: the 8-byte header, the 64-byte `FileCard`, and the
//! flag word that discriminates member type and features.
//!
//! Layout is frozen (see `spec.md` section 6); every field here is written
//! and read little-endian via `byteorder`, the same way the teacher's
//! `superblock.rs`/`block.rs` serialize their headers.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::error::{LipError, Result};

// ── Header ───────────────────────────────────────────────────────────────────

pub const MAGIC: [u8; 4] = *b"LIP\0";
/// Frozen magic epoch tag. Not a format version — see spec.md Design Notes:
/// the source never negotiates on this value, it is a constant signature.
pub const EPOCH: i32 = 584_755;
pub const HEADER_SIZE: usize = 8;

pub fn write_header<W: Write>(mut w: W) -> io::Result<()> {
    w.write_all(&MAGIC)?;
    w.write_i32::<LittleEndian>(EPOCH)
}

pub fn read_header<R: Read>(mut r: R) -> Result<()> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(LipError::InvalidMagic);
    }
    let _epoch = r.read_i32::<LittleEndian>()?;
    Ok(())
}

// ── Flag word ────────────────────────────────────────────────────────────────

pub const TYPE_MASK: u32 = 0xf;
pub const TYPE_REGULAR_FILE: u32 = 0;
pub const TYPE_DIRECTORY: u32 = 1;
pub const TYPE_SYMLINK: u32 = 2;

pub const FEATURE_LZ4_COMPRESSED: u32 = 0x10;
pub const FEATURE_EXECUTABLE: u32 = 0x100;
/// Reserved; the design names the bit but assigns it no behavior (spec.md
/// Design Notes, Open Questions). Never set by this crate.
pub const FEATURE_READONLY: u32 = 0x200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FType {
    RegularFile,
    Directory,
    Symlink,
}

impl FType {
    pub fn from_flag(flag: u32) -> Result<Self> {
        match flag & TYPE_MASK {
            TYPE_REGULAR_FILE => Ok(FType::RegularFile),
            TYPE_DIRECTORY => Ok(FType::Directory),
            TYPE_SYMLINK => Ok(FType::Symlink),
            other => Err(LipError::UnknownTypeTag(other as u8)),
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            FType::RegularFile => TYPE_REGULAR_FILE,
            FType::Directory => TYPE_DIRECTORY,
            FType::Symlink => TYPE_SYMLINK,
        }
    }
}

/// Feature bits accompanying a regular file; OR'd into the flag word
/// alongside the type tag. Mirrors `spec.md` section 4.7's `add_regular_file`
/// `feature_flags` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features(pub u32);

impl Features {
    pub const NONE: Features = Features(0);
    pub const LZ4_COMPRESSED: Features = Features(FEATURE_LZ4_COMPRESSED);
    pub const EXECUTABLE: Features = Features(FEATURE_EXECUTABLE);

    pub fn is_lz4_compressed(self) -> bool {
        self.0 & FEATURE_LZ4_COMPRESSED != 0
    }

    pub fn is_executable(self) -> bool {
        self.0 & FEATURE_EXECUTABLE != 0
    }
}

impl std::ops::BitOr for Features {
    type Output = Features;
    fn bitor(self, rhs: Features) -> Features {
        Features(self.0 | rhs.0)
    }
}

// ── FileInfo ─────────────────────────────────────────────────────────────────

/// The two FileInfo views share storage (bytes `[8..40)` of a `FileCard`).
/// The C original expresses this as a `union`; safe Rust models it as a sum
/// type selected by the `lz4_compressed` bit, matching the "match on the
/// variant" guidance in spec.md Design Notes (RawPass vs Lz4Pass
/// polymorphism).
#[derive(Debug, Clone, Copy)]
pub enum FileInfo {
    /// Uncompressed regular files and symlinks: BLAKE2b-224 of the raw
    /// content in `[begin, end)`.
    Digest { flag: u32, digest: [u8; 28] },
    /// LZ4-compressed regular files: `original_size` is the sum of the
    /// logical lengths of all decoded frames in `[begin, end)`.
    Lz4 { flag: u32, original_size: i64 },
}

pub const FILE_INFO_SIZE: usize = 32;

impl FileInfo {
    pub fn flag(&self) -> u32 {
        match *self {
            FileInfo::Digest { flag, .. } => flag,
            FileInfo::Lz4 { flag, .. } => flag,
        }
    }

    pub fn ftype(&self) -> Result<FType> {
        FType::from_flag(self.flag())
    }

    pub fn is_lz4_compressed(&self) -> bool {
        self.flag() & FEATURE_LZ4_COMPRESSED != 0
    }

    pub fn is_executable(&self) -> bool {
        self.flag() & FEATURE_EXECUTABLE != 0
    }

    fn write(&self, buf: &mut [u8; FILE_INFO_SIZE]) {
        match *self {
            FileInfo::Digest { flag, digest } => {
                buf[0..4].copy_from_slice(&flag.to_le_bytes());
                buf[4..32].copy_from_slice(&digest);
            }
            FileInfo::Lz4 { flag, original_size } => {
                buf[0..4].copy_from_slice(&flag.to_le_bytes());
                buf[4..8].copy_from_slice(&0u32.to_le_bytes()); // reserved
                buf[8..16].copy_from_slice(&original_size.to_le_bytes());
                // bytes [16..32) are zero padding, unused by the compressed view.
            }
        }
    }

    fn read(buf: &[u8; FILE_INFO_SIZE]) -> Self {
        let flag = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        if flag & FEATURE_LZ4_COMPRESSED != 0 {
            let original_size = i64::from_le_bytes(buf[8..16].try_into().unwrap());
            FileInfo::Lz4 { flag, original_size }
        } else {
            let mut digest = [0u8; 28];
            digest.copy_from_slice(&buf[4..32]);
            FileInfo::Digest { flag, digest }
        }
    }
}

// ── FileCard ─────────────────────────────────────────────────────────────────

pub const CARD_SIZE: usize = 64;

/// The 64-byte fixed record describing one archive member.
///
/// `name_offset` is the on-disk field: a BSS-relative offset while stored
/// in a freshly built card, rebased into a buffer index by the reader (see
/// `reader.rs`). Keeping it as a plain `i64` rather than a typed pointer
/// avoids the unsafe pointer games the original `ptr::adjust` needed in
/// C++ — see SPEC_FULL.md section 4.
#[derive(Debug, Clone, Copy)]
pub struct FileCard {
    pub name_offset: i64,
    pub info: FileInfo,
    pub mtime: i64,
    pub begin: i64,
    pub end: i64,
}

impl FileCard {
    pub fn directory(mtime: i64) -> Self {
        FileCard {
            name_offset: 0,
            info: FileInfo::Digest { flag: TYPE_DIRECTORY, digest: [0u8; 28] },
            mtime,
            begin: 0,
            end: 0,
        }
    }

    pub fn stored_size(&self) -> i64 {
        self.end - self.begin
    }

    pub fn size(&self) -> i64 {
        match self.info {
            FileInfo::Lz4 { original_size, .. } => original_size,
            FileInfo::Digest { .. } => self.stored_size(),
        }
    }

    pub fn ftype(&self) -> Result<FType> {
        self.info.ftype()
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.ftype(), Ok(FType::Directory))
    }

    pub fn is_lz4_compressed(&self) -> bool {
        self.info.is_lz4_compressed()
    }

    pub fn is_executable(&self) -> bool {
        self.info.is_executable()
    }

    pub fn to_bytes(&self) -> [u8; CARD_SIZE] {
        let mut buf = [0u8; CARD_SIZE];
        buf[0..8].copy_from_slice(&self.name_offset.to_le_bytes());
        let mut info_buf = [0u8; FILE_INFO_SIZE];
        self.info.write(&mut info_buf);
        buf[8..40].copy_from_slice(&info_buf);
        buf[40..48].copy_from_slice(&self.mtime.to_le_bytes());
        buf[48..56].copy_from_slice(&self.begin.to_le_bytes());
        buf[56..64].copy_from_slice(&self.end.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; CARD_SIZE]) -> Self {
        let name_offset = i64::from_le_bytes(buf[0..8].try_into().unwrap());
        let info_buf: [u8; FILE_INFO_SIZE] = buf[8..40].try_into().unwrap();
        let info = FileInfo::read(&info_buf);
        let mtime = i64::from_le_bytes(buf[40..48].try_into().unwrap());
        let begin = i64::from_le_bytes(buf[48..56].try_into().unwrap());
        let end = i64::from_le_bytes(buf[56..64].try_into().unwrap());
        FileCard { name_offset, info, mtime, begin, end }
    }
}

// ── Alignment helper ─────────────────────────────────────────────────────────

/// `align_up(x, 8) = (x + 7) & !7`. Pad bytes are always NUL.
pub fn align_up(x: i64, align: i64) -> i64 {
    (x + align - 1) & !(align - 1)
}

// ── Time ─────────────────────────────────────────────────────────────────────

/// i64 count of 100-nanosecond ticks since an unspecified but consistent
/// epoch (`archive_clock` in the original). The traversal supplies mtimes;
/// this crate exposes a conversion from `std::time::SystemTime` for its own
/// directory-walking driver (`walk.rs`), not as part of the core contract.
pub fn ticks_from_system_time(t: std::time::SystemTime) -> i64 {
    match t.duration_since(std::time::UNIX_EPOCH) {
        Ok(d) => (d.as_secs() as i64) * 10_000_000 + (d.subsec_nanos() as i64) / 100,
        Err(e) => {
            let d = e.duration();
            -((d.as_secs() as i64) * 10_000_000 + (d.subsec_nanos() as i64) / 100)
        }
    }
}
