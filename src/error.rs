//! Error types shared by the packer, reader, and content layers.
//!
//! Mirrors the teacher's `SuperblockError`/`CodecError` shape: one
//! `thiserror` enum per concern, with an `Io` variant that absorbs
//! propagated std I/O failures via `#[from]`.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LipError {
    #[error("invalid magic number — not a LIP archive")]
    InvalidMagic,

    #[error("pread/refill returned {got} of {want} requested bytes")]
    ShortRead { want: usize, got: usize },

    #[error("{what} offset {offset} is not 8-byte aligned")]
    Misaligned { what: &'static str, offset: i64 },

    #[error(
        "trailer out of range: expected 0 <= bss_start ({bss_start}) <= index_start \
         ({index_start}) <= file_size - 16 ({max}), got index_start={index_start}, \
         bss_start={bss_start}, file_size={file_size}"
    )]
    TrailerOutOfRange { index_start: i64, bss_start: i64, file_size: i64, max: i64 },

    #[error("index region length {len} is not a multiple of 64")]
    IndexLengthNotAligned { len: i64 },

    #[error("name_offset {offset} falls outside the BSS region (size {bss_len})")]
    NameOffsetOutOfRange { offset: i64, bss_len: usize },

    #[error("LZ4 frame truncated: need {need} bytes, {have} available before `end`")]
    TruncatedFrame { need: usize, have: usize },

    #[error("lz4_compressed flag set on a non-regular-file member")]
    CompressedFlagOnNonRegularFile,

    #[error("unknown type tag {0:#x} in flag word")]
    UnknownTypeTag(u8),

    #[error("packer operation invalid in current state (after finish, or poisoned)")]
    PackerMisuse,

    #[error("member is too large for Content::retrieve; use Content::copy instead")]
    MemberTooLarge,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LipError>;
