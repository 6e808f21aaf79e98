//! Retrieving a member's bytes given its `FileCard`: `copy` streams to any
//! `Write` sink, `retrieve` buffers small members in memory.
//!
//! Matches `spec.md` section 4.6/4.7's split between a streaming
//! interface for arbitrary-size content and a convenience accessor that
//! refuses to buffer something unreasonably large.

use std::io::Write;

use crate::card::FileCard;
use crate::codec::{decode_frame, CHUNK_SIZE};
use crate::error::{LipError, Result};
use crate::reader::{pread_exact, PositionedRead};

/// Upper bound for `Content::retrieve`. The source used at least 64 KiB
/// internally for its own buffers; this crate picks a generous multiple
/// of that as the in-memory convenience limit rather than copying the
/// source's undocumented figure verbatim — see DESIGN.md.
pub const MAX_RETRIEVE_SIZE: i64 = 16 * 1024 * 1024;

pub struct Content;

impl Content {
    /// Streams `card`'s content from `source` to `sink`. Directories have
    /// no content and `copy` is a no-op for them.
    pub fn copy<S, W>(source: &S, card: &FileCard, sink: &mut W) -> Result<()>
    where
        S: PositionedRead + ?Sized,
        W: Write,
    {
        if card.is_directory() {
            return Ok(());
        }
        if card.is_lz4_compressed() {
            Self::copy_compressed(source, card, sink)
        } else {
            Self::copy_raw(source, card, sink)
        }
    }

    fn copy_raw<S, W>(source: &S, card: &FileCard, sink: &mut W) -> Result<()>
    where
        S: PositionedRead + ?Sized,
        W: Write,
    {
        let mut pos = card.begin as u64;
        let end = card.end as u64;
        let mut buf = [0u8; CHUNK_SIZE];
        while pos < end {
            let want = ((end - pos) as usize).min(CHUNK_SIZE);
            let n = source.pread(&mut buf[..want], pos)?;
            if n == 0 {
                return Err(LipError::ShortRead { want, got: 0 });
            }
            sink.write_all(&buf[..n])?;
            pos += n as u64;
        }
        Ok(())
    }

    fn copy_compressed<S, W>(source: &S, card: &FileCard, sink: &mut W) -> Result<()>
    where
        S: PositionedRead + ?Sized,
        W: Write,
    {
        let mut pos = card.begin as u64;
        let end = card.end as u64;
        while pos < end {
            let mut len_buf = [0u8; 4];
            if end - pos < 4 {
                return Err(LipError::TruncatedFrame { need: 4, have: (end - pos) as usize });
            }
            pread_exact(source, &mut len_buf, pos)?;
            pos += 4;
            let len = i32::from_le_bytes(len_buf) as usize;
            if pos + len as u64 > end {
                return Err(LipError::TruncatedFrame { need: len, have: (end - pos) as usize });
            }
            let mut payload = vec![0u8; len];
            pread_exact(source, &mut payload, pos)?;
            pos += len as u64;
            decode_frame(&payload, sink)?;
        }
        Ok(())
    }

    /// Buffers `card`'s content in memory. Refuses members larger than
    /// [`MAX_RETRIEVE_SIZE`] with [`LipError::MemberTooLarge`] — use
    /// [`Content::copy`] for those instead.
    pub fn retrieve<S: PositionedRead + ?Sized>(source: &S, card: &FileCard) -> Result<Vec<u8>> {
        if card.size() > MAX_RETRIEVE_SIZE {
            return Err(LipError::MemberTooLarge);
        }
        let mut buf = Vec::with_capacity(card.size().max(0) as usize);
        Self::copy(source, card, &mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{FType, FileInfo};
    use crate::codec::lz4_pass;
    use crate::hash;

    fn uncompressed_card(begin: i64, end: i64, digest: [u8; 28]) -> FileCard {
        FileCard {
            name_offset: 0,
            info: FileInfo::Digest { flag: FType::RegularFile.tag(), digest },
            mtime: 0,
            begin,
            end,
        }
    }

    #[test]
    fn copy_raw_streams_exact_bytes() {
        let mut archive = vec![0u8; 8];
        let content = b"hello, lip archive content";
        archive.extend_from_slice(content);
        let card = uncompressed_card(8, archive.len() as i64, hash::digest(content));

        let mut out = Vec::new();
        Content::copy(archive.as_slice(), &card, &mut out).unwrap();
        assert_eq!(out, content);
    }

    #[test]
    fn copy_compressed_decodes_frames() {
        let data = b"repeat repeat repeat repeat repeat repeat ".repeat(100);
        let mut archive = Vec::new();
        let original_size = lz4_pass(std::io::Cursor::new(&data), &mut archive).unwrap();
        let card = FileCard {
            name_offset: 0,
            info: FileInfo::Lz4 {
                flag: FType::RegularFile.tag() | crate::card::FEATURE_LZ4_COMPRESSED,
                original_size,
            },
            mtime: 0,
            begin: 0,
            end: archive.len() as i64,
        };

        let mut out = Vec::new();
        Content::copy(archive.as_slice(), &card, &mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn retrieve_refuses_oversized_members() {
        let card = uncompressed_card(0, MAX_RETRIEVE_SIZE + 1, [0u8; 28]);
        let archive = vec![0u8; 1];
        let err = Content::retrieve(archive.as_slice(), &card).unwrap_err();
        assert!(matches!(err, LipError::MemberTooLarge));
    }
}
