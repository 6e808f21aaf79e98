//! Random-access read side: `Reader::open` loads the BSS+Index tail of an
//! archive into one buffer, parses every `FileCard` and name out of it,
//! and exposes O(log N) name lookup plus ordered iteration over every
//! member. The parsed buffer itself is not retained — names and cards are
//! copied out once at open time, so a `Reader` owns no borrowed state
//! tied to the original tail allocation.
//!
//! The source's `ptr::adjust(base, origin)` turned a stored file-relative
//! offset into a live pointer at read time. Here the (transient) tail
//! buffer's index 0 is defined to be `bss_start`, so every on-disk
//! `name_offset` (already BSS-relative) is already the right `usize`
//! index during parsing — no pointer arithmetic, unsafe or otherwise, is
//! needed. See SPEC_FULL.md section 4.

use std::collections::BTreeMap;

use crate::card::{read_header, FileCard, CARD_SIZE, HEADER_SIZE};
use crate::error::{LipError, Result};

pub const TRAILER_SIZE: usize = 16;

/// A source that can be read at an arbitrary offset without disturbing any
/// implicit file position — the Rust analogue of the source's `pread`
/// collaborator contract (`spec.md` section 6).
pub trait PositionedRead {
    fn pread(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize>;
}

impl PositionedRead for std::fs::File {
    #[cfg(unix)]
    fn pread(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn pread(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }
}

impl PositionedRead for [u8] {
    fn pread(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        let offset = offset as usize;
        if offset >= self.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.len() - offset);
        buf[..n].copy_from_slice(&self[offset..offset + n]);
        Ok(n)
    }
}

impl PositionedRead for Vec<u8> {
    fn pread(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        self.as_slice().pread(buf, offset)
    }
}

pub(crate) fn pread_exact<S: PositionedRead + ?Sized>(
    source: &S,
    buf: &mut [u8],
    offset: u64,
) -> Result<()> {
    let n = source.pread(buf, offset)?;
    if n != buf.len() {
        return Err(LipError::ShortRead { want: buf.len(), got: n });
    }
    Ok(())
}

pub struct Reader {
    names: BTreeMap<Box<[u8]>, usize>,
    names_by_handle: Vec<Box<[u8]>>,
    cards: Vec<FileCard>,
}

impl Reader {
    pub fn open<S: PositionedRead + ?Sized>(source: &S, file_size: i64) -> Result<Self> {
        let mut header = [0u8; HEADER_SIZE];
        pread_exact(source, &mut header, 0)?;
        read_header(&header[..])?;

        let max = file_size - TRAILER_SIZE as i64;
        if max < 0 {
            return Err(LipError::TrailerOutOfRange { index_start: 0, bss_start: 0, file_size, max });
        }

        let mut trailer = [0u8; TRAILER_SIZE];
        pread_exact(source, &mut trailer, max as u64)?;
        let index_start = i64::from_le_bytes(trailer[0..8].try_into().unwrap());
        let bss_start = i64::from_le_bytes(trailer[8..16].try_into().unwrap());

        // Validate before any allocation is sized from these untrusted values —
        // a corrupt trailer must fail with a typed error, not abort the process
        // via an underflowed `usize` allocation size.
        if bss_start < 0 || bss_start > index_start || index_start > max {
            return Err(LipError::TrailerOutOfRange { index_start, bss_start, file_size, max });
        }
        if bss_start % 8 != 0 {
            return Err(LipError::Misaligned { what: "bss_start", offset: bss_start });
        }
        if index_start % 8 != 0 {
            return Err(LipError::Misaligned { what: "index_start", offset: index_start });
        }

        let tail_len = (file_size - TRAILER_SIZE as i64 - bss_start) as usize;
        let mut tail = vec![0u8; tail_len];
        pread_exact(source, &mut tail, bss_start as u64)?;

        let index_offset_in_tail = (index_start - bss_start) as usize;
        let index_len = tail_len - index_offset_in_tail;
        if index_len % CARD_SIZE != 0 {
            return Err(LipError::IndexLengthNotAligned { len: index_len as i64 });
        }
        let count = index_len / CARD_SIZE;

        let mut cards = Vec::with_capacity(count);
        let mut names = BTreeMap::new();
        let mut names_by_handle = vec![Box::from(&b""[..]); count];
        for i in 0..count {
            let card_start = index_offset_in_tail + i * CARD_SIZE;
            let raw: [u8; CARD_SIZE] = tail[card_start..card_start + CARD_SIZE].try_into().unwrap();
            let card = FileCard::from_bytes(&raw);
            if card.is_lz4_compressed() && !matches!(card.ftype(), Ok(crate::card::FType::RegularFile)) {
                return Err(LipError::CompressedFlagOnNonRegularFile);
            }

            let name_offset = card.name_offset as usize;
            if name_offset >= index_offset_in_tail {
                return Err(LipError::NameOffsetOutOfRange {
                    offset: card.name_offset,
                    bss_len: index_offset_in_tail,
                });
            }
            let nul = tail[name_offset..index_offset_in_tail]
                .iter()
                .position(|&b| b == 0)
                .map(|p| name_offset + p)
                .unwrap_or(index_offset_in_tail);
            let name: Box<[u8]> = tail[name_offset..nul].into();

            names.insert(name.clone(), i);
            names_by_handle[i] = name;
            cards.push(card);
        }

        Ok(Reader { names, names_by_handle, cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Returns the handle for `name`, or `None` — a lookup miss is a
    /// normal negative result, not an error (`spec.md` section 7).
    pub fn find(&self, name: &[u8]) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn get(&self, handle: usize) -> Option<&FileCard> {
        self.cards.get(handle)
    }

    pub fn name_of(&self, handle: usize) -> Option<&[u8]> {
        self.names_by_handle.get(handle).map(|n| n.as_ref())
    }

    /// Ascending lexicographic `(name, card)` pairs — matches on-disk order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &FileCard)> {
        self.names.iter().map(move |(name, &h)| (name.as_ref(), &self.cards[h]))
    }
}
