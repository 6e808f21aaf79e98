//! The streaming write pipeline: `Packer::start` → any number of
//! `add_directory`/`add_symlink`/`add_regular_file` calls → `finish`.
//!
//! Mirrors the state-machine shape of the teacher's `Superblock` writer
//! (Idle → Started → Done, misuse outside that order is an error rather
//! than a panic) while implementing `spec.md` section 4.5's exact
//! five-step `finish()` algorithm.

use std::io::Write;

use crate::card::{align_up, write_header, FType, FileCard, FileInfo, CARD_SIZE, HEADER_SIZE};
use crate::codec::{lz4_pass, raw_pass};
use crate::error::{LipError, Result};
use crate::hash::{self, Hasher};
use crate::trie::NameTrie;

pub use crate::card::{Features, FEATURE_EXECUTABLE, FEATURE_LZ4_COMPRESSED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Started,
    Done,
}

/// Counts bytes passed through `write_all` without otherwise touching
/// them, so a codec pass's actual stored length can be recovered without
/// every pass having to report it itself.
struct CountingWriter<'a, W: Write> {
    inner: &'a mut W,
    count: i64,
}

impl<'a, W: Write> Write for CountingWriter<'a, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as i64;
        Ok(n)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

pub struct Packer<W: Write> {
    state: State,
    sink: Option<W>,
    cursor: i64,
    names: NameTrie,
    cards: Vec<FileCard>,
}

impl<W: Write> Packer<W> {
    pub fn new() -> Self {
        Packer { state: State::Idle, sink: None, cursor: 0, names: NameTrie::new(), cards: Vec::new() }
    }

    /// Writes the 8-byte header and transitions Idle → Started.
    pub fn start(&mut self, mut sink: W) -> Result<()> {
        if self.state != State::Idle {
            return Err(LipError::PackerMisuse);
        }
        write_header(&mut sink)?;
        self.sink = Some(sink);
        self.cursor = HEADER_SIZE as i64;
        self.state = State::Started;
        Ok(())
    }

    fn require_started(&mut self) -> Result<&mut W> {
        if self.state != State::Started {
            return Err(LipError::PackerMisuse);
        }
        self.sink.as_mut().ok_or(LipError::PackerMisuse)
    }

    fn push_card(&mut self, name: &[u8], card: FileCard) -> usize {
        let handle = self.names.insert(name);
        if handle == self.cards.len() {
            self.cards.push(card);
        } else {
            self.cards[handle] = card;
        }
        handle
    }

    /// Directories carry no content; only a name and an mtime.
    pub fn add_directory(&mut self, name: &[u8], mtime: i64) -> Result<()> {
        self.require_started()?;
        self.push_card(name, FileCard::directory(mtime));
        Ok(())
    }

    /// A symlink's "content" is its target path, digested and stored like
    /// an uncompressed regular file but tagged with the symlink type bit.
    pub fn add_symlink(&mut self, name: &[u8], mtime: i64, target: &[u8]) -> Result<()> {
        let sink = self.require_started()?;
        let begin = self.cursor;
        sink.write_all(target)?;
        self.cursor += target.len() as i64;
        let digest = hash::digest(target);
        let card = FileCard {
            name_offset: 0,
            info: FileInfo::Digest { flag: FType::Symlink.tag(), digest },
            mtime,
            begin,
            end: self.cursor,
        };
        self.push_card(name, card);
        Ok(())
    }

    /// Streams `reader`'s bytes into the Data region, optionally through
    /// LZ4, recording a digest or an `original_size` depending on which.
    pub fn add_regular_file<R: std::io::Read>(
        &mut self,
        name: &[u8],
        mtime: i64,
        mut reader: R,
        features: Features,
    ) -> Result<()> {
        let flag = FType::RegularFile.tag() | features.0;
        let sink = self.require_started()?;
        let begin = self.cursor;
        let info = if features.is_lz4_compressed() {
            let mut counting = CountingWriter { inner: sink, count: 0 };
            let original_size = lz4_pass(&mut reader, &mut counting)?;
            self.cursor += counting.count;
            FileInfo::Lz4 { flag, original_size }
        } else {
            let mut counting = CountingWriter { inner: sink, count: 0 };
            let mut hasher = Hasher::new();
            raw_pass(&mut reader, &mut counting, &mut hasher)?;
            self.cursor += counting.count;
            FileInfo::Digest { flag, digest: hasher.finalize() }
        };
        let card = FileCard { name_offset: 0, info, mtime, begin, end: self.cursor };
        self.push_card(name, card);
        Ok(())
    }

    fn write_padding(sink: &mut W, cursor: i64, target: i64) -> Result<()> {
        let pad = (target - cursor) as usize;
        if pad > 0 {
            sink.write_all(&vec![0u8; pad])?;
        }
        Ok(())
    }

    /// Writes the BSS and Index regions and the trailer, per `spec.md`
    /// section 4.5: align to 8, pad, emit names in trie order (patching
    /// each card's `name_offset` as it goes), align to 8 again, pad, emit
    /// cards in the same trie order, then the trailer.
    pub fn finish(mut self) -> Result<W> {
        if self.state != State::Started {
            return Err(LipError::PackerMisuse);
        }
        let mut sink = self.sink.take().ok_or(LipError::PackerMisuse)?;

        let order: Vec<(Box<[u8]>, usize)> =
            self.names.enumerate().map(|(n, h)| (n.into(), h)).collect();

        let bss_start = align_up(self.cursor, 8);
        Self::write_padding(&mut sink, self.cursor, bss_start)?;
        let mut name_cursor = 0i64;
        for (name, handle) in &order {
            self.cards[*handle].name_offset = name_cursor;
            sink.write_all(name)?;
            sink.write_all(&[0u8])?;
            name_cursor += name.len() as i64 + 1;
        }
        self.cursor = bss_start + name_cursor;

        let index_start = align_up(self.cursor, 8);
        Self::write_padding(&mut sink, self.cursor, index_start)?;
        for (_, handle) in &order {
            sink.write_all(&self.cards[*handle].to_bytes())?;
        }
        self.cursor = index_start + (order.len() * CARD_SIZE) as i64;

        sink.write_all(&index_start.to_le_bytes())?;
        sink.write_all(&bss_start.to_le_bytes())?;

        self.state = State::Done;
        Ok(sink)
    }
}

impl<W: Write> Default for Packer<W> {
    fn default() -> Self {
        Self::new()
    }
}
