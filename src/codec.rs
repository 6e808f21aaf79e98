//! RawPass and Lz4Pass: the two ways a member's bytes get from an
//! `io::Read` source into the Data region.
//!
//! Both passes consume the source in fixed 64 KiB chunks (`spec.md`
//! section 4.2/4.3). RawPass forwards bytes unchanged while feeding a
//! running digest; Lz4Pass frames each chunk as an independent LZ4 block
//! preceded by its compressed length, tracking the cumulative uncompressed
//! size instead of a digest.

use std::io::{Read, Write};

use crate::error::{LipError, Result};
use crate::hash::Hasher;

/// Every chunk a pass reads from the source, and the unit an Lz4Pass frame
/// compresses independently. Fixed by the format, not configurable — see
/// SPEC_FULL.md section 4.10.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Copies `reader` to `sink` verbatim, in `CHUNK_SIZE` chunks, feeding
/// every byte through `hasher`. Returns the number of bytes written to
/// `sink` (equal to bytes read, since nothing is transformed).
pub fn raw_pass<R: Read, W: Write>(
    mut reader: R,
    mut sink: W,
    hasher: &mut Hasher,
) -> Result<i64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0i64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        sink.write_all(&buf[..n])?;
        total += n as i64;
    }
    Ok(total)
}

/// Compresses `reader`'s content into independent 64 KiB LZ4 blocks,
/// writing each as a `[i32 LE compressed_len][payload]` frame to `sink`.
/// Returns the cumulative uncompressed length (`original_size`).
///
/// Each block is compressed on its own, with no cross-block dictionary —
/// a deliberate simplification of the source's double-buffered streaming
/// compressor; see SPEC_FULL.md section 4 for the rationale. Decoding is
/// unaffected either way since each frame is self-describing.
pub fn lz4_pass<R: Read, W: Write>(mut reader: R, mut sink: W) -> Result<i64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut original_size = 0i64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        let compressed = lz4_flex::block::compress(&buf[..n]);
        let len: i32 = compressed
            .len()
            .try_into()
            .map_err(|_| LipError::TruncatedFrame { need: compressed.len(), have: 0 })?;
        sink.write_all(&len.to_le_bytes())?;
        sink.write_all(&compressed)?;
        original_size += n as i64;
    }
    Ok(original_size)
}

/// Decodes one `[i32 len][payload]` LZ4 frame whose compressed bytes were
/// produced by [`lz4_pass`], writing the decompressed chunk to `sink`.
/// `frame` must contain exactly the frame's compressed payload (the
/// length prefix has already been consumed by the caller).
pub fn decode_frame<W: Write>(frame: &[u8], sink: &mut W) -> Result<()> {
    let decompressed = lz4_flex::block::decompress(frame, CHUNK_SIZE)
        .map_err(|_| LipError::TruncatedFrame { need: CHUNK_SIZE, have: frame.len() })?;
    sink.write_all(&decompressed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn raw_pass_roundtrips_and_hashes() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(200);
        let mut sink = Vec::new();
        let mut hasher = Hasher::new();
        let n = raw_pass(Cursor::new(&data), &mut sink, &mut hasher).unwrap();
        assert_eq!(n as usize, data.len());
        assert_eq!(sink, data);
        assert_eq!(hasher.finalize(), crate::hash::digest(&data));
    }

    #[test]
    fn lz4_pass_roundtrips_through_decode_frame() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".repeat(500);
        let mut compressed = Vec::new();
        let original_size = lz4_pass(Cursor::new(&data), &mut compressed).unwrap();
        assert_eq!(original_size as usize, data.len());

        let mut cursor = Cursor::new(&compressed[..]);
        let mut out = Vec::new();
        loop {
            let mut len_buf = [0u8; 4];
            match std::io::Read::read(&mut cursor, &mut len_buf) {
                Ok(0) => break,
                Ok(4) => {}
                _ => panic!("short frame length"),
            }
            let len = i32::from_le_bytes(len_buf) as usize;
            let mut payload = vec![0u8; len];
            std::io::Read::read_exact(&mut cursor, &mut payload).unwrap();
            decode_frame(&payload, &mut out).unwrap();
        }
        assert_eq!(out, data);
    }
}
