//! # lip — read-optimized single-file archive container
//!
//! Format guarantees, frozen at the single magic epoch this crate
//! recognizes:
//! - All numeric fields are little-endian; there is no format-version
//!   negotiation, just a fixed magic (`b"LIP\0"`) plus epoch tag
//! - The Data region holds raw or LZ4-framed member content; names live
//!   in a separate BSS region; a fixed 64-byte `FileCard` per member
//!   lives in the Index region, all three walked in the same ascending
//!   lexicographic name order
//! - A 16-byte trailer at the end of the file is the only thing a reader
//!   needs to find everything else: `[index_start, bss_start]`
//! - Uncompressed regular files and symlinks carry a BLAKE2b-224 digest
//!   of their content; compressed regular files carry a cumulative
//!   uncompressed size instead
//! - Lookup by name is O(log N) and a miss is `None`, not an error

pub mod archive;
pub mod card;
pub mod codec;
pub mod content;
pub mod error;
pub mod hash;
pub mod packer;
pub mod reader;
pub mod trie;
pub mod walk;

pub use archive::{pack_directories, unpack_archive};
pub use card::{FType, FileCard, FileInfo, CARD_SIZE, EPOCH, MAGIC};
pub use content::{Content, MAX_RETRIEVE_SIZE};
pub use error::{LipError, Result};
pub use packer::{Features, Packer};
pub use reader::{PositionedRead, Reader};
