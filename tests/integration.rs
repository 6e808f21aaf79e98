//! End-to-end scenarios against the public API: pack with `Packer`, read
//! back with `Reader`/`Content`, and check the exact byte-level shape the
//! format guarantees.

use std::io::Cursor;

use lip::card::{CARD_SIZE, EPOCH, MAGIC};
use lip::codec::lz4_pass;
use lip::content::Content;
use lip::hash;
use lip::packer::{Features, Packer};
use lip::reader::Reader;

fn packed(f: impl FnOnce(&mut Packer<Vec<u8>>)) -> Vec<u8> {
    let mut packer = Packer::new();
    packer.start(Vec::new()).unwrap();
    f(&mut packer);
    packer.finish().unwrap()
}

#[test]
fn empty_archive_is_24_bytes() {
    let bytes = packed(|_| {});
    assert_eq!(bytes.len(), 24);
    // trailer = [index_start, bss_start], both 8 for an empty archive.
    let index_start = i64::from_le_bytes(bytes[8..16].try_into().unwrap());
    let bss_start = i64::from_le_bytes(bytes[16..24].try_into().unwrap());
    assert_eq!(index_start, 8);
    assert_eq!(bss_start, 8);
    assert_eq!(&bytes[8..16], &bytes[16..24]);
}

#[test]
fn header_shape_is_exact() {
    let bytes = packed(|_| {});
    assert_eq!(&bytes[0..8], b"LIP\0\x33\xec\x08\x00");
    assert_eq!(&bytes[0..4], &MAGIC);
    assert_eq!(i32::from_le_bytes(bytes[4..8].try_into().unwrap()), EPOCH);
}

#[test]
fn symlink_and_directory_layout_and_digest() {
    let bytes = packed(|p| {
        p.add_symlink(b"tmp/self", 1, b"../tmp").unwrap();
        p.add_directory(b"tmp", 2).unwrap();
    });
    assert_eq!(bytes.len(), 32 + CARD_SIZE * 2 + 16);

    let reader = Reader::open(bytes.as_slice(), bytes.len() as i64).unwrap();
    let names: Vec<&[u8]> = reader.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec![b"tmp".as_ref(), b"tmp/self".as_ref()]);

    let self_handle = reader.find(b"tmp/self").unwrap();
    let card = reader.get(self_handle).unwrap();
    let digest = match card.info {
        lip::card::FileInfo::Digest { digest, .. } => digest,
        _ => panic!("expected a digest-bearing card"),
    };
    assert_eq!(hex::encode(digest), "12e0296f8b9dba8f7f0be0614c67d108c160cba9ff496e256d98b1c2");
    assert_eq!(digest, hash::digest(b"../tmp"));

    let dir_handle = reader.find(b"tmp").unwrap();
    let dir_card = reader.get(dir_handle).unwrap();
    assert!(dir_card.is_directory());
    assert_eq!(dir_card.begin, 0);
    assert_eq!(dir_card.end, 0);
}

#[test]
fn executable_regular_file_and_its_symlink() {
    let payload = vec![7u8; 70_000];
    let bytes = packed(|p| {
        p.add_symlink(b"second", 1, b"first").unwrap();
        p.add_regular_file(b"first", 1, Cursor::new(&payload), Features::EXECUTABLE).unwrap();
    });
    assert_eq!(bytes.len(), 70_000 + 32 + CARD_SIZE * 2 + 16);

    let reader = Reader::open(bytes.as_slice(), bytes.len() as i64).unwrap();

    let first = reader.get(reader.find(b"first").unwrap()).unwrap();
    assert_eq!(first.ftype().unwrap(), lip::card::FType::RegularFile);
    assert!(first.is_executable());
    assert_eq!(first.size(), 70_000);

    let second = reader.get(reader.find(b"second").unwrap()).unwrap();
    assert_eq!(second.ftype().unwrap(), lip::card::FType::Symlink);
    assert_eq!(second.size(), 5);
}

#[test]
fn find_on_real_tree_member() {
    let content = vec![9u8; 1311];
    let bytes = packed(|p| {
        p.add_directory(b"3rdparty", 1).unwrap();
        p.add_directory(b"3rdparty/include", 1).unwrap();
        p.add_directory(b"3rdparty/include/cedar", 1).unwrap();
        p.add_regular_file(
            b"3rdparty/include/cedar/COPYING",
            1,
            Cursor::new(&content),
            Features::NONE,
        )
        .unwrap();
    });

    let reader = Reader::open(bytes.as_slice(), bytes.len() as i64).unwrap();

    let copying = reader.get(reader.find(b"3rdparty/include/cedar/COPYING").unwrap()).unwrap();
    assert_eq!(copying.ftype().unwrap(), lip::card::FType::RegularFile);
    assert_eq!(copying.size(), 1311);
    assert!(!copying.is_executable());

    assert!(reader.find(b"nonexistent").is_none());

    let root = reader.get(reader.find(b"3rdparty").unwrap()).unwrap();
    assert_eq!(root.ftype().unwrap(), lip::card::FType::Directory);
}

#[test]
fn lz4_round_trip_reports_original_size_and_frame_accounting() {
    let data = b"compress me please, over and over and over again. ".repeat(3000);
    let bytes = packed(|p| {
        p.add_regular_file(b"blob", 1, Cursor::new(&data), Features::LZ4_COMPRESSED).unwrap();
    });

    let reader = Reader::open(bytes.as_slice(), bytes.len() as i64).unwrap();
    let card = reader.get(reader.find(b"blob").unwrap()).unwrap();
    match card.info {
        lip::card::FileInfo::Lz4 { original_size, .. } => {
            assert_eq!(original_size as usize, data.len());
        }
        _ => panic!("expected an lz4 info view"),
    }

    let mut out = Vec::new();
    Content::copy(&bytes.as_slice(), card, &mut out).unwrap();
    assert_eq!(out, data);

    // stored size is the sum of every frame's (4-byte length + payload).
    let mut expected_stored = 0i64;
    let mut frame_accumulator = Vec::new();
    lz4_pass(Cursor::new(&data), &mut frame_accumulator).unwrap();
    expected_stored += frame_accumulator.len() as i64;
    assert_eq!(card.stored_size(), expected_stored);
}

#[test]
fn iter_yields_strictly_ascending_names() {
    let bytes = packed(|p| {
        p.add_directory(b"zebra", 1).unwrap();
        p.add_directory(b"apple", 1).unwrap();
        p.add_directory(b"mango", 1).unwrap();
    });
    let reader = Reader::open(bytes.as_slice(), bytes.len() as i64).unwrap();
    let names: Vec<Vec<u8>> = reader.iter().map(|(n, _)| n.to_vec()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn corrupt_trailer_is_rejected_without_huge_allocation() {
    let mut bytes = packed(|p| {
        p.add_directory(b"tmp", 2).unwrap();
    });
    let len = bytes.len();
    // Overwrite bss_start (last 8 bytes of the trailer) with a value far
    // past EOF; this must fail with a typed error, not attempt to
    // allocate a multi-exabyte buffer.
    bytes[len - 8..len].copy_from_slice(&(1_000_000_000_i64).to_le_bytes());
    let err = Reader::open(bytes.as_slice(), bytes.len() as i64).unwrap_err();
    assert!(matches!(err, lip::LipError::TrailerOutOfRange { .. }));
}

#[test]
fn truncated_file_trailer_is_rejected() {
    // Valid header, but the file is far too short to hold a 16-byte trailer.
    let mut bytes = Vec::new();
    lip::card::write_header(&mut bytes).unwrap();
    bytes.extend_from_slice(&[0u8; 2]);
    assert_eq!(bytes.len(), 10);
    let err = Reader::open(bytes.as_slice(), bytes.len() as i64).unwrap_err();
    assert!(matches!(err, lip::LipError::TrailerOutOfRange { .. }));
}

#[test]
fn every_member_round_trips_by_name() {
    let added = vec!["a", "b/c", "b/d", "zeta"];
    let bytes = packed(|p| {
        p.add_directory(b"b", 1).unwrap();
        for name in &added {
            if *name == "b/c" || *name == "b/d" {
                p.add_regular_file(name.as_bytes(), 1, Cursor::new(b"x"), Features::NONE).unwrap();
            } else {
                p.add_directory(name.as_bytes(), 1).unwrap();
            }
        }
    });
    let reader = Reader::open(bytes.as_slice(), bytes.len() as i64).unwrap();
    for name in &added {
        let handle = reader.find(name.as_bytes()).expect("name must be found");
        assert_eq!(reader.name_of(handle).unwrap(), name.as_bytes());
    }
}
