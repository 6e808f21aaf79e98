use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lip::codec::{lz4_pass, raw_pass};
use lip::hash::Hasher;
use lip::packer::{Features, Packer};

fn bench_pack(c: &mut Criterion) {
    let data = vec![0x5au8; 1024 * 1024];

    c.bench_function("raw_pass_1mb", |b| {
        b.iter(|| {
            let mut sink = Vec::new();
            let mut hasher = Hasher::new();
            raw_pass(Cursor::new(black_box(&data)), &mut sink, &mut hasher).unwrap();
        })
    });

    c.bench_function("lz4_pass_1mb", |b| {
        b.iter(|| {
            let mut sink = Vec::new();
            lz4_pass(Cursor::new(black_box(&data)), &mut sink).unwrap();
        })
    });

    c.bench_function("pack_1000_members", |b| {
        b.iter(|| {
            let mut packer: Packer<Vec<u8>> = Packer::new();
            packer.start(Vec::new()).unwrap();
            for i in 0..1000 {
                let name = format!("members/file-{i:04}");
                packer
                    .add_regular_file(name.as_bytes(), 0, Cursor::new(b"payload"), Features::NONE)
                    .unwrap();
            }
            black_box(packer.finish().unwrap());
        })
    });
}

criterion_group!(benches, bench_pack);
criterion_main!(benches);
