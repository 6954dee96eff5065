use criterion::{black_box, criterion_group, criterion_main, Criterion};
use seqconv::{Family, LabelTable, SequenceContainer};

fn sample(payload_len: usize, label_count: usize) -> SequenceContainer {
    let mut c = SequenceContainer::new(Family::F);
    c.payload = (0..payload_len).map(|i| (i % 251) as u8 + 1).collect();
    c.labels = LabelTable::from_pairs((0..label_count).map(|i| (format!("label_{i}"), (i * 16) as u32))).unwrap();
    c
}

fn bench_write(c: &mut Criterion) {
    let small = sample(4 * 1024, 16);
    let large = sample(1024 * 1024, 512);

    c.bench_function("write_4k_16_labels", |b| b.iter(|| black_box(&small).to_bytes().unwrap()));
    c.bench_function("write_1mb_512_labels", |b| b.iter(|| black_box(&large).to_bytes().unwrap()));
}

fn bench_read(c: &mut Criterion) {
    let bytes = sample(1024 * 1024, 512).to_bytes().unwrap();

    c.bench_function("read_1mb_512_labels", |b| {
        b.iter(|| SequenceContainer::read(black_box(&bytes)).unwrap())
    });
}

criterion_group!(benches, bench_write, bench_read);
criterion_main!(benches);
