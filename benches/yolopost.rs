use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use yolopost::lowlevel::pack_rgb;
use yolopost::{decode, normalize, suppress, PixelFrame, RawOutput};

const SIDE: usize = 640;
const CLASSES: usize = 80;
const CANDIDATES: usize = 8400;

fn make_frame(side: usize) -> Vec<u32> {
    let mut data = Vec::with_capacity(side * side);
    for y in 0..side {
        for x in 0..side {
            let r = ((x * 13) ^ (y * 7)) & 0xFF;
            let g = (x * y) & 0xFF;
            let b = (x + y) & 0xFF;
            data.push(pack_rgb(r as u8, g as u8, b as u8));
        }
    }
    data
}

/// Class-major output with a few confident clusters and low-score noise.
fn make_output() -> Vec<f32> {
    let rows = 4 + CLASSES;
    let mut data = vec![0.0f32; rows * CANDIDATES];
    for j in 0..CANDIDATES {
        let cluster = j % 40;
        let jitter = (j % 7) as f32;
        data[j] = 40.0 + (cluster % 8) as f32 * 70.0 + jitter;
        data[CANDIDATES + j] = 40.0 + (cluster / 8) as f32 * 110.0 + jitter;
        data[2 * CANDIDATES + j] = 48.0 + jitter;
        data[3 * CANDIDATES + j] = 64.0 - jitter;
        let class = cluster % CLASSES;
        let score = if j % 3 == 0 { 0.5 + (j % 50) as f32 / 100.0 } else { 0.1 };
        data[(4 + class) * CANDIDATES + j] = score;
    }
    data
}

fn bench_pipeline(c: &mut Criterion) {
    let pixels = make_frame(SIDE);
    let frame = PixelFrame::from_slice(&pixels, SIDE).unwrap();

    c.bench_function("normalize_640", |b| {
        b.iter(|| black_box(normalize(frame, SIDE).unwrap()));
    });

    #[cfg(feature = "rayon")]
    {
        c.bench_function("normalize_640_parallel", |b| {
            b.iter(|| black_box(yolopost::normalize_par(frame, SIDE).unwrap()));
        });
    }

    let output = make_output();
    let raw = RawOutput::from_slice(&output, 4 + CLASSES, CANDIDATES).unwrap();

    c.bench_function("decode_84x8400", |b| {
        b.iter(|| black_box(decode(raw, CLASSES, SIDE, 0.45).unwrap()));
    });

    let candidates = decode(raw, CLASSES, SIDE, 0.45).unwrap();
    c.bench_function("suppress_80_classes", |b| {
        b.iter(|| black_box(suppress(&candidates, CLASSES, 0.5).unwrap()));
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
