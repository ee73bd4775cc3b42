#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use yolopost::lowlevel::pack_rgb;
use yolopost::{
    normalize, normalize_par, suppress, suppress_par, BoundingBox, Detection, PixelFrame,
};

fn make_frame(side: usize) -> Vec<u32> {
    let mut data = Vec::with_capacity(side * side);
    for y in 0..side {
        for x in 0..side {
            let r = ((x * 11) ^ (y * 3)) & 0xFF;
            let g = (x * y) & 0xFF;
            let b = (x + 2 * y) & 0xFF;
            data.push(pack_rgb(r as u8, g as u8, b as u8));
        }
    }
    data
}

#[test]
fn parallel_normalize_matches_sequential() {
    let side = 97;
    let data = make_frame(side);
    let frame = PixelFrame::from_slice(&data, side).unwrap();

    let seq = normalize(frame, side).unwrap();
    let par = normalize_par(frame, side).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn parallel_suppress_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(99);
    let classes = 8;
    let candidates: Vec<Detection> = (0..2000)
        .map(|_| {
            let left = rng.random_range(0.0f32..560.0);
            let top = rng.random_range(0.0f32..560.0);
            let size = rng.random_range(4.0f32..79.0);
            Detection {
                class_index: rng.random_range(0..classes),
                score: rng.random_range(0.46f32..1.0),
                bbox: BoundingBox::new(left, top, left + size, top + size).unwrap(),
            }
        })
        .collect();

    let seq = suppress(&candidates, classes, 0.5).unwrap();
    let par = suppress_par(&candidates, classes, 0.5).unwrap();
    assert_eq!(seq, par);
}
