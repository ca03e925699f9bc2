use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fixpack_core::bitmap::encode_image;
use fixpack_core::heap::Heap;
use image::{DynamicImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noise_image(rng: &mut StdRng, w: u32, h: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(w, h, |_, _| Rgba([rng.random(), rng.random(), rng.random(), rng.random()]));
    DynamicImage::ImageRgba8(img)
}

fn bench_bitmap(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let sprite = noise_image(&mut rng, 96, 96);
    let artwork = noise_image(&mut rng, 475, 475);
    c.bench_function("dither_96_to_64", |b| b.iter(|| black_box(encode_image(&sprite, 64, 64))));
    c.bench_function("dither_475_to_64", |b| b.iter(|| black_box(encode_image(&artwork, 64, 64))));
}

fn bench_heap(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let words: Vec<String> = (0..2_000)
        .map(|_| (0..rng.random_range(4..24)).map(|_| rng.random_range(b'a'..=b'z') as char).collect())
        .collect();
    c.bench_function("intern_plain", |b| {
        b.iter(|| {
            let mut h = Heap::new("bench");
            for w in &words {
                black_box(h.intern_str(w));
            }
            h.len()
        })
    });
    c.bench_function("intern_dedup", |b| {
        b.iter(|| {
            let mut h = Heap::with_dedup("bench", words.len());
            for w in words.iter().chain(&words) {
                black_box(h.intern_str(w));
            }
            h.len()
        })
    });
}

criterion_group!(benches, bench_bitmap, bench_heap);
criterion_main!(benches);
