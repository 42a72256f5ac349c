use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array3;
use sg_core::{DescriptorGrid, ImageSize, ScoreGrid};
use sg_superpoint::{extract_candidates, non_maximum_suppression, sample_descriptors};

const WORKING: ImageSize = ImageSize::new(640, 480);

/// Score grid with a smooth background and a lattice of blobs.
fn create_score_grid(spacing: usize) -> ScoreGrid {
    ScoreGrid::from_shape_fn((WORKING.height, WORKING.width), |(y, x)| {
        let dy = (y % spacing) as f32 - spacing as f32 / 2.0;
        let dx = (x % spacing) as f32 - spacing as f32 / 2.0;
        let blob = (-(dx * dx + dy * dy) / 8.0).exp();
        0.005 + 0.2 * blob + ((x * 7 + y * 13) % 11) as f32 * 1e-4
    })
}

fn create_descriptor_grid() -> DescriptorGrid {
    Array3::from_shape_fn((256, WORKING.height / 8, WORKING.width / 8), |(c, y, x)| {
        ((c * 31 + y * 17 + x * 7) % 97) as f32 / 97.0 - 0.4
    })
}

fn bench_candidate_extraction(c: &mut Criterion) {
    let scores = create_score_grid(12);
    c.bench_function("extract_candidates_640x480", |b| {
        b.iter(|| extract_candidates(black_box(&scores), None, 0.015, 4).unwrap())
    });
}

fn bench_nms(c: &mut Criterion) {
    let mut group = c.benchmark_group("nms");
    for spacing in [6, 12, 24] {
        let scores = create_score_grid(spacing);
        let candidates = extract_candidates(&scores, None, 0.015, 4).unwrap();
        group.bench_with_input(
            BenchmarkId::new("radius_4", candidates.len()),
            &candidates,
            |b, candidates| {
                b.iter(|| {
                    non_maximum_suppression(black_box(candidates.clone()), WORKING.height, WORKING.width, 4)
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_descriptor_sampling(c: &mut Criterion) {
    let grid = create_descriptor_grid();
    let scores = create_score_grid(12);
    let candidates = extract_candidates(&scores, None, 0.015, 4).unwrap();
    let keypoints = non_maximum_suppression(candidates, WORKING.height, WORKING.width, 4).unwrap();

    let mut group = c.benchmark_group("descriptor_sampling");
    for align_corners in [true, false] {
        group.bench_function(format!("align_corners_{}", align_corners), |b| {
            b.iter(|| sample_descriptors(black_box(&grid), &keypoints, WORKING, align_corners).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_candidate_extraction,
    bench_nms,
    bench_descriptor_sampling
);
criterion_main!(benches);
