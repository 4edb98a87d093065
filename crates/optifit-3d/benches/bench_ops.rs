use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Affine3A, Vec3};

use optifit_3d::calibration::project_and_calibrate;
use optifit_3d::camera::{CameraIntrinsic, ViewCamera};
use optifit_3d::segment::oriented_segment;

fn bench_oriented_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("oriented_segment");

    let from = Vec3::new(-0.031, 0.002, -0.004);
    let to = Vec3::new(0.031, 0.001, 0.003);

    group.bench_function(BenchmarkId::new("cylinder", ""), |b| {
        b.iter(|| oriented_segment(black_box(from), black_box(to)))
    });

    group.bench_function(BenchmarkId::new("point", ""), |b| {
        b.iter(|| oriented_segment(black_box(from), black_box(from)))
    });

    group.finish();
}

fn bench_project_and_calibrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_and_calibrate");

    let camera = ViewCamera::new(
        CameraIntrinsic {
            fx: 1450.0,
            fy: 1450.0,
            cx: 207.0,
            cy: 448.0,
        },
        Affine3A::IDENTITY,
    );
    let world_from_face = Affine3A::from_translation(Vec3::new(0.0, 0.0, 0.35));
    let spans = [
        (Vec3::new(-0.032, 0.006, 0.0), Vec3::new(-0.032, -0.004, 0.0)),
        (Vec3::new(-0.030, 0.006, 0.0), Vec3::new(-0.030, -0.004, 0.0)),
        (Vec3::new(0.032, 0.006, 0.0), Vec3::new(0.032, -0.004, 0.0)),
        (Vec3::new(0.030, 0.006, 0.0), Vec3::new(0.030, -0.004, 0.0)),
    ];

    group.bench_function(BenchmarkId::new("four_spans", ""), |b| {
        b.iter(|| {
            spans
                .iter()
                .filter_map(|(start, end)| {
                    project_and_calibrate(
                        black_box(&camera),
                        black_box(&world_from_face),
                        *start,
                        *end,
                    )
                })
                .sum::<f32>()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_oriented_segment, bench_project_and_calibrate);
criterion_main!(benches);
