//! # Desaturated Discretization Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use nalgebra::Vector2;

use swerve_lib::{desat::desaturated_discretize, kinematics::ChassisSpeeds};

fn desat_benchmark(c: &mut Criterion) {
    let dt_s = 0.02;

    let square = [
        Vector2::new(0.3, 0.3),
        Vector2::new(0.3, -0.3),
        Vector2::new(-0.3, 0.3),
        Vector2::new(-0.3, -0.3),
    ];
    let in_line = [Vector2::new(1.0, 0.0); 4];

    c.bench_function("desat unsaturated", |b| {
        b.iter(|| {
            desaturated_discretize(
                black_box(ChassisSpeeds::new(1.0, 0.5, 1.0)),
                black_box(dt_s),
                black_box(4.5),
                &square,
            )
        })
    });

    c.bench_function("desat curved all saturated", |b| {
        b.iter(|| {
            desaturated_discretize(
                black_box(ChassisSpeeds::new(6.0, 3.0, 8.0)),
                black_box(dt_s),
                black_box(4.5),
                &square,
            )
        })
    });

    c.bench_function("desat reverse slope", |b| {
        b.iter(|| {
            desaturated_discretize(
                black_box(ChassisSpeeds::new(6.0, -20.0, 20.0)),
                black_box(dt_s),
                black_box(2.0),
                &in_line,
            )
        })
    });

    c.bench_function("desat zero speed limit", |b| {
        b.iter(|| {
            desaturated_discretize(
                black_box(ChassisSpeeds::new(1.0, -1.0, 0.5)),
                black_box(dt_s),
                black_box(0.0),
                &square,
            )
        })
    });
}

criterion_group!(benches, desat_benchmark);
criterion_main!(benches);
