//! Benchmarks for the retargeting hot path

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use glam::Vec3;

use akira_core::{FrameTime, HolisticFrame};
use akira_filter::{GaussianVectorFilter, KalmanVectorFilter, OneEuroFilter};
use akira_retarget::RetargetEngine;
use akira_test::{Choreography, SyntheticPerformer};

fn bench_engine_update(c: &mut Criterion) {
    let performer = SyntheticPerformer::new(30.0, Choreography::Dance);
    let frames: Vec<HolisticFrame> = (0..300)
        .map(|i| HolisticFrame::parse(performer.frame(i)))
        .collect();
    let mut engine = RetargetEngine::with_defaults().unwrap();
    let mut tick = 0i64;

    let mut group = c.benchmark_group("engine_update");
    group.throughput(Throughput::Elements(1));

    group.bench_function("full_frame", |b| {
        b.iter(|| {
            tick += 1;
            let frame = &frames[tick as usize % frames.len()];
            engine
                .update(black_box(frame), FrameTime::from_micros(tick * 33_333))
                .unwrap()
        })
    });

    let empty = HolisticFrame::empty();
    group.bench_function("empty_frame", |b| {
        b.iter(|| {
            tick += 1;
            engine
                .update(black_box(&empty), FrameTime::from_micros(tick * 33_333))
                .unwrap()
        })
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let result = SyntheticPerformer::new(30.0, Choreography::Dance).frame(0);

    c.bench_function("holistic_parse", |b| {
        b.iter(|| HolisticFrame::parse(black_box(result.clone())))
    });
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");
    let sample = Vec3::new(0.1, 0.5, -0.2);

    let mut one_euro = OneEuroFilter::new(1.5, 0.8);
    let mut t = 0.0f64;
    group.bench_function("one_euro", |b| {
        b.iter(|| {
            t += 1.0 / 30.0;
            one_euro.next(t, black_box(sample))
        })
    });

    let mut kalman = KalmanVectorFilter::new(1.0, 1.0);
    group.bench_function("kalman", |b| b.iter(|| kalman.next(black_box(sample))));

    let mut gaussian = GaussianVectorFilter::new(5, 1.0).unwrap();
    group.bench_function("gaussian_5", |b| b.iter(|| gaussian.next(black_box(sample))));

    group.finish();
}

criterion_group!(benches, bench_engine_update, bench_parse, bench_filters);
criterion_main!(benches);
