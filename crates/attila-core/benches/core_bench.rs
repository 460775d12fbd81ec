//! Criterion benchmarks for attila-core DSP primitives
//!
//! Run with: cargo bench -p attila-core
#![allow(missing_docs)]

use attila_core::{
    BandSplitter, Curve, Effect, LogSmoothedParam, OversampleFactor, Oversampler, SmoothedParam,
    bitcrush, bitcrush_shaped, soft_clip_knee,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_shaper(c: &mut Criterion) {
    let mut group = c.benchmark_group("Shaper");
    let input = generate_test_signal(1024);

    group.bench_function("soft_clip_knee", |b| {
        b.iter(|| {
            for &x in &input {
                black_box(soft_clip_knee(black_box(x), 4.0, 2.5));
            }
        });
    });

    for curve in Curve::ALL {
        group.bench_with_input(BenchmarkId::new("curve", curve.label()), &curve, |b, &curve| {
            b.iter(|| {
                for &x in &input {
                    black_box(curve.apply(black_box(x), 4.0, 2.5));
                }
            });
        });
    }

    group.bench_function("bitcrush", |b| {
        b.iter(|| {
            for &x in &input {
                black_box(bitcrush(black_box(x), 8));
            }
        });
    });

    group.bench_function("bitcrush_shaped", |b| {
        b.iter(|| {
            for &x in &input {
                black_box(bitcrush_shaped(black_box(x), 8, 0.5));
            }
        });
    });

    group.finish();
}

fn bench_smoothers(c: &mut Criterion) {
    let mut group = c.benchmark_group("Smoothers");

    group.bench_function("SmoothedParam", |b| {
        let mut p = SmoothedParam::standard(0.0, SAMPLE_RATE);
        b.iter(|| {
            p.set_target(black_box(1.0));
            for _ in 0..1024 {
                black_box(p.advance());
            }
            p.set_target(black_box(0.0));
        });
    });

    group.bench_function("LogSmoothedParam", |b| {
        let mut p = LogSmoothedParam::with_config(0.0, SAMPLE_RATE, 20.0, 20.0);
        b.iter(|| {
            p.set_value(black_box(1.0));
            for _ in 0..1024 {
                black_box(p.advance());
            }
            p.set_value(black_box(0.0));
        });
    });

    group.finish();
}

fn bench_splitter(c: &mut Criterion) {
    let mut group = c.benchmark_group("BandSplitter");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(
            BenchmarkId::new("split", block_size),
            &block_size,
            |b, _| {
                let mut splitter = BandSplitter::new(SAMPLE_RATE, 1, 440.0, 5000.0);
                b.iter(|| {
                    for &x in &input {
                        black_box(splitter.split(0, black_box(x)));
                    }
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("split_swept", block_size),
            &block_size,
            |b, _| {
                let mut splitter = BandSplitter::new(SAMPLE_RATE, 1, 440.0, 5000.0);
                b.iter(|| {
                    for (i, &x) in input.iter().enumerate() {
                        splitter.set_cutoffs(440.0 + i as f32, 5000.0);
                        black_box(splitter.split(0, black_box(x)));
                    }
                });
            },
        );
    }

    group.finish();
}

struct Passthrough;

impl Effect for Passthrough {
    fn process_block(&mut self, _buffer: &mut [f32], _num_channels: usize, _num_samples: usize) {}

    fn reset(&mut self) {}
}

fn bench_oversampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oversampler");

    for factor in [OversampleFactor::X2, OversampleFactor::X4, OversampleFactor::X8] {
        let block_size = 512;
        let mut left = generate_test_signal(block_size);
        let mut right = generate_test_signal(block_size);
        group.bench_with_input(
            BenchmarkId::new("round_trip", factor.multiplier()),
            &factor,
            |b, &factor| {
                let mut os = Oversampler::new(factor);
                os.prepare(2, block_size);
                b.iter(|| {
                    let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
                    os.process(&mut Passthrough, &mut channels);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_shaper,
    bench_smoothers,
    bench_splitter,
    bench_oversampler
);
criterion_main!(benches);
