//! Benchmarks for per-frame work: timeline evaluation and graph propagation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kinema_animation::MotionPreset;
use kinema_core::{Color, MotionGraph, TransformChain};

fn benchmark_timeline_evaluate(c: &mut Criterion) {
    let timeline = MotionPreset::interactive_timeline().unwrap();

    c.bench_function("interactive_timeline_evaluate", |b| {
        let mut p = 0.0_f32;
        b.iter(|| {
            p = (p + 0.0137) % 1.0;
            black_box(timeline.evaluate(black_box(p)))
        });
    });
}

fn benchmark_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_propagation");

    for fan_out in [1usize, 16, 128] {
        let mut graph = MotionGraph::new();
        let x = graph.create(0.0_f32);
        for _ in 0..fan_out {
            let chain = TransformChain::new([
                (-100.0, Color::from_hex(0xff008c)),
                (0.0, Color::from_hex(0x7700ff)),
                (100.0, Color::from_hex(0x00c3ff)),
            ])
            .unwrap();
            graph.derive(x, chain).unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(fan_out), &fan_out, |b, _| {
            let mut value = 0.0_f32;
            b.iter(|| {
                value = if value > 100.0 { -100.0 } else { value + 1.0 };
                graph.set(x, black_box(value)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_timeline_evaluate, benchmark_propagation);
criterion_main!(benches);
