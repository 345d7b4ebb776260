//! Benchmarks for the decoder loop

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use thinkcontrol_bci_core::{
    ClassificationState, CursorIntegrator, DecoderConfig, DecoderCore, HitScoring, Label,
    ManualClock, SignalSynthesizer,
};

fn decoder(seed: u64) -> DecoderCore<StdRng, ManualClock> {
    DecoderCore::new(
        DecoderConfig::default(),
        StdRng::seed_from_u64(seed),
        ManualClock::default(),
    )
    .expect("default config is valid")
}

fn bench_decoder_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder_tick");

    for ticks in [1, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(ticks), ticks, |b, &ticks| {
            let mut core = decoder(42);
            b.iter(|| {
                for _ in 0..ticks {
                    core.clock().advance(0.1);
                    black_box(core.tick());
                }
            });
        });
    }

    group.finish();
}

fn bench_signal_synthesis(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut synthesizer = SignalSynthesizer::new();
    let mut time = 0.0;

    c.bench_function("signal_generate", |b| {
        b.iter(|| {
            time += 0.1;
            black_box(synthesizer.generate(black_box(time), Label::Right, &mut rng))
        });
    });
}

fn bench_cursor_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor_integrate");

    for scoring in [HitScoring::Continuous, HitScoring::EdgeTriggered] {
        group.bench_function(format!("{scoring:?}"), |b| {
            let mut cursor = CursorIntegrator::new(scoring, 500);
            let state = ClassificationState::new(Label::Left, 0.8);
            b.iter(|| black_box(cursor.integrate(black_box(&state))));
        });
    }

    group.finish();
}

fn bench_force_classify(c: &mut Criterion) {
    let mut core = decoder(3);
    c.bench_function("force_classify", |b| {
        b.iter(|| black_box(core.force_classify()));
    });
}

criterion_group!(
    benches,
    bench_decoder_tick,
    bench_signal_synthesis,
    bench_cursor_integrate,
    bench_force_classify,
);
criterion_main!(benches);
