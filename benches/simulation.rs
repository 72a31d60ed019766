//! Benchmarks for the CPU side of a frame: integration, spawning and upload.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use spritefall::scene::{fountain, seed_cascade};
use spritefall::sync::{RenderSync, SceneLayout, UploadBuffer};
use spritefall::{Emitter, Integrator, ParticleStore, PhysicsConfig, SimulationState, Spawner};

const FRAME: f32 = 1.0 / 60.0;

fn cascade<const N: usize>() -> SimulationState<N> {
    let mut state = SimulationState::new(PhysicsConfig::default(), Spawner::with_seed(42));
    seed_cascade(&mut state, None);
    state
}

fn bench_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate");

    group.bench_function("cascade_10k", |b| {
        let mut state = cascade::<10_000>();
        let integrator = Integrator::default();
        b.iter(|| black_box(integrator.integrate(&mut state.store, black_box(FRAME))))
    });

    group.bench_function("cascade_100k", |b| {
        let mut state = cascade::<100_000>();
        let integrator = Integrator::default();
        b.iter(|| black_box(integrator.integrate(&mut state.store, black_box(FRAME))))
    });

    group.bench_function("cascade_100k_culling", |b| {
        let mut state = cascade::<100_000>();
        let integrator = Integrator::new(PhysicsConfig {
            cull_expired: true,
            ..PhysicsConfig::default()
        });
        b.iter(|| black_box(integrator.integrate(&mut state.store, black_box(FRAME))))
    });

    group.finish();
}

fn bench_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");
    for rate in [1_000.0_f32, 10_000.0, 100_000.0] {
        let emitter = Emitter {
            rate,
            ..fountain()
        };
        group.bench_with_input(
            BenchmarkId::new("fountain", rate as u32),
            &emitter,
            |b, emitter| {
                let mut spawner = Spawner::with_seed(7);
                let mut store = ParticleStore::<100_000>::new();
                b.iter(|| {
                    store.clear();
                    black_box(spawner.spawn(emitter, FRAME, &mut store))
                })
            },
        );
    }

    group.finish();
}

/// Discards writes, so only the column packing is measured.
struct Sink(u64);

impl UploadBuffer for Sink {
    fn write(&mut self, offset: u64, data: &[u8]) {
        self.0 = self.0.wrapping_add(offset + data.len() as u64);
    }
}

fn bench_sync(c: &mut Criterion) {
    let state = cascade::<100_000>();
    let layout = SceneLayout::new(state.store.capacity(), 4);
    let mut sync = RenderSync::new(layout, |_, _| Sink(0));

    c.bench_function("sync_100k", |b| {
        b.iter(|| {
            sync.sync(black_box(&state.store));
            black_box(sync.draw_count())
        })
    });
}

criterion_group!(benches, bench_integrate, bench_spawn, bench_sync);
criterion_main!(benches);
