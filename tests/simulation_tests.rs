//! Integration tests for the simulation core.
//!
//! These run the store, spawner and integrator together through the public
//! API, without a window or GPU.

use proptest::prelude::*;
use spritefall::prelude::*;
use spritefall::{Integrator, SpawnShape};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn at(x: f32) -> Particle {
    Particle {
        position: Vec3::new(x, 50.0, 100.0),
        ..Particle::default()
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Append,
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Append), (0usize..32).prop_map(Op::Remove)]
}

proptest! {
    #[test]
    fn test_store_matches_swap_remove_model(ops in prop::collection::vec(op(), 0..200)) {
        let mut store = ParticleStore::<16>::new();
        let mut model: Vec<f32> = Vec::new();
        let mut next_id = 0.0_f32;

        for op in ops {
            match op {
                Op::Append => {
                    let result = store.append(at(next_id));
                    if model.len() < 16 {
                        prop_assert_eq!(result, Ok(model.len()));
                        model.push(next_id);
                    } else {
                        prop_assert!(result.is_err());
                    }
                    next_id += 1.0;
                }
                Op::Remove(i) if i < model.len() => {
                    store.remove(i);
                    model.swap_remove(i);
                }
                Op::Remove(_) => {}
            }

            prop_assert!(store.len() <= store.capacity());
            prop_assert_eq!(store.len(), model.len());
            let ids: Vec<f32> = store.positions().iter().map(|p| p.x).collect();
            prop_assert_eq!(&ids, &model);
        }
    }

    #[test]
    fn test_integration_stays_inside_arena(
        x in -99.0f32..99.0,
        y in 0.1f32..500.0,
        z in 1.0f32..199.0,
        vx in -50.0f32..50.0,
        vy in -50.0f32..50.0,
        vz in -50.0f32..50.0,
        dt in 0.001f32..0.1,
    ) {
        let mut store = ParticleStore::<1>::new();
        store.append(Particle {
            position: Vec3::new(x, y, z),
            velocity: Vec3::new(vx, vy, vz),
            ..Particle::default()
        }).unwrap();

        let integrator = Integrator::default();
        for _ in 0..20 {
            integrator.integrate(&mut store, dt);
            let p = store.positions()[0];
            prop_assert!(p.x.abs() < 100.0);
            prop_assert!((p.z - 100.0).abs() < 100.0);
            prop_assert!(p.y >= 0.1);
        }
    }
}

#[test]
fn test_remove_relocates_last_particle() {
    let mut store = ParticleStore::<8>::new();
    for i in 0..4 {
        store.append(at(i as f32)).unwrap();
    }
    store.remove(1);

    assert_eq!(store.len(), 3);
    let xs: Vec<f32> = store.positions().iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![0.0, 3.0, 2.0]);
}

#[test]
fn test_full_store_rejects_append() {
    let mut store = ParticleStore::<2>::new();
    store.append(at(0.0)).unwrap();
    store.append(at(1.0)).unwrap();
    assert!(store.is_full());
    assert!(store.append(at(2.0)).is_err());
    assert_eq!(store.len(), 2);
}

// ============================================================================
// Spawning
// ============================================================================

#[test]
fn test_spawn_rate_averages_out() {
    let mut spawner = Spawner::with_seed(1234);
    let trials = 20_000;
    let total: u32 = (0..trials).map(|_| spawner.spawn_count(30.0 * 0.01)).sum();
    let mean = total as f32 / trials as f32;
    assert!((mean - 0.3).abs() < 0.02, "mean spawn count {mean}");
}

#[test]
fn test_disk_sampling_is_area_uniform() {
    let mut spawner = Spawner::with_seed(77);
    let radius = 2.0;
    let n = 20_000;
    let mut r2_sum = 0.0;
    let mut inner = 0;
    for _ in 0..n {
        let p = spawner.random_in_disk(radius);
        assert_eq!(p.y, 0.0);
        let r2 = p.x * p.x + p.z * p.z;
        assert!(r2 <= radius * radius + 1e-4);
        r2_sum += r2;
        if r2 < (radius / 2.0) * (radius / 2.0) {
            inner += 1;
        }
    }
    // E[r²] = R²/2 and a quarter of the area lies within R/2.
    let mean = r2_sum / n as f32;
    assert!((mean - 2.0).abs() < 0.05, "mean r² {mean}");
    let fraction = inner as f32 / n as f32;
    assert!((fraction - 0.25).abs() < 0.02, "inner fraction {fraction}");
}

// ============================================================================
// Physics
// ============================================================================

#[test]
fn test_slow_floor_contact_grounds_particle() {
    let mut store = ParticleStore::<1>::new();
    store
        .append(Particle {
            position: Vec3::new(0.0, 0.05, 100.0),
            velocity: Vec3::new(0.0, -0.05, 0.0),
            ..Particle::default()
        })
        .unwrap();
    Integrator::default().integrate(&mut store, 1.0);

    let p = store.get(0).unwrap();
    assert_eq!(p.position.y, 0.1);
    assert_eq!(p.velocity.y, 0.0);
    assert!(p.grounded);
}

#[test]
fn test_wall_reflection_clamps_and_damps() {
    let mut store = ParticleStore::<1>::new();
    store
        .append(Particle {
            position: Vec3::new(99.5, 50.0, 100.0),
            velocity: Vec3::new(2.0, 0.0, 0.0),
            ..Particle::default()
        })
        .unwrap();
    Integrator::default().integrate(&mut store, 0.5);

    let p = store.get(0).unwrap();
    assert!(approx(p.position.x, 99.9));
    assert!(approx(p.velocity.x, -1.4));
}

#[test]
fn test_grounded_particle_never_leaves_floor() {
    let mut state: SimulationState<4> =
        SimulationState::new(PhysicsConfig::default(), Spawner::with_seed(5));
    state
        .seed(Particle {
            position: Vec3::new(0.0, 0.1, 100.0),
            velocity: Vec3::new(30.0, 0.0, 0.0),
            grounded: true,
            ..Particle::default()
        })
        .unwrap();

    for _ in 0..1200 {
        state.step(1.0 / 60.0);
        let p = state.store.get(0).unwrap();
        assert!(p.grounded);
        assert_eq!(p.position.y, 0.1);
    }
    assert_eq!(state.store.get(0).unwrap().velocity, Vec3::ZERO);
}

#[test]
fn test_zero_dt_leaves_state_untouched() {
    let mut state: SimulationState<64> =
        SimulationState::new(PhysicsConfig::default(), Spawner::with_seed(9));
    state
        .add_emitter(Emitter::new(SpawnShape::Point, 1_000.0))
        .unwrap();
    state.seed(at(4.0)).unwrap();
    let before = state.store.get(0);

    let report = state.step(0.0);

    assert_eq!(report.spawned, 0);
    assert_eq!(state.store.len(), 1);
    assert_eq!(state.store.get(0), before);
}

#[test]
fn test_expired_particles_culled_when_enabled() {
    let physics = PhysicsConfig {
        cull_expired: true,
        ..PhysicsConfig::default()
    };
    let mut state: SimulationState<512> = SimulationState::new(physics, Spawner::with_seed(3));
    state
        .add_emitter(
            Emitter::new(SpawnShape::Point, 100.0)
                .at(Vec3::new(0.0, 50.0, 100.0))
                .with_lifetime(Span::fixed(0.5)),
        )
        .unwrap();

    for _ in 0..100 {
        state.step(0.05);
    }
    // Steady state: about rate * lifetime alive, never the full store.
    assert!(state.store.len() <= 60, "{} alive", state.store.len());
    assert!(state.store.ages().iter().all(|&a| a < 0.5));
}

// ============================================================================
// Scene file
// ============================================================================

#[test]
fn test_scene_file_drives_state() {
    let config = SimConfig::from_toml(
        r#"
        seed = 11
        preset = "empty"

        [[emitters]]
        shape = { kind = "disk", radius = 4.0 }
        rate = 200.0
        position = [0.0, 20.0, 100.0]
        "#,
    )
    .unwrap();

    let mut state = spritefall::simulation::build_state::<1024>(&config).unwrap();
    state.step(0.5);
    assert_eq!(state.store.len(), 100);
    for p in state.store.positions() {
        let dx = p.x;
        let dz = p.z - 100.0;
        assert!(dx * dx + dz * dz <= 16.0 + 1e-3);
    }
}
