//! Owned simulation state and the per-frame step.

use crate::emitter::Emitter;
use crate::error::{EmitterError, StoreError};
use crate::physics::{Integrator, PhysicsConfig};
use crate::spawn::Spawner;
use crate::store::{Particle, ParticleStore, MAX_PARTICLES};

/// What happened during one [`SimulationState::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub spawned: usize,
    pub culled: usize,
    /// At least one emitter hit the capacity ceiling.
    pub capacity_reached: bool,
}

/// Particle store, emitters, spawner and integrator for one run.
pub struct SimulationState<const N: usize = MAX_PARTICLES> {
    pub store: ParticleStore<N>,
    emitters: Vec<Emitter>,
    pub spawner: Spawner,
    pub integrator: Integrator,
}

impl<const N: usize> SimulationState<N> {
    pub fn new(physics: PhysicsConfig, spawner: Spawner) -> Self {
        Self {
            store: ParticleStore::new(),
            emitters: Vec::new(),
            spawner,
            integrator: Integrator::new(physics),
        }
    }

    /// Validate and register an emitter.
    pub fn add_emitter(&mut self, emitter: Emitter) -> Result<(), EmitterError> {
        emitter.validate()?;
        tracing::debug!(rate = emitter.rate, shape = ?emitter.shape, "emitter registered");
        self.emitters.push(emitter);
        Ok(())
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    /// Place a particle directly, bypassing emitters.
    pub fn seed(&mut self, particle: Particle) -> Result<usize, StoreError> {
        self.store.append(particle)
    }

    /// Spawn from every emitter, then integrate. No-op for `dt <= 0`.
    pub fn step(&mut self, dt: f32) -> FrameReport {
        let mut report = FrameReport::default();
        if dt.is_nan() || dt <= 0.0 {
            return report;
        }

        for emitter in &self.emitters {
            let spawn = self.spawner.spawn(emitter, dt, &mut self.store);
            report.spawned += spawn.spawned;
            report.capacity_reached |= spawn.capacity_reached;
        }
        report.culled = self.integrator.integrate(&mut self.store, dt);
        report
    }
}
