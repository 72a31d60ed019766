//! Simulation builder and the windowed frame loop.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::camera::{CameraConfig, CameraState};
use crate::config::{SimConfig, WindowConfig};
use crate::emitter::Emitter;
use crate::error::{EmitterError, SimulationError};
use crate::gpu::GpuState;
use crate::input::{InputState, KeyCode, MouseButton};
use crate::physics::PhysicsConfig;
use crate::scene::Preset;
use crate::spawn::Spawner;
use crate::state::SimulationState;
use crate::store::MAX_PARTICLES;
use crate::time::Time;

/// Time multiplier change per frame while `=` or `-` is held.
const TIME_SCALE_STEP: f32 = 0.01;

/// Builds and runs a particle simulation.
///
/// ```ignore
/// use spritefall::prelude::*;
///
/// Simulation::new()
///     .with_preset(Preset::Empty)
///     .with_emitter(Emitter::new(SpawnShape::Disk { radius: 2.0 }, 500.0)
///         .at(Vec3::new(0.0, 0.1, 100.0))
///         .with_velocity(Span::new(Vec3::new(-1.0, 8.0, -1.0), Vec3::new(1.0, 12.0, 1.0))))
///     .with_seed(7)
///     .run()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    config: SimConfig,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every setting with a loaded scene.
    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.config.preset = preset;
        self
    }

    /// Cap the cascade rain at `count` particles.
    pub fn with_rain(mut self, count: usize) -> Self {
        self.config.rain = Some(count);
        self
    }

    /// Add an emitter. It is validated when the simulation starts.
    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.config.emitters.push(emitter);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.config.physics = physics;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.config.camera = camera;
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.config.window.width = width;
        self.config.window.height = height;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run the simulation. This blocks until the window is closed.
    pub fn run(self) -> Result<(), SimulationError> {
        self.config.validate()?;
        let state = build_state::<MAX_PARTICLES>(&self.config)?;
        tracing::info!(
            preset = ?self.config.preset,
            particles = state.store.len(),
            emitters = state.emitters().len(),
            "starting simulation"
        );

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(state, &self.config);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Seed a fresh state from `config`: preset first, then the listed emitters.
pub fn build_state<const N: usize>(config: &SimConfig) -> Result<SimulationState<N>, EmitterError> {
    let spawner = config.seed.map_or_else(Spawner::new, Spawner::with_seed);
    let mut state = SimulationState::new(config.physics, spawner);
    config.preset.populate(&mut state, config.rain)?;
    for emitter in &config.emitters {
        state.add_emitter(emitter.clone())?;
    }
    Ok(state)
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    window_config: WindowConfig,
    state: SimulationState,
    camera: CameraState,
    input: InputState,
    time: Time,
    error: Option<SimulationError>,
}

impl App {
    fn new(state: SimulationState, config: &SimConfig) -> Self {
        Self {
            window: None,
            gpu_state: None,
            window_config: config.window.clone(),
            state,
            camera: CameraState::new(config.camera),
            input: InputState::new(),
            time: Time::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SimulationError) {
        self.error = Some(error);
        event_loop.exit();
    }

    fn capture_cursor(&mut self) {
        let Some(window) = &self.window else { return };
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(e) = grabbed {
            tracing::warn!(error = %e, "cursor grab unavailable");
        }
        window.set_cursor_visible(false);
        self.input.capture_cursor();
        tracing::debug!("cursor captured");
    }

    fn release_cursor(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        self.input.release_cursor();
        tracing::debug!("cursor released");
    }

    /// Apply this frame's input to the clock and camera.
    fn apply_controls(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }
        if self.input.key_pressed(KeyCode::Space) {
            self.time.toggle_pause();
        }
        if self.input.key_pressed(KeyCode::Backspace) {
            self.time.reset_time_scale();
        }
        let direction = self.input.time_scale_direction();
        if direction != 0.0 {
            self.time.adjust_time_scale(direction * TIME_SCALE_STEP);
        }

        if self.input.mouse_pressed(MouseButton::Left) && !self.input.cursor_captured() {
            self.capture_cursor();
        }
        if self.input.key_pressed(KeyCode::NumpadEnter) && self.input.cursor_captured() {
            self.release_cursor();
        }

        let look = self.input.look_delta();
        self.camera.look(look.x, look.y);
        self.camera.advance(self.input.movement());
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        self.apply_controls(event_loop);

        let dt = self.time.update();
        let Some(gpu_state) = &mut self.gpu_state else {
            self.input.end_frame();
            return;
        };

        if !self.time.is_paused() {
            self.state.step(dt);
            gpu_state.upload(&self.state.store);
        }

        if let Some(fps) = self.time.fps_report() {
            tracing::info!(
                fps,
                particles = self.state.store.len(),
                time_scale = self.time.time_scale(),
                "frame stats"
            );
        }

        match gpu_state.render(&self.camera) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => tracing::warn!(error = ?e, "render error"),
        }

        self.input.end_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.window = Some(window.clone());

        match pollster::block_on(GpuState::new(window.clone(), MAX_PARTICLES)) {
            Ok(mut gpu_state) => {
                gpu_state.upload(&self.state.store);
                self.gpu_state = Some(gpu_state);
                self.time.reset_clock();
                window.request_redraw();
            }
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.handle_mouse_motion(dx, dy);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::Focused(false) if self.input.cursor_captured() => {
                self.release_cursor();
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
