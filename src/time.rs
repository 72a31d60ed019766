//! Frame timing.
//!
//! Measures wall-clock time between frames and turns it into the simulation
//! timestep: `dt = wall_dt * time_scale`, or zero while paused. Also counts
//! frames over one-second windows for the FPS report.
//!
//! # Example
//!
//! ```
//! use spritefall::time::Time;
//!
//! let mut time = Time::new();
//! time.set_fixed_delta(Some(1.0 / 60.0));
//! time.set_time_scale(2.0);
//! let dt = time.update();
//! assert!((dt - 2.0 / 60.0).abs() < 1e-6);
//! ```

use std::time::Instant;

/// Smallest time multiplier reachable with the slow-down key.
pub const MIN_TIME_SCALE: f32 = 0.01;

#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    /// Simulated seconds since start (scaled, excludes pauses).
    elapsed_secs: f32,
    frame_count: u64,
    /// Frames counted in the current one-second window.
    window_frames: u32,
    /// Wall seconds accumulated in the current window.
    window_secs: f32,
    /// FPS of the window that closed during the last update.
    fps_report: Option<u32>,
    paused: bool,
    /// Fixed wall delta for deterministic updates (optional).
    fixed_delta: Option<f32>,
    time_scale: f32,
}

impl Time {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed_secs: 0.0,
            frame_count: 0,
            window_frames: 0,
            window_secs: 0.0,
            fps_report: None,
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Measure the frame. Call once per frame; returns the simulation `dt`.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(self.fixed_delta.unwrap_or(raw))
    }

    /// Advance by `wall` seconds of real time.
    pub fn advance(&mut self, wall: f32) -> f32 {
        self.frame_count += 1;
        self.window_frames += 1;
        self.window_secs += wall;
        self.fps_report = None;
        if self.window_secs >= 1.0 {
            self.fps_report = Some(self.window_frames);
            self.window_frames = 0;
            self.window_secs -= 1.0;
        }

        let dt = if self.paused {
            0.0
        } else {
            wall * self.time_scale
        };
        self.elapsed_secs += dt;
        dt
    }

    /// Restart wall-clock measurement from now, dropping time spent in setup.
    pub fn reset_clock(&mut self) {
        self.last_frame = Instant::now();
    }

    /// Frames counted in the one-second window that just closed, if any.
    #[inline]
    pub fn fps_report(&self) -> Option<u32> {
        self.fps_report
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        tracing::debug!(paused = self.paused, "pause toggled");
    }

    /// Set a fixed wall delta. Pass `None` to use real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Set time scale multiplier, floored at [`MIN_TIME_SCALE`].
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(MIN_TIME_SCALE);
    }

    /// Nudge the multiplier by `step`.
    pub fn adjust_time_scale(&mut self, step: f32) {
        self.set_time_scale(self.time_scale + step);
    }

    pub fn reset_time_scale(&mut self) {
        self.time_scale = 1.0;
        tracing::debug!("time scale reset");
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
