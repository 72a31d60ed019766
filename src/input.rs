//! Keyboard and mouse state.
//!
//! `InputState` is fed raw winit events as they arrive and queried once per
//! frame. It tracks both instantaneous events (key just pressed) and
//! continuous state (key held down), plus the relative cursor motion
//! accumulated while the cursor is captured.
//!
//! | Keys | Meaning |
//! |------|---------|
//! | W / Up, S / Down | forward, back |
//! | A / Left, D / Right | strafe |
//! | E / Right Shift, Q / Numpad 0 | up, down |
//! | Left Shift / Right Ctrl | boost |
//! | `=` / `-` | faster, slower time |

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::camera::Movement;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

/// Keys the simulation reacts to.
///
/// Left and right modifiers are kept apart because they are bound to
/// different actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W, A, S, D, E, Q,

    Up, Down, Left, Right,

    Space, Escape, Backspace, Minus, Equal,
    NumpadEnter, Numpad0,
    ShiftLeft, ShiftRight, ControlRight,

    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::KeyW => KeyCode::W,
            WinitKeyCode::KeyA => KeyCode::A,
            WinitKeyCode::KeyS => KeyCode::S,
            WinitKeyCode::KeyD => KeyCode::D,
            WinitKeyCode::KeyE => KeyCode::E,
            WinitKeyCode::KeyQ => KeyCode::Q,

            WinitKeyCode::ArrowUp => KeyCode::Up,
            WinitKeyCode::ArrowDown => KeyCode::Down,
            WinitKeyCode::ArrowLeft => KeyCode::Left,
            WinitKeyCode::ArrowRight => KeyCode::Right,

            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::Backspace => KeyCode::Backspace,
            WinitKeyCode::Minus => KeyCode::Minus,
            WinitKeyCode::Equal => KeyCode::Equal,
            WinitKeyCode::NumpadEnter => KeyCode::NumpadEnter,
            WinitKeyCode::Numpad0 => KeyCode::Numpad0,
            WinitKeyCode::ShiftLeft => KeyCode::ShiftLeft,
            WinitKeyCode::ShiftRight => KeyCode::ShiftRight,
            WinitKeyCode::ControlRight => KeyCode::ControlRight,

            _ => KeyCode::Other,
        }
    }
}

/// Input state tracking for keyboard and mouse.
#[derive(Debug, Default)]
pub struct InputState {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,

    mouse_pressed: HashSet<MouseButton>,

    look_delta: Vec2,
    cursor_captured: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Key Queries ==========

    /// Check if a key was pressed this frame (just went down).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key is currently held down.
    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was released this frame (just went up).
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    fn any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|k| self.keys_held.contains(k))
    }

    fn axis(&self, positive: &[KeyCode], negative: &[KeyCode]) -> f32 {
        let mut v = 0.0;
        if self.any_held(positive) {
            v += 1.0;
        }
        if self.any_held(negative) {
            v -= 1.0;
        }
        v
    }

    /// Camera movement requested by the held keys.
    pub fn movement(&self) -> Movement {
        use KeyCode::*;
        Movement {
            forward: self.axis(&[W, Up], &[S, Down]),
            strafe: self.axis(&[A, Left], &[D, Right]),
            lift: self.axis(&[E, ShiftRight], &[Q, Numpad0]),
            boost: self.any_held(&[ShiftLeft, ControlRight]),
        }
    }

    /// `+1` while `=` is held, `-1` while `-` is held.
    pub fn time_scale_direction(&self) -> f32 {
        self.axis(&[KeyCode::Equal], &[KeyCode::Minus])
    }

    // ========== Mouse ==========

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    /// Relative cursor motion accumulated this frame while captured.
    pub fn look_delta(&self) -> Vec2 {
        self.look_delta
    }

    #[inline]
    pub fn cursor_captured(&self) -> bool {
        self.cursor_captured
    }

    /// Mark the cursor as captured; motion now drives the camera.
    pub fn capture_cursor(&mut self) {
        self.cursor_captured = true;
    }

    /// Mark the cursor as released and drop any pending motion.
    pub fn release_cursor(&mut self) {
        self.cursor_captured = false;
        self.look_delta = Vec2::ZERO;
    }

    // ========== Event intake ==========

    /// Called at the end of each frame to clear per-frame state.
    pub(crate) fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_pressed.clear();
        self.look_delta = Vec2::ZERO;
    }

    pub(crate) fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // Only fire pressed event if not already held (no repeat)
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Raw device motion. Ignored unless the cursor is captured.
    pub(crate) fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.cursor_captured {
            self.look_delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    self.handle_key(KeyCode::from(keycode), event.state);
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => {
                self.mouse_pressed.insert(MouseButton::from(*button));
            }

            WindowEvent::Focused(false) => {
                self.keys_held.clear();
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = InputState::new();
        assert!(!input.key_held(KeyCode::Space));

        input.handle_key(KeyCode::Space, ElementState::Pressed);
        assert!(input.key_held(KeyCode::Space));
        assert!(input.key_pressed(KeyCode::Space));

        // After end_frame, pressed is cleared but held remains
        input.end_frame();
        assert!(input.key_held(KeyCode::Space));
        assert!(!input.key_pressed(KeyCode::Space));

        // Key repeat does not fire a second press
        input.handle_key(KeyCode::Space, ElementState::Pressed);
        assert!(!input.key_pressed(KeyCode::Space));

        input.handle_key(KeyCode::Space, ElementState::Released);
        assert!(!input.key_held(KeyCode::Space));
        assert!(input.key_released(KeyCode::Space));
    }

    #[test]
    fn test_movement_bindings() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::Up, ElementState::Pressed);
        input.handle_key(KeyCode::D, ElementState::Pressed);
        input.handle_key(KeyCode::Numpad0, ElementState::Pressed);
        input.handle_key(KeyCode::ControlRight, ElementState::Pressed);

        let m = input.movement();
        assert_eq!(m.forward, 1.0);
        assert_eq!(m.strafe, -1.0);
        assert_eq!(m.lift, -1.0);
        assert!(m.boost);
    }

    #[test]
    fn test_left_and_right_shift_differ() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::ShiftRight, ElementState::Pressed);
        let m = input.movement();
        assert_eq!(m.lift, 1.0);
        assert!(!m.boost);
    }

    #[test]
    fn test_left_control_is_unbound() {
        assert_eq!(KeyCode::from(WinitKeyCode::ControlLeft), KeyCode::Other);
        let mut input = InputState::new();
        input.handle_key(KeyCode::from(WinitKeyCode::ControlLeft), ElementState::Pressed);
        assert!(!input.movement().boost);
    }

    #[test]
    fn test_focus_loss_releases_held_keys() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::W, ElementState::Pressed);
        input.handle_event(&WindowEvent::Focused(false));
        assert!(!input.key_held(KeyCode::W));
        assert_eq!(input.movement().forward, 0.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::Equal, ElementState::Pressed);
        input.handle_key(KeyCode::Minus, ElementState::Pressed);
        assert_eq!(input.time_scale_direction(), 0.0);
    }

    #[test]
    fn test_motion_only_while_captured() {
        let mut input = InputState::new();
        input.handle_mouse_motion(5.0, 3.0);
        assert_eq!(input.look_delta(), Vec2::ZERO);

        input.capture_cursor();
        input.handle_mouse_motion(5.0, 3.0);
        input.handle_mouse_motion(1.0, -1.0);
        assert_eq!(input.look_delta(), Vec2::new(6.0, 2.0));

        input.release_cursor();
        assert_eq!(input.look_delta(), Vec2::ZERO);
        assert!(!input.cursor_captured());
    }
}
