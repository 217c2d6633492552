//! Keyboard bindings for the rotation sliders.
//!
//! | Key            | Action                  |
//! |----------------|-------------------------|
//! | Up / Down      | X rotation +1 / -1      |
//! | Right / Left   | Y rotation +1 / -1      |
//! | E / Q          | Z rotation +1 / -1      |
//! | Shift + any    | ten steps instead of one|
//! | C              | log the clipboard text  |
//! | R              | back to the base rotation |

use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::controls::RotationControls;
use crate::rotation::{Axis, RotationDegrees};

/// Steps per key press while Shift is held.
pub const COARSE_STEPS: i32 = 10;

/// What a key press asks the controls to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlAction {
    Nudge(Axis, i32),
    Copy,
    Reset,
}

/// Maps a key to its action, `None` for unbound keys.
pub fn action_for(key: KeyCode, coarse: bool) -> Option<ControlAction> {
    let steps = if coarse { COARSE_STEPS } else { 1 };
    let action = match key {
        KeyCode::ArrowUp => ControlAction::Nudge(Axis::X, steps),
        KeyCode::ArrowDown => ControlAction::Nudge(Axis::X, -steps),
        KeyCode::ArrowRight => ControlAction::Nudge(Axis::Y, steps),
        KeyCode::ArrowLeft => ControlAction::Nudge(Axis::Y, -steps),
        KeyCode::KeyE => ControlAction::Nudge(Axis::Z, steps),
        KeyCode::KeyQ => ControlAction::Nudge(Axis::Z, -steps),
        KeyCode::KeyC => ControlAction::Copy,
        KeyCode::KeyR => ControlAction::Reset,
        _ => return None,
    };
    Some(action)
}

/// Tracks held keys and turns window events into [`ControlAction`]s.
#[derive(Debug, Default)]
pub struct KeyboardInput {
    keys_down: HashSet<KeyCode>,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a window event. Returns the action for a fresh key press;
    /// auto-repeat presses count as fresh.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<ControlAction> {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return None;
        };
        let PhysicalKey::Code(key) = event.physical_key else {
            return None;
        };
        self.key(key, event.state == ElementState::Pressed)
    }

    /// Records a key transition.
    pub fn key(&mut self, key: KeyCode, pressed: bool) -> Option<ControlAction> {
        if !pressed {
            self.keys_down.remove(&key);
            return None;
        }
        self.keys_down.insert(key);
        action_for(key, self.shift_down())
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn shift_down(&self) -> bool {
        self.key_down(KeyCode::ShiftLeft) || self.key_down(KeyCode::ShiftRight)
    }

    /// Focus loss drops every held key.
    pub fn clear(&mut self) {
        self.keys_down.clear();
    }
}

/// Applies `action` to the sliders. Returns the new rotation when it moved.
pub fn apply_action(
    controls: &mut RotationControls,
    action: ControlAction,
    reset_to: RotationDegrees,
) -> Option<RotationDegrees> {
    match action {
        ControlAction::Nudge(axis, steps) => Some(controls.nudge(axis, steps)),
        ControlAction::Reset => {
            *controls = RotationControls::new(reset_to);
            Some(reset_to)
        }
        ControlAction::Copy => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_qe_map_to_axes() {
        assert_eq!(
            action_for(KeyCode::ArrowUp, false),
            Some(ControlAction::Nudge(Axis::X, 1))
        );
        assert_eq!(
            action_for(KeyCode::ArrowLeft, false),
            Some(ControlAction::Nudge(Axis::Y, -1))
        );
        assert_eq!(
            action_for(KeyCode::KeyQ, true),
            Some(ControlAction::Nudge(Axis::Z, -COARSE_STEPS))
        );
        assert_eq!(action_for(KeyCode::KeyW, false), None);
    }

    #[test]
    fn shift_makes_steps_coarse() {
        let mut input = KeyboardInput::new();
        assert_eq!(input.key(KeyCode::ShiftLeft, true), None);
        assert_eq!(
            input.key(KeyCode::ArrowDown, true),
            Some(ControlAction::Nudge(Axis::X, -COARSE_STEPS))
        );
        input.key(KeyCode::ShiftLeft, false);
        assert_eq!(
            input.key(KeyCode::ArrowDown, true),
            Some(ControlAction::Nudge(Axis::X, -1))
        );
    }

    #[test]
    fn releases_produce_no_action() {
        let mut input = KeyboardInput::new();
        input.key(KeyCode::KeyC, true);
        assert!(input.key_down(KeyCode::KeyC));
        assert_eq!(input.key(KeyCode::KeyC, false), None);
        assert!(!input.key_down(KeyCode::KeyC));
    }

    #[test]
    fn reset_restores_the_base_rotation() {
        let base = RotationDegrees::new(-43.0, 14.0, 33.0);
        let mut controls = RotationControls::new(base);
        apply_action(&mut controls, ControlAction::Nudge(Axis::Y, 5), base);
        assert_eq!(controls.rotation().y, 19.0);
        assert_eq!(apply_action(&mut controls, ControlAction::Reset, base), Some(base));
        assert_eq!(controls.rotation(), base);
        assert_eq!(apply_action(&mut controls, ControlAction::Copy, base), None);
    }
}
