//! Rotation sliders.
//!
//! Three range sliders, one per axis, each limited to `[-90, 90]` degrees
//! in whole-degree steps. Every change yields the full rotation, which the
//! caller hands to [`SceneLifecycle::set_rotation`](crate::SceneLifecycle::set_rotation).

use crate::rotation::{Axis, RotationDegrees};

pub const SLIDER_MIN: f32 = -90.0;
pub const SLIDER_MAX: f32 = 90.0;
pub const SLIDER_STEP: f32 = 1.0;

/// Slider model for live rotation tuning.
///
/// ```
/// use glasscard::{Axis, RotationControls, RotationDegrees};
///
/// let mut controls = RotationControls::new(RotationDegrees::new(-43.0, 14.0, 33.0));
/// let rotation = controls.set_axis(Axis::X, 120.4);
/// assert_eq!(rotation.x, 90.0);
/// assert_eq!(
///     controls.clipboard_text(),
///     "cardRotationX: 90,\ncardRotationY: 14,\ncardRotationZ: 33,"
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationControls {
    rotation: RotationDegrees,
}

impl RotationControls {
    /// Starts from the scene's current rotation, taken as is.
    pub fn new(initial: RotationDegrees) -> Self {
        Self { rotation: initial }
    }

    pub fn rotation(&self) -> RotationDegrees {
        self.rotation
    }

    /// Moves one slider. The value is snapped to the step and clamped to the
    /// slider range, as a range input would.
    pub fn set_axis(&mut self, axis: Axis, degrees: f32) -> RotationDegrees {
        self.rotation = self.rotation.with_axis(axis, snap(degrees));
        self.rotation
    }

    /// Moves one slider by `steps` whole steps.
    pub fn nudge(&mut self, axis: Axis, steps: i32) -> RotationDegrees {
        let current = self.rotation.axis(axis);
        self.set_axis(axis, current + steps as f32 * SLIDER_STEP)
    }

    /// Slider caption for an axis.
    pub fn label(axis: Axis) -> &'static str {
        match axis {
            Axis::X => "X Rotation (Tilt Up/Down)",
            Axis::Y => "Y Rotation (Turn Left/Right)",
            Axis::Z => "Z Rotation (Roll)",
        }
    }

    /// The slider's value readout, one decimal place.
    pub fn readout(&self, axis: Axis) -> String {
        format!("{:.1}°", self.rotation.axis(axis))
    }

    /// Snippet for pasting the tuned rotation back into card data.
    pub fn clipboard_text(&self) -> String {
        // -0 prints as "-0"; adding zero normalizes it.
        let RotationDegrees { x, y, z } = self.rotation;
        format!(
            "cardRotationX: {},\ncardRotationY: {},\ncardRotationZ: {},",
            x + 0.0,
            y + 0.0,
            z + 0.0
        )
    }
}

fn snap(degrees: f32) -> f32 {
    if degrees.is_nan() {
        return 0.0;
    }
    let stepped = (degrees / SLIDER_STEP).round() * SLIDER_STEP;
    stepped.clamp(SLIDER_MIN, SLIDER_MAX)
}
