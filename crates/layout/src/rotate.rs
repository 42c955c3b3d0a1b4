//! Drag-to-rotate for 3D layouts.
//!
//! A drag gesture maps its accumulated screen delta to one absolute rotation
//! of the positions captured when the drag started, so repeated move events
//! within a gesture never accumulate error.

use std::f64::consts::PI;

use nalgebra::Matrix3;

use crate::vector::{self, Vector2, Vector3};

/// Rotation for an accumulated drag `delta` (screen pixels, y down).
///
/// The drag length sets the tilt angle at one degree per pixel; the drag
/// direction sets the axis the tilt happens about. The composite undoes the
/// azimuth roll, pitches, then rolls back.
pub fn drag_rotation(delta: &Vector2) -> Matrix3<f64> {
    let length = delta.norm();
    let tilt = length * 2.0 * PI / 360.0;
    let azimuth = drag_azimuth(delta);
    vector::roll(-azimuth) * vector::pitch(tilt) * vector::roll(azimuth)
}

/// Signed angle between the drag direction and screen up; 0 for no drag.
pub fn drag_azimuth(delta: &Vector2) -> f64 {
    let length = delta.norm();
    if length == 0.0 {
        return 0.0;
    }
    let angle = (-delta.y / length).clamp(-1.0, 1.0).acos();
    let sign = -delta.x.signum();
    if delta.x == 0.0 { angle } else { angle * sign }
}

/// Positions captured at drag start, rotated about a fixed pivot.
#[derive(Debug, Clone)]
pub struct Rotator {
    pivot: Vector3,
    snapshot: Vec<Vector3>,
}

impl Rotator {
    pub fn begin<'a>(positions: impl IntoIterator<Item = &'a Vector3>, pivot: Vector3) -> Self {
        Self {
            pivot,
            snapshot: positions.into_iter().copied().collect(),
        }
    }

    pub fn pivot(&self) -> &Vector3 {
        &self.pivot
    }

    /// Target positions for the accumulated drag `delta`, one per snapshot
    /// entry.
    pub fn rotated(&self, delta: &Vector2) -> Vec<Vector3> {
        let rotation = drag_rotation(delta);
        self.snapshot
            .iter()
            .map(|p| self.pivot + rotation * (p - self.pivot))
            .collect()
    }
}
