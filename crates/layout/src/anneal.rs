//! Annealing schedule: the step counter the temperature decays with, and the
//! working area the layout constant is derived from.

use tracing::debug;

/// Auto-zoom never shrinks the area by more than half in one step.
const MIN_ZOOM_FACTOR: f64 = 0.5;

/// Fraction of the view height the 3D layout radius is steered toward.
const TARGET_RADIUS_FRACTION: f64 = 11.0 / 24.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Annealer {
    /// Steps since the last full or partial re-heat; starts at 1.
    step: u64,
    /// Length the temperature decays from.
    extent: f64,
    /// Working area; evolves with auto-zoom.
    area: f64,
    initial_area: f64,
}

impl Annealer {
    pub fn new(extent: f64, area: f64) -> Self {
        Self {
            step: 1,
            extent,
            area,
            initial_area: area,
        }
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Maximum displacement allowed this step: `extent / step`.
    pub fn temperature(&self) -> f64 {
        self.temperature_at(self.step)
    }

    fn temperature_at(&self, step: u64) -> f64 {
        self.extent / step.max(1) as f64
    }

    pub fn advance(&mut self) {
        self.step += 1;
    }

    /// Full reset for a freshly loaded graph.
    pub fn reset(&mut self) {
        self.step = 1;
        self.area = self.initial_area;
    }

    /// Re-heat without a full reset: the step counter drops to at most `cap`.
    pub fn reheat(&mut self, cap: u64) {
        let step = self.step.min(cap.max(1));
        if step != self.step {
            debug!(from = self.step, to = step, "re-heating layout");
        }
        self.step = step;
    }

    /// Restart the schedule from step 1 while keeping the current area.
    pub fn restart(&mut self) {
        self.step = 1;
    }

    /// Steer the area so the layout radius approaches 11/24 of `height`: a
    /// small layout grows the area (spreading vertices), a large one shrinks
    /// it.
    pub fn auto_zoom(&mut self, radius: f64, height: f64) {
        let ratio = self.temperature() / height;
        let factor = if radius < height * TARGET_RADIUS_FRACTION {
            1.0 + ratio
        } else {
            (1.0 - ratio).max(MIN_ZOOM_FACTOR)
        };
        self.area *= factor;
    }
}
