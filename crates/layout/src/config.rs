use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::vector::Vector;

/// Axis-aligned simulation box. Axis `i` spans `[margin, margin + size_i]`,
/// where the sizes are `width`, `height` and `depth` in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub margin: f64,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            margin: 50.0,
            width: 400.0,
            height: 400.0,
            depth: 400.0,
        }
    }
}

impl Viewport {
    pub fn size_along(&self, axis: usize) -> f64 {
        match axis {
            0 => self.width,
            1 => self.height,
            _ => self.depth,
        }
    }

    pub fn lower<const D: usize>(&self) -> Vector<D> {
        Vector::from_element(self.margin)
    }

    pub fn upper<const D: usize>(&self) -> Vector<D> {
        Vector::from_fn(|i, _| self.margin + self.size_along(i))
    }

    pub fn center<const D: usize>(&self) -> Vector<D> {
        Vector::from_fn(|i, _| self.margin + self.size_along(i) / 2.0)
    }

    /// Initial area used to derive the layout constant.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Length the temperature decays from: the width in 2D, the height in 3D.
    pub fn temperature_extent<const D: usize>(&self) -> f64 {
        if D >= 3 { self.height } else { self.width }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() {
            return Err(LayoutError::InvalidViewport(format!(
                "margin must be finite, got {}",
                self.margin
            )));
        }
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LayoutError::InvalidViewport(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Tunable constants of the force model and annealing schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceParams {
    /// Pairs closer than this are separated by a random jitter.
    pub collision_epsilon: f64,
    /// In 3D, pairs whose depth difference is below this get a random depth.
    pub depth_epsilon: f64,
    /// `k = sqrt(area / n / density_divisor) * (e / n)`.
    pub density_divisor: f64,
    /// Color distance is divided by this before scaling `k`.
    pub color_scale: f64,
    /// Pin events re-heat the schedule to at most this step.
    pub reheat_cap: u64,
    /// Auto-stopping runs halt once the temperature drops to this value.
    pub convergence_temperature: f64,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            collision_epsilon: 0.1,
            depth_epsilon: 0.1,
            density_divisor: 40.0,
            color_scale: 256.0,
            reheat_cap: 16,
            convergence_temperature: 1.0,
        }
    }
}

impl ForceParams {
    /// Divisors and the convergence threshold must be positive: a threshold
    /// of zero would keep `final_move` stepping forever.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("density_divisor", self.density_divisor),
            ("color_scale", self.color_scale),
            ("convergence_temperature", self.convergence_temperature),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LayoutError::InvalidForceParams(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("collision_epsilon", self.collision_epsilon),
            ("depth_epsilon", self.depth_epsilon),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LayoutError::InvalidForceParams(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub viewport: Viewport,
    /// Radius of the circle vertices start on.
    pub initial_radius: f64,
    /// Seed for the jitter RNG; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Stop stepping once the temperature reaches `convergence_temperature`.
    pub auto_stop: bool,
    /// Pull the whole layout toward the viewport center every step.
    pub centering: bool,
    /// Grow or shrink the working area to keep the layout filling the view.
    pub auto_zoom: bool,
    /// Vertex radius reported to renderers in 2D.
    pub vertex_radius: f64,
    pub forces: ForceParams,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::planar(400.0, 400.0)
    }
}

impl LayoutConfig {
    /// Flat layout in a `width` x `height` box with a 50 unit margin.
    pub fn planar(width: f64, height: f64) -> Self {
        Self {
            viewport: Viewport {
                margin: 50.0,
                width,
                height,
                depth: height,
            },
            initial_radius: 100.0,
            seed: None,
            auto_stop: true,
            centering: false,
            auto_zoom: false,
            vertex_radius: 3.0,
            forces: ForceParams::default(),
        }
    }

    /// Cube layout sized for a view of height `view_height`: a tenth of the
    /// view is margin and the cube side is the remaining 80%.
    pub fn spatial(view_height: f64) -> Self {
        let side = view_height * 0.8;
        Self {
            viewport: Viewport {
                margin: view_height / 10.0,
                width: side,
                height: side,
                depth: side,
            },
            initial_radius: view_height / 5.0,
            seed: None,
            auto_stop: true,
            centering: true,
            auto_zoom: true,
            vertex_radius: 5.0,
            forces: ForceParams::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.viewport.validate()?;
        self.forces.validate()?;
        if !self.initial_radius.is_finite() || self.initial_radius < 0.0 {
            return Err(LayoutError::InvalidViewport(format!(
                "initial radius must be non-negative, got {}",
                self.initial_radius
            )));
        }
        Ok(())
    }
}
