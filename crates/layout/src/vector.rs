//! Fixed-dimension vector helpers shared by the force model, the engine and
//! the rotator. Arithmetic comes from `nalgebra`; this module only adds the
//! few layout-specific operations on top of it.

use nalgebra::{Matrix3, SVector};
use rand::Rng;

/// A point or displacement in `D`-dimensional layout space.
pub type Vector<const D: usize> = SVector<f64, D>;

pub type Vector2 = Vector<2>;
pub type Vector3 = Vector<3>;

/// Scales `disp` so that its length is at most `limit`.
///
/// Returns `None` for a (near) zero-length or non-finite displacement: the
/// caller applies nothing instead of dividing by zero.
pub fn bounded_step<const D: usize>(disp: &Vector<D>, limit: f64) -> Option<Vector<D>> {
    let length = disp.norm();
    if !length.is_finite() || length < f64::EPSILON {
        return None;
    }
    Some(disp * (length.min(limit) / length))
}

/// Uniformly random vector with every component in `[-0.5, 0.5)`.
pub fn jitter<const D: usize, R: Rng + ?Sized>(rng: &mut R) -> Vector<D> {
    Vector::from_fn(|_, _| rng.random_range(-0.5..0.5))
}

/// Component-wise clamp of `point` into the box `[lo, hi]`.
pub fn clamp_into<const D: usize>(point: &Vector<D>, lo: &Vector<D>, hi: &Vector<D>) -> Vector<D> {
    Vector::from_fn(|i, _| point[i].clamp(lo[i], hi[i]))
}

/// Arithmetic mean of `points`, or `None` when there are none.
pub fn centroid<'a, const D: usize>(points: impl IntoIterator<Item = &'a Vector<D>>) -> Option<Vector<D>> {
    let mut sum = Vector::<D>::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Rotation about the z axis (screen normal).
pub fn roll(angle: f64) -> Matrix3<f64> {
    let (sin, cos) = angle.sin_cos();
    Matrix3::new(cos, -sin, 0.0, sin, cos, 0.0, 0.0, 0.0, 1.0)
}

/// Rotation about the x axis (screen horizontal).
pub fn pitch(angle: f64) -> Matrix3<f64> {
    let (sin, cos) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, cos, -sin, 0.0, sin, cos)
}
