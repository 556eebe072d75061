//! Small vector and statistics helpers shared by the analysis stages.
//!
//! All computations are done in single precision, matching the precision the
//! spines are recorded with.

use nalgebra::{Quaternion, Vector4};

use crate::constants::{Quat, Transform, Vec3};

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: &Vec3, b: &Vec3) -> f32 {
    (b - a).norm()
}

/// Apply a homogeneous transform to a point (`w = 1`) and drop the `w` component.
///
/// The result is **not** divided by `w`: local-to-world transforms of a volume are
/// affine, so the last row is `(0, 0, 0, 1)` in practice.
#[inline]
pub fn transform_point(transform: &Transform, point: &Vec3) -> Vec3 {
    let p = transform * Vector4::new(point.x, point.y, point.z, 1.0);
    p.xyz()
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population standard deviation, `0.0` for an empty slice.
pub fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32;
    var.sqrt()
}

/// Standard score of `value` given a mean and a standard deviation.
#[inline]
pub fn z_score(value: f32, mean: f32, std_dev: f32) -> f32 {
    (value - mean) / std_dev
}

/// Rotation that turns `forward` onto `direction` (shortest arc, half-angle form).
///
/// With `forward = (0, 0, -1)` this gives the orientation of an object looking along
/// `direction`, e.g. to orient a marker along a gaze ray.
///
/// Arguments
/// -----------------
/// * `direction`: the target direction, expected to be normalized.
/// * `forward`: the reference direction, expected to be normalized.
///
/// Return
/// ----------
/// * A unit quaternion. The rotation is undefined (NaN components) when `direction`
///   is exactly opposite to `forward`.
pub fn quaternion_from_direction(direction: &Vec3, forward: &Vec3) -> Quat {
    let cross = forward.cross(direction);
    let w = direction.dot(forward);

    let norm = (cross.norm_squared() + w * w).sqrt();
    let x = ((w + norm) / 2.0).sqrt();

    Quaternion::new(
        x,
        cross.x / (2.0 * x),
        cross.y / (2.0 * x),
        cross.z / (2.0 * x),
    )
}

#[cfg(test)]
mod math_test {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, UnitQuaternion, Vector3};

    #[test]
    fn test_distance() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 6.0, 3.0);
        assert_eq!(distance(&a, &b), 5.0);
        assert_eq!(distance(&a, &a), 0.0);
    }

    #[test]
    fn test_transform_point() {
        let t = Matrix4::new_translation(&Vector3::new(1.0, -1.0, 2.0));
        let p = transform_point(&t, &Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Vector3::new(2.0, 0.0, 3.0));

        let s = Matrix4::new_scaling(2.0);
        let p = transform_point(&s, &Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(p, Vector3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_mean_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values), 5.0);
        assert_relative_eq!(std_dev(&values), 2.0);

        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[3.0]), 0.0);
    }

    #[test]
    fn test_z_score() {
        assert_relative_eq!(z_score(9.0, 5.0, 2.0), 2.0);
        assert_relative_eq!(z_score(3.0, 5.0, 2.0), -1.0);
    }

    #[test]
    fn test_quaternion_from_direction() {
        let forward = Vector3::new(0.0, 0.0, -1.0);

        let q = quaternion_from_direction(&forward, &forward);
        assert_relative_eq!(q.w, 1.0);
        assert_relative_eq!(q.imag().norm(), 0.0);

        let right = Vector3::new(1.0, 0.0, 0.0);
        let q = quaternion_from_direction(&right, &forward);
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-6);

        let rotated = UnitQuaternion::from_quaternion(q) * forward;
        assert_relative_eq!(rotated, right, epsilon = 1e-6);
    }
}
