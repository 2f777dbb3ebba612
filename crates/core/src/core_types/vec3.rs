//! Vector type alias and the rotation primitive.

use crate::error::GeometryError;
use nalgebra::{Rotation3, Unit, Vector3};

/// 3D vector type for positions and directed-segment axes.
///
/// Alias for `nalgebra::Vector3<f64>`. Double precision keeps rotation
/// composition within 1e-9 even after thousands of incremental ticks.
pub type Vec3 = Vector3<f64>;

/// Smallest axis magnitude accepted as a rotation direction
const AXIS_EPSILON: f64 = 1e-12;

/// Unit vector along x
pub const X_HAT: Vec3 = Vec3::new(1.0, 0.0, 0.0);
/// Unit vector along y
pub const Y_HAT: Vec3 = Vec3::new(0.0, 1.0, 0.0);
/// Unit vector along z (the static field direction)
pub const Z_HAT: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Normalize `axis`, failing on a zero-magnitude vector instead of producing NaN.
///
/// # Errors
/// Returns [`GeometryError::DegenerateAxis`] when `axis` has (near) zero length.
#[inline]
pub fn unit_axis(axis: &Vec3, operation: &'static str) -> Result<Unit<Vec3>, GeometryError> {
    Unit::try_new(*axis, AXIS_EPSILON).ok_or(GeometryError::DegenerateAxis { operation })
}

/// Right-handed rotation of `angle` radians about `axis`.
///
/// The axis is re-normalized on every call; nothing is cached between calls.
///
/// # Errors
/// Returns [`GeometryError::DegenerateAxis`] for a zero axis.
#[inline]
pub fn rotation(angle: f64, axis: &Vec3) -> Result<Rotation3<f64>, GeometryError> {
    let unit = unit_axis(axis, "rotate")?;
    Ok(Rotation3::from_axis_angle(&unit, angle))
}

/// Rotate `point` by `angle` about the line through `origin` along `axis`
/// (Rodrigues' rotation formula, via `Rotation3::from_axis_angle`).
///
/// # Errors
/// Returns [`GeometryError::DegenerateAxis`] for a zero axis.
pub fn rotate(point: &Vec3, angle: f64, axis: &Vec3, origin: &Vec3) -> Result<Vec3, GeometryError> {
    let rot = rotation(angle, axis)?;
    Ok(origin + rot * (point - origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn test_quarter_turn_about_z_is_right_handed() {
        let p = rotate(&X_HAT, FRAC_PI_2, &Z_HAT, &Vec3::zeros()).unwrap();
        assert_abs_diff_eq!(p, Y_HAT, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_need_not_be_normalized() {
        let a = rotate(&X_HAT, 0.7, &Vec3::new(0.0, 0.0, 5.0), &Vec3::zeros()).unwrap();
        let b = rotate(&X_HAT, 0.7, &Z_HAT, &Vec3::zeros()).unwrap();
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_about_offset_origin() {
        // (2,1,0) about z through (1,1,0) by π lands on (0,1,0)
        let origin = Vec3::new(1.0, 1.0, 0.0);
        let p = rotate(&Vec3::new(2.0, 1.0, 0.0), PI, &Z_HAT, &origin).unwrap();
        assert_abs_diff_eq!(p, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_full_turn_returns_original() {
        let p = Vec3::new(0.3, -1.2, 2.5);
        let axis = Vec3::new(1.0, 2.0, -0.5);
        let origin = Vec3::new(-1.0, 0.5, 0.25);
        let q = rotate(&p, TAU, &axis, &origin).unwrap();
        assert_abs_diff_eq!(p, q, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_axis_is_rejected() {
        let err = rotate(&X_HAT, 1.0, &Vec3::zeros(), &Vec3::zeros()).unwrap_err();
        assert_eq!(err, GeometryError::DegenerateAxis { operation: "rotate" });
    }
}
