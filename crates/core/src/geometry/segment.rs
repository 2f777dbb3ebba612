//! Directed line segment (arrow) with mutable axis and length.

use crate::core_types::vec3::{rotation, unit_axis, Vec3};
use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

/// A directed vector drawn from `pos` to `pos + axis`.
///
/// The axis magnitude is the segment length. Each segment is the single
/// authoritative copy of its orientation; rotations mutate it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientedSegment {
    pos: Vec3,
    axis: Vec3,
    visible: bool,
}

impl OrientedSegment {
    /// Create a visible segment
    pub fn new(pos: Vec3, axis: Vec3) -> Self {
        Self {
            pos,
            axis,
            visible: true,
        }
    }

    /// Create a segment that starts hidden
    pub fn hidden(pos: Vec3, axis: Vec3) -> Self {
        Self {
            pos,
            axis,
            visible: false,
        }
    }

    /// Base position
    #[inline]
    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    /// Axis vector (direction × length)
    #[inline]
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Tip position (`pos + axis`)
    #[inline]
    pub fn tip(&self) -> Vec3 {
        self.pos + self.axis
    }

    /// Segment length (never negative)
    #[inline]
    pub fn length(&self) -> f64 {
        self.axis.norm()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Replace the axis wholesale
    pub fn set_axis(&mut self, axis: Vec3) {
        self.axis = axis;
    }

    /// Rescale the axis to `length` without changing its direction.
    ///
    /// # Errors
    /// - [`GeometryError::NegativeLength`] if `length < 0`
    /// - [`GeometryError::DegenerateAxis`] if the current axis is zero and
    ///   `length > 0` (no direction to keep)
    pub fn set_length(&mut self, length: f64) -> Result<(), GeometryError> {
        if length < 0.0 || length.is_nan() {
            return Err(GeometryError::NegativeLength(length));
        }
        if length == 0.0 {
            self.axis = Vec3::zeros();
            return Ok(());
        }
        let dir = unit_axis(&self.axis, "set_length")?;
        self.axis = dir.into_inner() * length;
        Ok(())
    }

    /// Rotate the whole segment by `angle` about the line through `origin`
    /// along `axis`. Both the base position and the axis direction turn.
    ///
    /// # Errors
    /// Returns [`GeometryError::DegenerateAxis`] for a zero rotation axis.
    pub fn rotate(&mut self, angle: f64, axis: &Vec3, origin: &Vec3) -> Result<(), GeometryError> {
        let rot = rotation(angle, axis)?;
        self.pos = origin + rot * (self.pos - origin);
        self.axis = rot * self.axis;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::vec3::{X_HAT, Y_HAT, Z_HAT};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_tip_is_pos_plus_axis() {
        let seg = OrientedSegment::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(seg.tip(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(seg.length(), 2.0);
    }

    #[test]
    fn test_rotate_moves_base_about_origin() {
        // Arrow centred on the origin keeps its centre there after rotating
        let mut seg = OrientedSegment::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0));
        seg.rotate(FRAC_PI_2, &X_HAT, &Vec3::zeros()).unwrap();
        assert_abs_diff_eq!(seg.pos(), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(seg.axis(), Vec3::new(0.0, -2.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(seg.pos() + seg.axis() / 2.0, Vec3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_set_length_keeps_direction() {
        let mut seg = OrientedSegment::new(Vec3::zeros(), Vec3::new(3.0, 0.0, 0.0));
        seg.set_length(1.5).unwrap();
        assert_abs_diff_eq!(seg.axis(), X_HAT * 1.5, epsilon = 1e-12);
        seg.set_length(0.0).unwrap();
        assert_eq!(seg.length(), 0.0);
    }

    #[test]
    fn test_set_length_rejects_negative() {
        let mut seg = OrientedSegment::new(Vec3::zeros(), Y_HAT);
        assert_eq!(seg.set_length(-1.0), Err(GeometryError::NegativeLength(-1.0)));
        assert_eq!(seg.length(), 1.0);
    }

    #[test]
    fn test_set_length_on_zero_axis_fails_explicitly() {
        let mut seg = OrientedSegment::new(Vec3::zeros(), Vec3::zeros());
        assert_eq!(
            seg.set_length(2.0),
            Err(GeometryError::DegenerateAxis {
                operation: "set_length"
            })
        );
    }

    #[test]
    fn test_rotate_zero_axis_leaves_segment_untouched() {
        let mut seg = OrientedSegment::new(Vec3::zeros(), Z_HAT);
        assert!(seg.rotate(1.0, &Vec3::zeros(), &Vec3::zeros()).is_err());
        assert_eq!(seg.axis(), Z_HAT);
    }
}
