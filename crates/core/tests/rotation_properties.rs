//! Properties of the rotation primitive and directed segments under
//! long-running incremental rotation.

mod common;

use approx::assert_abs_diff_eq;
use spin_sim_core::core_types::vec3::{rotate, Y_HAT, Z_HAT};
use spin_sim_core::{GeometryError, OrientedSegment, Vec3};
use std::f64::consts::TAU;

fn axes() -> Vec<Vec3> {
    vec![
        Z_HAT,
        Y_HAT,
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-0.3, 2.0, 0.7),
        Vec3::new(0.0, 0.0, -4.0),
    ]
}

#[test]
fn test_composition_law() {
    let p = Vec3::new(0.4, -1.1, 2.3);
    let origin = Vec3::new(0.5, 0.25, -1.0);
    let angles = [-2.7, -0.5, 0.0, 0.013, 1.1, 3.9];

    for axis in axes() {
        for &a in &angles {
            for &b in &angles {
                let twice = rotate(&rotate(&p, a, &axis, &origin).unwrap(), b, &axis, &origin).unwrap();
                let once = rotate(&p, a + b, &axis, &origin).unwrap();
                assert_abs_diff_eq!(twice, once, epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn test_full_turn_identity_for_any_axis() {
    let p = Vec3::new(-2.0, 0.5, 1.25);
    for axis in axes() {
        let q = rotate(&p, TAU, &axis, &Vec3::zeros()).unwrap();
        assert_abs_diff_eq!(q, p, epsilon = 1e-9);
    }
}

#[test]
fn test_thousands_of_increments_do_not_drift() {
    // 10_000 small steps summing to exactly 4 full turns
    let steps = 10_000;
    let angle = 4.0 * TAU / f64::from(steps);
    let mut seg = OrientedSegment::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 2.0));
    let start = seg.clone();
    for _ in 0..steps {
        seg.rotate(angle, &Z_HAT, &Vec3::zeros()).unwrap();
    }
    assert_abs_diff_eq!(seg.length(), start.length(), epsilon = 1e-9);
    assert_abs_diff_eq!(seg.axis(), start.axis(), epsilon = 1e-9);
    assert_abs_diff_eq!(seg.pos(), start.pos(), epsilon = 1e-9);
}

#[test]
fn test_degenerate_axis_fails_without_nan() {
    let err = rotate(&Vec3::new(1.0, 2.0, 3.0), 0.5, &Vec3::zeros(), &Vec3::zeros()).unwrap_err();
    assert!(matches!(err, GeometryError::DegenerateAxis { .. }));
    assert!(err.to_string().contains("non-zero axis"));
}
