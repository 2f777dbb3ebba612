//! Full spin-echo sequence: pulse ordering, dephasing spread, decay and
//! the refocusing flip.

mod common;

use approx::assert_abs_diff_eq;
use spin_sim_core::core_types::vec3::Y_HAT;
use spin_sim_core::{decayed_length, EchoPhase, EchoPolicy, SpinEcho, SpinEchoConfig};
use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

#[test]
fn test_single_shot_phase_order() {
    let mut echo = SpinEcho::new(SpinEchoConfig::default());
    let mut phases = vec![echo.phase()];
    let mut total_pause = Duration::ZERO;
    while !echo.is_done() {
        let step = echo.step().unwrap();
        phases.push(step.phase);
        total_pause += step.pause;
    }

    assert_eq!(phases[0], EchoPhase::Idle);
    assert_eq!(phases[1], EchoPhase::Pulse90);
    assert_eq!(phases[2], EchoPhase::Dephasing { tick: 0 });
    assert_eq!(phases[201], EchoPhase::Dephasing { tick: 199 });
    assert_eq!(phases[202], EchoPhase::Pulse180);
    assert_eq!(phases[203], EchoPhase::Done);
    assert_eq!(phases.len(), 204);

    let counters = echo.counters();
    assert_eq!(counters.pulses_90, 1);
    assert_eq!(counters.dephase_ticks, 200);
    assert_eq!(counters.pulses_180, 1);

    // 1 s before, 1 s after the 90° pulse, 200 × 80 ms while dephasing
    assert_eq!(total_pause, Duration::from_secs(2) + Duration::from_millis(80) * 200);
}

#[test]
fn test_dephasing_spreads_ensemble_symmetrically() {
    let mut echo = SpinEcho::new(SpinEchoConfig::default());
    while echo.phase() != EchoPhase::Pulse180 {
        echo.step().unwrap();
    }

    let ens = echo.ensemble();
    assert_eq!(ens.len(), 10);
    assert_abs_diff_eq!(ens.net_speed(), 0.0, epsilon = 1e-12);

    // After 200 ticks the outermost spins have accrued ±θmax from +x
    let first = ens.spins()[0].segment.axis();
    let last = ens.spins()[9].segment.axis();
    assert_abs_diff_eq!(first.y.atan2(first.x), -FRAC_PI_2, epsilon = 1e-9);
    assert_abs_diff_eq!(last.y.atan2(last.x), FRAC_PI_2, epsilon = 1e-9);

    // Mirror pairs stay mirrored about the bulk direction
    for i in 0..5 {
        let a = ens.spins()[i].segment.axis();
        let b = ens.spins()[9 - i].segment.axis();
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
        assert_abs_diff_eq!(a.y, -b.y, epsilon = 1e-9);
    }
    assert!(ens.coherence() < 0.6);

    let expected = decayed_length(3.0, 0.1, 0.02, 1.99);
    assert_abs_diff_eq!(echo.magnetization().length(), expected, epsilon = 1e-9);
}

#[test]
fn test_refocusing_pulse_mirrors_accrued_phase() {
    let mut echo = SpinEcho::new(SpinEchoConfig::default());
    while echo.phase() != EchoPhase::Pulse180 {
        echo.step().unwrap();
    }
    let before: Vec<_> = echo
        .ensemble()
        .spins()
        .iter()
        .map(|s| s.segment.axis())
        .collect();
    echo.step().unwrap();

    // π about y maps (x, y, z) to (−x, y, −z): transverse phase φ becomes π − φ
    for (spin, prev) in echo.ensemble().spins().iter().zip(&before) {
        let axis = spin.segment.axis();
        assert!(spin.segment.is_visible());
        assert_abs_diff_eq!(axis.x, -prev.x, epsilon = 1e-12);
        assert_abs_diff_eq!(axis.y, prev.y, epsilon = 1e-12);
        assert_abs_diff_eq!(axis.z, -prev.z, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(
        echo.magnetization().axis().normalize().dot(&Y_HAT),
        0.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_custom_ensemble_size_and_cyclic_policy() {
    let config = SpinEchoConfig {
        spin_count: 7,
        duration: 0.5,
        policy: EchoPolicy::Cyclic,
        ..SpinEchoConfig::default()
    };
    let mut echo = SpinEcho::new(config);
    assert_eq!(echo.dephase_steps(), 50);
    assert_eq!(echo.ensemble().len(), 7);

    for _ in 0..3 {
        let taken = echo.run_to_completion().unwrap();
        assert_eq!(taken, 53);
    }
    assert_eq!(echo.counters().cycles_completed, 3);
    assert_eq!(echo.phase(), EchoPhase::Idle);
}
