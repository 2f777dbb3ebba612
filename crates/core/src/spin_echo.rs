//! Spin-echo sequencer
//!
//! Finite state machine `Idle → Pulse90 → Dephasing → Pulse180 → Done`
//! driven by [`SpinEcho::step`], one transition per call. Pacing pauses are
//! returned to the caller rather than slept here, so a frame-driven
//! renderer can count them down and tests run instantly.
//!
//! Rephasing after the 180° pulse is not simulated; the ensemble is left
//! flipped, ready to reconverge.

use crate::config::SpinEchoConfig;
use crate::core_types::vec3::{Vec3, X_HAT, Y_HAT, Z_HAT};
use crate::error::GeometryError;
use crate::geometry::{OrientedSegment, SpinEnsemble};
use crate::scene::Rgb;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Bulk magnetization length after `t` time units of dephasing:
/// `M0 · exp(−t · (M0 / T2) · k)`.
///
/// `k` is a visualization scale, not a physical constant.
pub fn decayed_length(m0: f64, t2: f64, k: f64, t: f64) -> f64 {
    m0 * (-t * (m0 / t2) * k).exp()
}

/// What happens after the 180° pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EchoPolicy {
    /// Run the sequence once and stop in [`EchoPhase::Done`]
    #[default]
    SingleShot,
    /// Reset the vectors and start over from [`EchoPhase::Idle`]
    Cyclic,
}

/// Sequencer state. The phase names the work the *next* step performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoPhase {
    /// Waiting to start
    Idle,
    /// Next step applies the 90° pulse
    Pulse90,
    /// Next step performs dephasing tick `tick` (0-based)
    Dephasing { tick: usize },
    /// Next step applies the 180° refocusing pulse
    Pulse180,
    /// Sequence finished (single-shot)
    Done,
}

impl fmt::Display for EchoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EchoPhase::Idle => f.write_str("idle"),
            EchoPhase::Pulse90 => f.write_str("90° pulse"),
            EchoPhase::Dephasing { tick } => write!(f, "dephasing (tick {tick})"),
            EchoPhase::Pulse180 => f.write_str("180° pulse"),
            EchoPhase::Done => f.write_str("done"),
        }
    }
}

/// Result of one [`SpinEcho::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoStep {
    /// Phase the sequencer is in after the step
    pub phase: EchoPhase,
    /// How long the caller should hold the frame before the next step
    pub pause: Duration,
}

/// Counts of work performed, for checking the sequence ran exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EchoCounters {
    pub pulses_90: usize,
    pub dephase_ticks: usize,
    pub pulses_180: usize,
    pub cycles_completed: usize,
}

/// Spin-echo demo state; owned by the caller's control loop
#[derive(Debug, Clone)]
pub struct SpinEcho {
    config: SpinEchoConfig,
    center: Vec3,
    pulse_axis: Vec3,
    magnetization: OrientedSegment,
    ensemble: SpinEnsemble,
    phase: EchoPhase,
    steps: usize,
    counters: EchoCounters,
}

impl SpinEcho {
    pub const MAGNETIZATION_COLOR: Rgb = Rgb::RED;
    pub const SPIN_COLOR: Rgb = Rgb::BLUE;

    /// Bulk vector along +z with length M0; spins hidden along +x.
    pub fn new(config: SpinEchoConfig) -> Self {
        let center = Vec3::zeros();
        let steps = config.dephase_steps();
        let magnetization = OrientedSegment::new(center, Z_HAT * config.m0);
        let template = OrientedSegment::hidden(center, X_HAT * config.spin_length);
        let ensemble = SpinEnsemble::new(config.spin_count, &template, config.theta_max, steps);

        info!(
            "Spin echo ready: M0={}, T2={}, {} spins, {} dephasing ticks, {:?}",
            config.m0,
            config.t2,
            ensemble.len(),
            steps,
            config.policy
        );

        Self {
            config,
            center,
            pulse_axis: Y_HAT,
            magnetization,
            ensemble,
            phase: EchoPhase::Idle,
            steps,
            counters: EchoCounters::default(),
        }
    }

    pub fn config(&self) -> &SpinEchoConfig {
        &self.config
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn phase(&self) -> EchoPhase {
        self.phase
    }

    pub fn magnetization(&self) -> &OrientedSegment {
        &self.magnetization
    }

    pub fn ensemble(&self) -> &SpinEnsemble {
        &self.ensemble
    }

    pub fn counters(&self) -> EchoCounters {
        self.counters
    }

    /// Number of dephasing ticks per sequence
    pub fn dephase_steps(&self) -> usize {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.phase == EchoPhase::Done
    }

    /// Perform one transition.
    ///
    /// Stepping in [`EchoPhase::Done`] is a no-op.
    ///
    /// # Errors
    /// Propagates [`GeometryError`] from rotations and length rescaling.
    pub fn step(&mut self) -> Result<EchoStep, GeometryError> {
        let (next, pause) = match self.phase {
            EchoPhase::Idle => {
                info!("Spin-echo sequence starting");
                (EchoPhase::Pulse90, self.config.pre_sequence_pause())
            }
            EchoPhase::Pulse90 => {
                self.pulse_90()?;
                (EchoPhase::Dephasing { tick: 0 }, self.config.post_pulse_pause())
            }
            EchoPhase::Dephasing { tick } => {
                self.dephase_tick(tick)?;
                let next = if tick + 1 >= self.steps {
                    info!(
                        "Dephasing complete after {} ticks, coherence {:.3}",
                        tick + 1,
                        self.ensemble.coherence()
                    );
                    EchoPhase::Pulse180
                } else {
                    EchoPhase::Dephasing { tick: tick + 1 }
                };
                (next, self.config.dephase_tick_pause())
            }
            EchoPhase::Pulse180 => {
                self.pulse_180()?;
                self.counters.cycles_completed += 1;
                let next = match self.config.policy {
                    EchoPolicy::SingleShot => EchoPhase::Done,
                    EchoPolicy::Cyclic => {
                        self.reset_vectors();
                        EchoPhase::Idle
                    }
                };
                (next, Duration::ZERO)
            }
            EchoPhase::Done => (EchoPhase::Done, Duration::ZERO),
        };
        self.phase = next;
        Ok(EchoStep { phase: next, pause })
    }

    /// Step until [`EchoPhase::Done`], ignoring pauses. Returns the number of steps taken.
    ///
    /// Under [`EchoPolicy::Cyclic`] this stops after one full cycle instead.
    ///
    /// # Errors
    /// Propagates [`GeometryError`] from [`SpinEcho::step`].
    pub fn run_to_completion(&mut self) -> Result<usize, GeometryError> {
        let start_cycles = self.counters.cycles_completed;
        let mut taken = 0;
        while !self.is_done() && self.counters.cycles_completed == start_cycles {
            self.step()?;
            taken += 1;
        }
        Ok(taken)
    }

    /// Return every vector to its starting state and the phase to `Idle`
    pub fn reset(&mut self) {
        self.reset_vectors();
        self.phase = EchoPhase::Idle;
        self.counters = EchoCounters::default();
    }

    /// +90° about the transverse axis tips the bulk vector into the xy-plane,
    /// then the ensemble appears colinear with it
    fn pulse_90(&mut self) -> Result<(), GeometryError> {
        self.magnetization
            .rotate(FRAC_PI_2, &self.pulse_axis, &self.center)?;
        self.ensemble.reveal();
        self.counters.pulses_90 += 1;
        info!(
            "90° pulse applied, M = ({:.3}, {:.3}, {:.3})",
            self.magnetization.axis().x,
            self.magnetization.axis().y,
            self.magnetization.axis().z
        );
        Ok(())
    }

    /// Each spin turns by its own increment; the bulk vector decays
    fn dephase_tick(&mut self, tick: usize) -> Result<(), GeometryError> {
        self.ensemble.advance(&self.center)?;
        let t = tick as f64 * self.config.dt;
        let length = decayed_length(self.config.m0, self.config.t2, self.config.decay_scale, t);
        self.magnetization.set_length(length)?;
        self.counters.dephase_ticks += 1;
        debug!(tick, t, length, "dephasing tick");
        Ok(())
    }

    /// +180° about the same transverse axis for the bulk vector and every spin
    fn pulse_180(&mut self) -> Result<(), GeometryError> {
        self.magnetization.rotate(PI, &self.pulse_axis, &self.center)?;
        self.ensemble.reveal();
        self.ensemble.rotate_all(PI, &self.pulse_axis, &self.center)?;
        self.counters.pulses_180 += 1;
        info!("180° refocusing pulse applied");
        Ok(())
    }

    fn reset_vectors(&mut self) {
        self.magnetization = OrientedSegment::new(self.center, Z_HAT * self.config.m0);
        self.ensemble.reset();
    }
}
