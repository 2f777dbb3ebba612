//! Simulation configuration
//!
//! Every field defaults to the constants the demos were tuned with, so an
//! empty JSON object (or no file at all) reproduces the stock animations.

use crate::error::ConfigError;
use crate::precession::Nucleus;
use crate::scene::Rgb;
use crate::spin_echo::EchoPolicy;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Longest pause accepted for any spin-echo phase (s)
pub const MAX_PAUSE_S: f64 = 3600.0;
/// Slowest loop rate accepted (Hz)
pub const MIN_RATE_HZ: f64 = 0.01;
/// Fastest loop rate accepted (Hz)
pub const MAX_RATE_HZ: f64 = 1e6;
/// Largest trail a precession demo may keep
pub const MAX_TRAIL_CAPACITY: usize = 100_000;
/// Largest spin-echo ensemble
pub const MAX_SPIN_COUNT: usize = 10_000;
/// Most dephasing ticks in one sequence
pub const MAX_DEPHASE_STEPS: usize = 1_000_000;

/// Scene bootstrap parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Draw the labelled axis triad
    pub axes: bool,
    /// Length of each axis arrow
    pub axes_length: f64,
    /// Camera distance relative to the axis length
    pub zoom_out_factor: f64,
    pub background: Rgb,
    /// Canvas size in pixels
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    /// Show the camera-control caption
    pub caption: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            axes: true,
            axes_length: 1.0,
            zoom_out_factor: 1.0,
            background: Rgb::WHITE,
            width: 800,
            height: 800,
            title: None,
            caption: true,
        }
    }
}

/// Larmor precession demo parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecessionConfig {
    /// Fixed physics timestep per tick
    pub dt: f64,
    /// Larmor frequency is divided by this before it becomes an angle
    pub frequency_divisor: f64,
    /// Maximum number of tip positions kept in the trail
    pub trail_capacity: usize,
    /// Field strength at start (T)
    pub initial_field: f64,
    /// Slider range (T)
    pub field_min: f64,
    pub field_max: f64,
    /// Nucleus selected at start
    pub nucleus: Nucleus,
    /// Initial tilt of the magnetization about x (degrees)
    pub tilt_degrees: f64,
    /// Magnetization arrow length; the arrow is centred on the pivot
    pub arrow_length: f64,
    /// Radius of the pivot sphere
    pub pivot_radius: f64,
    /// Target loop rate (iterations per second)
    pub rate_hz: f64,
}

impl Default for PrecessionConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            frequency_divisor: 1e8,
            trail_capacity: 50,
            initial_field: 3.0,
            field_min: 0.0,
            field_max: 7.0,
            nucleus: Nucleus::Proton,
            tilt_degrees: 30.0,
            arrow_length: 2.0,
            pivot_radius: 0.5,
            rate_hz: 100.0,
        }
    }
}

/// Spin-echo sequence parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinEchoConfig {
    /// Equilibrium magnetization M0
    pub m0: f64,
    /// Spin-spin relaxation constant
    pub t2: f64,
    /// Ensemble size
    pub spin_count: usize,
    /// Length of each ensemble arrow
    pub spin_length: f64,
    /// Dephasing timestep
    pub dt: f64,
    /// Dephasing duration
    pub duration: f64,
    /// Largest angle any spin accrues during dephasing (radians)
    pub theta_max: f64,
    /// Visualization scale k in `M0 * exp(-t * (M0 / T2) * k)`
    pub decay_scale: f64,
    /// Pause before the sequence starts (s)
    pub pre_sequence_pause_s: f64,
    /// Pause after the 90° pulse (s)
    pub post_pulse_pause_s: f64,
    /// Pause after every dephasing tick (s)
    pub dephase_tick_pause_s: f64,
    /// Target loop rate (iterations per second)
    pub rate_hz: f64,
    pub policy: EchoPolicy,
}

impl Default for SpinEchoConfig {
    fn default() -> Self {
        Self {
            m0: 3.0,
            t2: 0.1,
            spin_count: 10,
            spin_length: 0.5,
            dt: 0.01,
            duration: 2.0,
            theta_max: FRAC_PI_2,
            decay_scale: 0.02,
            pre_sequence_pause_s: 1.0,
            post_pulse_pause_s: 1.0,
            dephase_tick_pause_s: 0.08,
            rate_hz: 100.0,
            policy: EchoPolicy::SingleShot,
        }
    }
}

impl SpinEchoConfig {
    /// Number of dephasing ticks (`duration / dt`, 200 by default)
    pub fn dephase_steps(&self) -> usize {
        (self.duration / self.dt).round() as usize
    }

    pub fn pre_sequence_pause(&self) -> Duration {
        pause(self.pre_sequence_pause_s)
    }

    pub fn post_pulse_pause(&self) -> Duration {
        pause(self.post_pulse_pause_s)
    }

    pub fn dephase_tick_pause(&self) -> Duration {
        pause(self.dephase_tick_pause_s)
    }
}

/// Seconds as a [`Duration`]; negative, NaN and out-of-range values give zero
fn pause(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_default()
}

/// Top-level configuration for both demos
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub scene: SceneConfig,
    pub precession: PrecessionConfig,
    pub spin_echo: SpinEchoConfig,
}

fn require_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

fn require_pause(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=MAX_PAUSE_S).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be within [0, {MAX_PAUSE_S}] s, got {value}"
        )))
    }
}

fn require_rate(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (MIN_RATE_HZ..=MAX_RATE_HZ).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be within [{MIN_RATE_HZ}, {MAX_RATE_HZ}] Hz, got {value}"
        )))
    }
}

fn require_count(name: &str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be within [{min}, {max}], got {value}"
        )))
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file and validate it
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or fails validation
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        let config = Self::from_json(&contents)?;
        info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a JSON string and validate it
    ///
    /// # Errors
    /// Returns error if the string cannot be parsed or fails validation
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter is inside its usable range
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending parameter
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scene = &self.scene;
        require_positive("scene.axes_length", scene.axes_length)?;
        require_positive("scene.zoom_out_factor", scene.zoom_out_factor)?;

        let p = &self.precession;
        require_positive("precession.dt", p.dt)?;
        require_positive("precession.frequency_divisor", p.frequency_divisor)?;
        require_positive("precession.arrow_length", p.arrow_length)?;
        require_non_negative("precession.pivot_radius", p.pivot_radius)?;
        require_rate("precession.rate_hz", p.rate_hz)?;
        require_count(
            "precession.trail_capacity",
            p.trail_capacity,
            1,
            MAX_TRAIL_CAPACITY,
        )?;
        if !(p.field_min.is_finite() && p.field_max.is_finite() && p.field_min <= p.field_max) {
            return Err(ConfigError::Invalid(format!(
                "precession field range [{}, {}] is not ordered",
                p.field_min, p.field_max
            )));
        }
        if !(p.field_min..=p.field_max).contains(&p.initial_field) {
            return Err(ConfigError::Invalid(format!(
                "precession.initial_field {} outside [{}, {}]",
                p.initial_field, p.field_min, p.field_max
            )));
        }

        let e = &self.spin_echo;
        require_positive("spin_echo.m0", e.m0)?;
        require_positive("spin_echo.t2", e.t2)?;
        require_positive("spin_echo.spin_length", e.spin_length)?;
        require_positive("spin_echo.dt", e.dt)?;
        require_positive("spin_echo.duration", e.duration)?;
        require_non_negative("spin_echo.theta_max", e.theta_max)?;
        require_non_negative("spin_echo.decay_scale", e.decay_scale)?;
        require_pause("spin_echo.pre_sequence_pause_s", e.pre_sequence_pause_s)?;
        require_pause("spin_echo.post_pulse_pause_s", e.post_pulse_pause_s)?;
        require_pause("spin_echo.dephase_tick_pause_s", e.dephase_tick_pause_s)?;
        require_rate("spin_echo.rate_hz", e.rate_hz)?;
        require_count("spin_echo.spin_count", e.spin_count, 0, MAX_SPIN_COUNT)?;
        require_count(
            "spin_echo.duration / spin_echo.dt",
            e.dephase_steps(),
            1,
            MAX_DEPHASE_STEPS,
        )?;
        Ok(())
    }
}
