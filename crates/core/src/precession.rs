//! Larmor precession demo state
//!
//! A tilted magnetization arrow centred on a pivot sphere precesses about
//! the static field axis (z). Each tick:
//! 1. read field strength B and the selected gyromagnetic ratio γ
//! 2. ω = γ·B
//! 3. rotate by `ω / divisor · dt` about z through the pivot
//! 4. record the tip in the bounded trail
//! 5. refresh the two text displays

use crate::config::PrecessionConfig;
use crate::core_types::units::{Hertz, HertzPerTesla, Tesla};
use crate::core_types::vec3::{Vec3, X_HAT, Z_HAT};
use crate::error::GeometryError;
use crate::geometry::{OrientedSegment, Trail};
use crate::scene::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Nucleus presets offered as mutually exclusive ratio controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Nucleus {
    #[default]
    Proton,
    #[serde(rename = "carbon-13")]
    Carbon13,
    #[serde(rename = "sodium-23")]
    Sodium23,
    #[serde(rename = "phosphorus-31")]
    Phosphorus31,
    #[serde(rename = "helium-3")]
    Helium3,
}

impl Nucleus {
    /// Control order as presented to the user
    pub const ALL: [Nucleus; 5] = [
        Nucleus::Proton,
        Nucleus::Carbon13,
        Nucleus::Sodium23,
        Nucleus::Phosphorus31,
        Nucleus::Helium3,
    ];

    /// Gyromagnetic ratio in Hz/T
    pub const fn ratio(self) -> HertzPerTesla {
        match self {
            Nucleus::Proton => HertzPerTesla::new(42.58e6),
            Nucleus::Carbon13 => HertzPerTesla::new(10.71e6),
            Nucleus::Sodium23 => HertzPerTesla::new(11.26e6),
            Nucleus::Phosphorus31 => HertzPerTesla::new(17.23e6),
            // Negative ratio: precesses the other way round
            Nucleus::Helium3 => HertzPerTesla::new(-32.43e6),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Nucleus::Proton => "Proton",
            Nucleus::Carbon13 => "Carbon-13",
            Nucleus::Sodium23 => "Sodium-23",
            Nucleus::Phosphorus31 => "Phosphorus-31",
            Nucleus::Helium3 => "Helium-3",
        }
    }

    /// Control label, e.g. `"Proton (42.58 MHz/T)"`
    pub fn label(self) -> String {
        format!("{} ({})", self.name(), self.ratio())
    }
}

impl fmt::Display for Nucleus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Nucleus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "proton" | "h" | "h1" | "1h" => Ok(Nucleus::Proton),
            "carbon13" | "carbon" | "c13" | "13c" => Ok(Nucleus::Carbon13),
            "sodium23" | "sodium" | "na23" | "23na" => Ok(Nucleus::Sodium23),
            "phosphorus31" | "phosphorus" | "p31" | "31p" => Ok(Nucleus::Phosphorus31),
            "helium3" | "helium" | "he3" | "3he" => Ok(Nucleus::Helium3),
            _ => Err(format!(
                "unknown nucleus '{s}' (expected proton, carbon-13, sodium-23, phosphorus-31, helium-3)"
            )),
        }
    }
}

/// Exclusive ratio selection: exactly one nucleus is active at any time.
///
/// Replaces N independent checkboxes; the last activation wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NucleusSelection {
    active: Nucleus,
}

impl NucleusSelection {
    pub fn new(active: Nucleus) -> Self {
        Self { active }
    }

    pub fn active(&self) -> Nucleus {
        self.active
    }

    /// Activate `nucleus`, implicitly clearing every other control.
    /// Returns `true` if the selection changed.
    pub fn select(&mut self, nucleus: Nucleus) -> bool {
        let changed = self.active != nucleus;
        self.active = nucleus;
        changed
    }

    /// Apply a checkbox toggle. Checking a control selects it; unchecking
    /// the active control is ignored so one ratio always stays in effect.
    pub fn toggle(&mut self, nucleus: Nucleus, checked: bool) -> bool {
        if checked {
            self.select(nucleus)
        } else {
            false
        }
    }

    /// Checked state of one control
    pub fn is_checked(&self, nucleus: Nucleus) -> bool {
        self.active == nucleus
    }

    /// Checked state of every control, in [`Nucleus::ALL`] order
    pub fn states(&self) -> [(Nucleus, bool); 5] {
        Nucleus::ALL.map(|n| (n, self.is_checked(n)))
    }
}

/// The two text displays next to the slider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReadout {
    /// e.g. `"B0: 3.00 T"`
    pub field_text: String,
    /// e.g. `"Larmor Frequency: 1.28e+08 Hz"`
    pub frequency_text: String,
}

impl FieldReadout {
    pub fn new(field: Tesla, frequency: Hertz) -> Self {
        Self {
            field_text: format!("B0: {field}"),
            frequency_text: format!("Larmor Frequency: {frequency}"),
        }
    }
}

impl fmt::Display for FieldReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.field_text, self.frequency_text)
    }
}

/// Running precession demo; owned by the caller's control loop
#[derive(Debug, Clone)]
pub struct Precession {
    config: PrecessionConfig,
    pivot: Vec3,
    magnetization: OrientedSegment,
    trail: Trail,
    field: Tesla,
    selection: NucleusSelection,
    readout: FieldReadout,
    ticks: u64,
}

impl Precession {
    pub const PIVOT_COLOR: Rgb = Rgb::BLUE;
    pub const MAGNETIZATION_COLOR: Rgb = Rgb::RED;
    pub const TRAIL_COLOR: Rgb = Rgb::RED;

    /// Set up the tilted arrow, empty trail and initial controls.
    ///
    /// # Errors
    /// Propagates [`GeometryError`] from the initial tilt rotation.
    pub fn new(config: PrecessionConfig) -> Result<Self, GeometryError> {
        let pivot = Vec3::zeros();
        let axis = Z_HAT * config.arrow_length;
        let mut magnetization = OrientedSegment::new(pivot - axis / 2.0, axis);
        magnetization.rotate(config.tilt_degrees.to_radians(), &X_HAT, &pivot)?;

        let min = Tesla::new(config.field_min);
        let initial = Tesla::new(config.initial_field);
        let field = if initial.is_finite() {
            initial.clamp_to(min, Tesla::new(config.field_max))
        } else {
            warn!("Initial field {} is not finite, starting at {}", *initial, min);
            min
        };
        let selection = NucleusSelection::new(config.nucleus);
        let readout = FieldReadout::new(field, selection.active().ratio() * field);
        let trail = Trail::new(config.trail_capacity);

        info!(
            "Precession ready: {} at {}, tilt {:.1}°",
            selection.active(),
            field,
            config.tilt_degrees
        );

        Ok(Self {
            config,
            pivot,
            magnetization,
            trail,
            field,
            selection,
            readout,
            ticks: 0,
        })
    }

    pub fn config(&self) -> &PrecessionConfig {
        &self.config
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn magnetization(&self) -> &OrientedSegment {
        &self.magnetization
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn field(&self) -> Tesla {
        self.field
    }

    pub fn selection(&self) -> &NucleusSelection {
        &self.selection
    }

    pub fn nucleus(&self) -> Nucleus {
        self.selection.active()
    }

    pub fn readout(&self) -> &FieldReadout {
        &self.readout
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Elapsed simulated time (`ticks · dt`)
    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 * self.config.dt
    }

    /// Slider callback: set B (clamped to the slider range) and refresh the displays.
    /// A non-finite field is rejected and the previous field kept.
    pub fn set_field(&mut self, field: Tesla) -> &FieldReadout {
        if !field.is_finite() {
            warn!("Field {} is not finite, keeping {}", *field, self.field);
            return self.refresh_readout();
        }
        let clamped = field.clamp_to(
            Tesla::new(self.config.field_min),
            Tesla::new(self.config.field_max),
        );
        if clamped != field {
            warn!(
                "Field {} outside [{}, {}], clamped to {}",
                *field, self.config.field_min, self.config.field_max, clamped
            );
        }
        self.field = clamped;
        self.refresh_readout()
    }

    /// Ratio control callback: activate `nucleus` (clearing the others) and refresh
    pub fn select_nucleus(&mut self, nucleus: Nucleus) -> &FieldReadout {
        if self.selection.select(nucleus) {
            info!("Selected {}", nucleus.label());
        }
        self.refresh_readout()
    }

    /// Checkbox callback with the toggled state
    pub fn toggle_nucleus(&mut self, nucleus: Nucleus, checked: bool) -> &FieldReadout {
        if self.selection.toggle(nucleus, checked) {
            info!("Selected {}", nucleus.label());
        }
        self.refresh_readout()
    }

    /// Larmor frequency ω = γ·B
    pub fn larmor_frequency(&self) -> Hertz {
        self.selection.active().ratio() * self.field
    }

    /// Rotation applied per tick: `ω / divisor · dt`
    pub fn step_angle(&self) -> f64 {
        *self.larmor_frequency() / self.config.frequency_divisor * self.config.dt
    }

    /// Advance one tick
    ///
    /// # Errors
    /// Propagates [`GeometryError`] from the rotation primitive.
    pub fn tick(&mut self) -> Result<(), GeometryError> {
        let angle = self.step_angle();
        self.magnetization.rotate(angle, &Z_HAT, &self.pivot)?;
        self.trail.push(self.magnetization.tip());
        self.refresh_readout();
        self.ticks += 1;
        debug!(tick = self.ticks, angle, "precession tick");
        Ok(())
    }

    fn refresh_readout(&mut self) -> &FieldReadout {
        self.readout = FieldReadout::new(self.field, self.larmor_frequency());
        &self.readout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn demo() -> Precession {
        Precession::new(PrecessionConfig::default()).unwrap()
    }

    #[test]
    fn test_initial_tilt_keeps_arrow_centred() {
        let p = demo();
        let m = p.magnetization();
        assert_abs_diff_eq!(m.pos() + m.axis() / 2.0, Vec3::zeros(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.length(), 2.0, epsilon = 1e-12);
        // 30° about +x tips +z towards -y
        let expected = Vec3::new(0.0, -(30f64.to_radians().sin()), 30f64.to_radians().cos()) * 2.0;
        assert_abs_diff_eq!(m.axis(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_initial_readout() {
        let p = demo();
        assert_eq!(p.readout().field_text, "B0: 3.00 T");
        assert_eq!(p.readout().frequency_text, "Larmor Frequency: 1.28e+08 Hz");
    }

    #[test]
    fn test_step_angle_uses_divisor_and_dt() {
        let p = demo();
        assert_abs_diff_eq!(p.step_angle(), 42.58e6 * 3.0 / 1e8 * 0.01, epsilon = 1e-15);
    }

    #[test]
    fn test_tick_rotates_about_z_and_records_tip() {
        let mut p = demo();
        let before = p.magnetization().clone();
        p.tick().unwrap();
        let after = p.magnetization();
        // z components unchanged by rotation about z
        assert_abs_diff_eq!(after.tip().z, before.tip().z, epsilon = 1e-12);
        assert_abs_diff_eq!(after.length(), before.length(), epsilon = 1e-12);
        assert_eq!(p.trail().len(), 1);
        assert_eq!(p.trail().newest(), Some(&after.tip()));
        assert_eq!(p.ticks(), 1);
    }

    #[test]
    fn test_zero_field_does_not_move() {
        let mut p = demo();
        p.set_field(Tesla::new(0.0));
        let before = p.magnetization().clone();
        p.tick().unwrap();
        assert_abs_diff_eq!(p.magnetization().axis(), before.axis(), epsilon = 1e-15);
        assert_eq!(p.readout().frequency_text, "Larmor Frequency: 0.00e+00 Hz");
    }

    #[test]
    fn test_field_is_clamped_to_slider_range() {
        let mut p = demo();
        p.set_field(Tesla::new(12.0));
        assert_eq!(p.field(), Tesla::new(7.0));
        p.set_field(Tesla::new(-1.0));
        assert_eq!(p.field(), Tesla::new(0.0));
    }

    #[test]
    fn test_non_finite_field_keeps_previous_field() {
        let mut p = demo();
        p.set_field(Tesla::new(2.0));
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let readout = p.set_field(Tesla::new(bad)).clone();
            assert_eq!(readout.field_text, "B0: 2.00 T");
            assert_eq!(p.field(), Tesla::new(2.0));
        }
        p.tick().unwrap();
        let axis = p.magnetization().axis();
        assert!(axis.iter().all(|c| c.is_finite()));
        assert_abs_diff_eq!(p.magnetization().length(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_initial_field_starts_at_minimum() {
        let config = PrecessionConfig {
            initial_field: f64::NAN,
            ..PrecessionConfig::default()
        };
        let p = Precession::new(config).unwrap();
        assert_eq!(p.field(), Tesla::new(0.0));
        assert!(p.step_angle().is_finite());
    }

    #[test]
    fn test_display_colours() {
        assert_eq!(Precession::PIVOT_COLOR, Rgb::BLUE);
        assert_eq!(Precession::MAGNETIZATION_COLOR, Rgb::RED);
        assert_eq!(Precession::TRAIL_COLOR, Rgb::RED);
    }

    #[test]
    fn test_helium_precesses_opposite_way() {
        let mut proton = demo();
        let mut helium = demo();
        helium.select_nucleus(Nucleus::Helium3);
        proton.tick().unwrap();
        helium.tick().unwrap();
        assert!(proton.step_angle() > 0.0);
        assert!(helium.step_angle() < 0.0);
        assert!((proton.magnetization().tip().x * helium.magnetization().tip().x) < 0.0);
    }

    #[test]
    fn test_selection_is_exclusive_and_last_wins() {
        let mut sel = NucleusSelection::default();
        assert!(sel.is_checked(Nucleus::Proton));
        assert!(sel.toggle(Nucleus::Sodium23, true));
        assert!(sel.toggle(Nucleus::Helium3, true));
        let checked: Vec<Nucleus> = sel
            .states()
            .iter()
            .filter(|(_, on)| *on)
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(checked, vec![Nucleus::Helium3]);
        // Unchecking the active control keeps it active
        assert!(!sel.toggle(Nucleus::Helium3, false));
        assert_eq!(sel.active(), Nucleus::Helium3);
    }

    #[test]
    fn test_nucleus_parsing_and_labels() {
        assert_eq!("Carbon-13".parse::<Nucleus>(), Ok(Nucleus::Carbon13));
        assert_eq!("13C".parse::<Nucleus>(), Ok(Nucleus::Carbon13));
        assert_eq!("na23".parse::<Nucleus>(), Ok(Nucleus::Sodium23));
        assert!("xenon".parse::<Nucleus>().is_err());
        assert_eq!(Nucleus::Proton.label(), "Proton (42.58 MHz/T)");
        assert_eq!(Nucleus::Helium3.label(), "Helium-3 (-32.43 MHz/T)");
    }
}
