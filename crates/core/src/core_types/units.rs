//! Semantic unit types for magnetic field quantities
//!
//! Newtype wrappers keep field strength, gyromagnetic ratio and frequency
//! from being mixed up at call sites.
//!
//! # Design Philosophy
//! - All quantities use f64
//! - Implements `Deref`, `Display`, arithmetic where it is physically meaningful
//! - Serde support for serialization
//! - Total ordering via `Ord` (NaN sorts greater than all values)
//!
//! # Usage
//! ```
//! use spin_sim_core::core_types::units::{HertzPerTesla, Tesla};
//!
//! let gamma = HertzPerTesla::new(42.58e6);
//! let omega = gamma * Tesla::new(3.0);
//! assert!((*omega - 127.74e6).abs() < 1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, Mul};

/// Compare f64 values with total ordering using `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Format `value` like C's `%.{decimals}e`: signed, at least two exponent digits.
///
/// Rust's `{:e}` prints `1.28e8`; displays expect `1.28e+08`.
pub fn format_scientific(value: f64, decimals: usize) -> String {
    let raw = format!("{value:.decimals$e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exp: i32 = exponent.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        // NaN / inf carry no exponent
        None => raw,
    }
}

// ============================================================================
// FIELD STRENGTH
// ============================================================================

/// Magnetic flux density in tesla
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Tesla(f64);

impl Eq for Tesla {}

impl PartialOrd for Tesla {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tesla {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Tesla {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Tesla {
    /// Create a field strength
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Tesla(value)
    }

    /// Restrict to `[min, max]`; NaN maps to `min`
    #[inline]
    #[must_use]
    pub fn clamp_to(self, min: Tesla, max: Tesla) -> Self {
        Tesla(self.0.max(min.0).min(max.0))
    }
}

impl fmt::Display for Tesla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} T", self.0)
    }
}

// ============================================================================
// GYROMAGNETIC RATIO
// ============================================================================

/// Gyromagnetic ratio in Hz/T (may be negative)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct HertzPerTesla(f64);

impl Deref for HertzPerTesla {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl HertzPerTesla {
    /// Create a gyromagnetic ratio
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        HertzPerTesla(value)
    }
}

impl fmt::Display for HertzPerTesla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} MHz/T", self.0 / 1e6)
    }
}

// Cross-type operation: ratio × field = Larmor frequency
impl Mul<Tesla> for HertzPerTesla {
    type Output = Hertz;
    fn mul(self, rhs: Tesla) -> Hertz {
        Hertz(self.0 * rhs.0)
    }
}

impl Mul<HertzPerTesla> for Tesla {
    type Output = Hertz;
    fn mul(self, rhs: HertzPerTesla) -> Hertz {
        Hertz(self.0 * rhs.0)
    }
}

// ============================================================================
// FREQUENCY
// ============================================================================

/// Frequency in hertz
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hertz(f64);

impl Eq for Hertz {}

impl PartialOrd for Hertz {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hertz {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Hertz {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Hertz {
    /// Create a frequency
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Hertz(value)
    }
}

impl fmt::Display for Hertz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", format_scientific(self.0, 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scientific_matches_c_style() {
        assert_eq!(format_scientific(127.74e6, 2), "1.28e+08");
        assert_eq!(format_scientific(-97.29e6, 2), "-9.73e+07");
        assert_eq!(format_scientific(0.0, 2), "0.00e+00");
        assert_eq!(format_scientific(0.00123, 2), "1.23e-03");
    }

    #[test]
    fn test_larmor_product() {
        let omega = HertzPerTesla::new(10.71e6) * Tesla::new(2.0);
        assert!((*omega - 21.42e6).abs() < 1e-6);
        assert_eq!(omega.to_string(), "2.14e+07 Hz");
    }

    #[test]
    fn test_tesla_display_and_clamp() {
        assert_eq!(Tesla::new(3.0).to_string(), "3.00 T");
        let clamped = Tesla::new(9.5).clamp_to(Tesla::new(0.0), Tesla::new(7.0));
        assert_eq!(clamped, Tesla::new(7.0));
        assert!(Tesla::new(1.0) < Tesla::new(2.0));
    }

    #[test]
    fn test_clamp_maps_nan_to_minimum() {
        let clamped = Tesla::new(f64::NAN).clamp_to(Tesla::new(0.5), Tesla::new(7.0));
        assert_eq!(clamped, Tesla::new(0.5));
    }

    #[test]
    fn test_ratio_display_in_megahertz() {
        assert_eq!(HertzPerTesla::new(-32.43e6).to_string(), "-32.43 MHz/T");
    }
}
