//! Spin ensemble used to visualize dephasing.
//!
//! Each member turns about the field axis by its own fixed per-tick
//! increment. Increments are linearly spaced and symmetric around zero, so
//! the ensemble fans out without any net drift.

use crate::core_types::vec3::{Vec3, Z_HAT};
use crate::error::GeometryError;
use crate::geometry::segment::OrientedSegment;
use serde::{Deserialize, Serialize};

/// `count` evenly spaced values over `[start, end]`, endpoints included.
///
/// A single value collapses to the midpoint so that a symmetric range
/// stays symmetric.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.5 * (start + end)],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// One ensemble member and its per-tick angular increment (radians)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    pub segment: OrientedSegment,
    pub speed: f64,
}

/// Ordered collection of spins sharing one template orientation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinEnsemble {
    spins: Vec<Spin>,
    template: OrientedSegment,
}

impl SpinEnsemble {
    /// Create `count` hidden spins copied from `template`.
    ///
    /// Speeds span `[-theta_max / steps, +theta_max / steps]`, i.e. each spin
    /// accrues at most `theta_max` over `steps` ticks.
    pub fn new(count: usize, template: &OrientedSegment, theta_max: f64, steps: usize) -> Self {
        let max_speed = if steps == 0 {
            0.0
        } else {
            theta_max / steps as f64
        };
        let mut hidden = template.clone();
        hidden.set_visible(false);

        let spins = linspace(-max_speed, max_speed, count)
            .into_iter()
            .map(|speed| Spin {
                segment: hidden.clone(),
                speed,
            })
            .collect();

        Self {
            spins,
            template: hidden,
        }
    }

    pub fn len(&self) -> usize {
        self.spins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    /// Per-member angular increments, in member order
    pub fn speeds(&self) -> Vec<f64> {
        self.spins.iter().map(|s| s.speed).collect()
    }

    /// Sum of all increments (zero for a symmetric ensemble)
    pub fn net_speed(&self) -> f64 {
        self.spins.iter().map(|s| s.speed).sum()
    }

    /// Make every member visible
    pub fn reveal(&mut self) {
        for spin in &mut self.spins {
            spin.segment.set_visible(true);
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.spins.iter().all(|s| s.segment.is_visible())
    }

    /// Advance one tick: each member rotates about z through `origin` by its own speed.
    ///
    /// # Errors
    /// Propagates [`GeometryError`] from the rotation primitive.
    pub fn advance(&mut self, origin: &Vec3) -> Result<(), GeometryError> {
        for spin in &mut self.spins {
            spin.segment.rotate(spin.speed, &Z_HAT, origin)?;
        }
        Ok(())
    }

    /// Rotate every member by the same `angle` about `axis` through `origin`.
    ///
    /// # Errors
    /// Propagates [`GeometryError`] from the rotation primitive.
    pub fn rotate_all(&mut self, angle: f64, axis: &Vec3, origin: &Vec3) -> Result<(), GeometryError> {
        for spin in &mut self.spins {
            spin.segment.rotate(angle, axis, origin)?;
        }
        Ok(())
    }

    /// Phase coherence `|Σ unit(axis)| / N`: 1 when aligned, smaller as members fan out.
    ///
    /// Zero-length members contribute nothing. An empty ensemble reports 0.
    pub fn coherence(&self) -> f64 {
        if self.spins.is_empty() {
            return 0.0;
        }
        let sum = self
            .spins
            .iter()
            .filter_map(|s| s.segment.axis().try_normalize(0.0))
            .fold(Vec3::zeros(), |acc, dir| acc + dir);
        sum.norm() / self.spins.len() as f64
    }

    /// Restore every member to the (hidden) template orientation
    pub fn reset(&mut self) {
        for spin in &mut self.spins {
            spin.segment = self.template.clone();
        }
    }
}
