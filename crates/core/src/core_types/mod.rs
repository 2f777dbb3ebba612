//! Core types and utilities

pub mod units;
pub mod vec3;

pub use units::{format_scientific, Hertz, HertzPerTesla, Tesla};
pub use vec3::{rotate, rotation, unit_axis, Vec3, X_HAT, Y_HAT, Z_HAT};
