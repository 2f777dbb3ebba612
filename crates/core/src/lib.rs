//! Spin Simulation Core Library
//!
//! Rotation and animation update logic for two pedagogical NMR demos:
//! - **Larmor precession**: a tilted magnetization vector precesses about the
//!   static field at ω = γ·B, leaving a bounded trail behind its tip.
//! - **Spin echo**: a 90° pulse, a dephasing interval where an ensemble of
//!   spins fans out while the bulk signal decays, then a 180° refocusing pulse.
//!
//! Rendering is left to the front-ends; this crate only owns state and the
//! per-tick update procedures, plus a renderer-agnostic scene layout.

// Core types and utilities
pub mod core_types;
pub mod error;

// Scene geometry and configuration
pub mod config;
pub mod geometry;
pub mod scene;

// Demo state machines
pub mod pacing;
pub mod precession;
pub mod spin_echo;

// Re-export core types
pub use core_types::{Hertz, HertzPerTesla, Tesla, Vec3};
pub use error::{ConfigError, GeometryError};

// Re-export geometry and configuration
pub use config::{PrecessionConfig, SceneConfig, SimulationConfig, SpinEchoConfig};
pub use geometry::{OrientedSegment, SpinEnsemble, Trail};
pub use scene::{Rgb, SceneLayout};

// Re-export demo types
pub use pacing::RateLimiter;
pub use precession::{FieldReadout, Nucleus, NucleusSelection, Precession};
pub use spin_echo::{decayed_length, EchoPhase, EchoPolicy, EchoStep, SpinEcho};
