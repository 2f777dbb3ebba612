//! Error types for geometry and configuration failures.

use std::fmt;

/// Errors raised by vector geometry operations
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Rotation axis (or segment axis being rescaled) has zero magnitude,
    /// so no direction can be derived from it
    DegenerateAxis {
        /// Operation that needed a direction (e.g. `"rotate"`, `"set_length"`)
        operation: &'static str,
    },
    /// Segment length must never be negative
    NegativeLength(f64),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::DegenerateAxis { operation } => {
                write!(f, "Degenerate axis: {operation} requires a non-zero axis vector")
            }
            GeometryError::NegativeLength(len) => {
                write!(f, "Segment length must be non-negative, got {len}")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Errors that can occur while loading or validating a simulation config
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    Read(String),
    /// Failed to parse the config contents
    Parse(String),
    /// A parameter is outside its valid range
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(msg) => write!(f, "Failed to read config: {msg}"),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
