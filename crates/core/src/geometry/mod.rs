//! Mutable scene geometry driven by the animation loops
//!
//! - [`OrientedSegment`]: directed arrow with base position and axis
//! - [`Trail`]: bounded FIFO of recorded tip positions
//! - [`SpinEnsemble`]: spin sub-vectors with linearly spaced angular speeds

pub mod ensemble;
pub mod segment;
pub mod trail;

pub use ensemble::{linspace, Spin, SpinEnsemble};
pub use segment::OrientedSegment;
pub use trail::Trail;
