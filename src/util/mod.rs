//! Small shared utilities.

/// Elapsed time and smoothed frame rate.
pub mod frame_clock;

pub use frame_clock::FrameClock;
