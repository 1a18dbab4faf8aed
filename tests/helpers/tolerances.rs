//! Tolerance constants for audio testing.
//!
//! Different operations require different precision levels.

/// Floating point rounding errors (for passthrough, exact gain).
/// Use for operations that should be mathematically exact.
pub const FLOAT_EPSILON: f32 = 1e-6;

/// DSP processing tolerance (oscillators, interpolated delays).
pub const DSP_EPSILON: f32 = 1e-4;

/// Silence threshold (~-80dB).
/// Values below this are considered silent.
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// Allowed deviation of a measured pitch from its expected value (ratio).
pub const PITCH_TOLERANCE: f32 = 0.2;

/// Minimum RMS difference for two renders to count as audibly different.
pub const DISTINCT_RMS: f32 = 0.01;
