//! Tolerance constants for audio testing.

/// Floating point rounding errors (exact gain, curve endpoints).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Pose math in f32 after f64 mapping.
pub const POSE_EPSILON: f32 = 1e-4;

/// Silence threshold (~-80dB).
/// Values below this are considered silent.
pub const SILENCE_THRESHOLD: f32 = 0.0001;
