//! One-shot effect events.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneShotKind {
    Impact,
    Whoosh,
}

/// A one-shot that was actually triggered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneShotEvent {
    pub kind: OneShotKind,
    /// In [0, 1].
    pub intensity: f32,
    /// Controller clock, seconds.
    pub timestamp: f64,
}

impl OneShotEvent {
    pub fn new(kind: OneShotKind, intensity: f32, timestamp: f64) -> Self {
        Self {
            kind,
            intensity: intensity.clamp(0.0, 1.0),
            timestamp,
        }
    }
}
