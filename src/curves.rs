//! Movement energy → voice parameter curves.
//!
//! All curves clamp their input to [0, 1] and are affine after that, so they
//! are monotone and bounded by construction.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// `base + clamp(x, 0, 1) · span`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearCurve {
    pub base: f32,
    pub span: f32,
}

impl LinearCurve {
    pub const fn new(base: f32, span: f32) -> Self {
        Self { base, span }
    }

    #[inline]
    pub fn eval(&self, x: f32) -> f32 {
        self.base + clamp_unit(x) * self.span
    }

    pub fn min(&self) -> f32 {
        self.base.min(self.base + self.span)
    }

    pub fn max(&self) -> f32 {
        self.base.max(self.base + self.span)
    }

    fn validate(&self, what: &str) -> Result<()> {
        if !(self.base.is_finite() && self.span.is_finite()) {
            return Err(Error::InvalidConfig(format!("{what} curve must be finite")));
        }
        if self.min() < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "{what} curve goes negative ({} + x·{})",
                self.base, self.span
            )));
        }
        Ok(())
    }
}

/// Clamp to [0, 1]; NaN reads as 0.
#[inline]
pub fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Roll loop gain and playback rate as functions of velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityCurves {
    pub gain: LinearCurve,
    pub rate: LinearCurve,
}

impl Default for VelocityCurves {
    fn default() -> Self {
        Self {
            gain: LinearCurve::new(0.08, 0.85),
            rate: LinearCurve::new(0.60, 0.90),
        }
    }
}

impl VelocityCurves {
    pub fn gain(&self, velocity: f32) -> f32 {
        self.gain.eval(velocity)
    }

    pub fn rate(&self, velocity: f32) -> f32 {
        self.rate.eval(velocity)
    }

    pub fn validate(&self) -> Result<()> {
        self.gain.validate("roll gain")?;
        self.rate.validate("roll rate")?;
        if self.rate.min() <= 0.0 {
            return Err(Error::InvalidConfig(
                "roll rate must stay above zero".into(),
            ));
        }
        Ok(())
    }
}

/// Impact volume from intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactCurve {
    pub volume: LinearCurve,
}

impl Default for ImpactCurve {
    fn default() -> Self {
        Self {
            volume: LinearCurve::new(0.2, 0.9),
        }
    }
}

impl ImpactCurve {
    pub fn volume(&self, intensity: f32) -> f32 {
        self.volume.eval(intensity)
    }

    pub fn validate(&self) -> Result<()> {
        self.volume.validate("impact volume")
    }
}

/// When a whoosh fires and how loud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhooshPolicy {
    /// Velocity that must be exceeded.
    pub threshold: f32,
    /// Seconds.
    pub cooldown: f64,
    pub volume: LinearCurve,
}

impl Default for WhooshPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            cooldown: 0.6,
            volume: LinearCurve::new(0.1, 0.9),
        }
    }
}

impl WhooshPolicy {
    /// Excess over the threshold normalized to [0, 1]. `None` at or below
    /// the threshold.
    pub fn intensity(&self, velocity: f32) -> Option<f32> {
        let v = clamp_unit(velocity);
        if v <= self.threshold {
            return None;
        }
        Some(clamp_unit((v - self.threshold) / (1.0 - self.threshold)))
    }

    pub fn volume(&self, intensity: f32) -> f32 {
        self.volume.eval(intensity)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.threshold) {
            return Err(Error::InvalidConfig(format!(
                "whoosh threshold {} out of range [0, 1)",
                self.threshold
            )));
        }
        if !(self.cooldown >= 0.0 && self.cooldown.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "whoosh cooldown {} must be a non-negative number of seconds",
                self.cooldown
            )));
        }
        self.volume.validate("whoosh volume")
    }
}
