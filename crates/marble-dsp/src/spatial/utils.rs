//! Internal utilities for spatial audio processing

/// Smoothing time for position changes
pub(crate) const DEFAULT_POSITION_SMOOTH_TIME: f32 = 0.05;

/// One-pole smoother for per-sample parameter glides.
pub(crate) struct ExponentialSmoother {
    value: f32,
    /// 0 = frozen, 1 = instant
    coeff: f32,
}

impl ExponentialSmoother {
    /// `coeff = 1 - exp(-1 / (time * sample_rate))`
    pub fn new(smooth_time: f32, sample_rate: f32) -> Self {
        let coeff = 1.0 - (-1.0 / (smooth_time * sample_rate)).exp();
        Self {
            value: 0.0,
            coeff: coeff.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        if !self.value.is_finite() {
            self.value = target;
        }
        self.value += self.coeff * (target - self.value);
        self.value
    }

    pub fn reset(&mut self, value: f32) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges() {
        let mut s = ExponentialSmoother::new(0.01, 48_000.0);
        let mut v = 0.0;
        for _ in 0..4_800 {
            v = s.process(1.0);
        }
        assert!((v - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_recovers_from_non_finite_state() {
        let mut s = ExponentialSmoother::new(0.05, 48_000.0);
        s.process(f32::NAN);
        assert_eq!(s.process(0.25), 0.25);
        s.reset(f32::INFINITY);
        assert!(s.process(-1.0).is_finite());
    }

    #[test]
    fn test_reset_jumps() {
        let mut s = ExponentialSmoother::new(0.05, 48_000.0);
        s.reset(0.5);
        assert!((s.process(0.5) - 0.5).abs() < 1e-7);
    }
}
