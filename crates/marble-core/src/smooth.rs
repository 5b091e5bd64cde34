//! Linear parameter ramps for click-free gain and rate changes.
//!
//! Control-rate parameters (voice gain, master gain) arrive at motion cadence,
//! far below the sample rate. Jumping straight to each new value produces
//! zipper noise, so the render side ramps towards the latest target instead.
//!
//! ```
//! use marble_core::SmoothedValue;
//!
//! let mut gain = SmoothedValue::new(0.0, 0.010, 48_000.0);
//! gain.set_target(0.8);
//!
//! let mut block = [1.0f32; 64];
//! for sample in block.iter_mut() {
//!     *sample *= gain.next_sample();
//! }
//! assert!(gain.is_smoothing());
//! ```

/// Linearly ramped value, advanced once per sample.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
    ramp_samples: u32,
}

impl SmoothedValue {
    pub fn new(initial: f32, ramp_secs: f32, sample_rate: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
            ramp_samples: Self::ramp_len(ramp_secs, sample_rate),
        }
    }

    fn ramp_len(ramp_secs: f32, sample_rate: f32) -> u32 {
        (ramp_secs * sample_rate).max(1.0) as u32
    }

    /// Start a new ramp from wherever the value currently is.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.remaining = self.ramp_samples;
        self.step = (self.target - self.current) / self.ramp_samples as f32;
    }

    /// Jump without ramping.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else {
                self.current + self.step
            };
        }
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.remaining > 0
    }

    /// Takes effect on the next `set_target()` call.
    pub fn set_ramp_time(&mut self, ramp_secs: f32, sample_rate: f32) {
        self.ramp_samples = Self::ramp_len(ramp_secs, sample_rate);
    }
}

impl Default for SmoothedValue {
    fn default() -> Self {
        Self::new(0.0, 0.005, 48_000.0)
    }
}
