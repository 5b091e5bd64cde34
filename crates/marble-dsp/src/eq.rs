//! Presence EQ for the beacon voice.
//!
//! Band-limits to roughly 1.5-8 kHz and lifts 7 kHz, where pinna cues for
//! front/back discrimination live.

use fundsp::prelude::{bell_hz, db_amp, highpass_hz, lowpass_hz, AudioUnit};
use marble_core::RenderNode;

const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Filter settings. Fixed once the node is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenceEq {
    pub highpass_hz: f32,
    pub lowpass_hz: f32,
    pub bell_hz: f32,
    pub bell_gain_db: f32,
    pub bell_octaves: f32,
}

impl Default for PresenceEq {
    fn default() -> Self {
        Self {
            highpass_hz: 1_500.0,
            lowpass_hz: 8_000.0,
            bell_hz: 7_000.0,
            bell_gain_db: 6.0,
            bell_octaves: 1.0,
        }
    }
}

impl PresenceEq {
    /// Q of the bell for its bandwidth in octaves.
    pub fn bell_q(&self) -> f32 {
        let n = 2.0f32.powf(self.bell_octaves.max(0.01));
        n.sqrt() / (n - 1.0)
    }
}

/// Mono in, mono out: high-pass → low-pass → bell.
pub struct PresenceEqNode {
    settings: PresenceEq,
    chain: Box<dyn AudioUnit>,
}

impl PresenceEqNode {
    pub fn new(settings: PresenceEq) -> Self {
        let chain = Box::new(
            highpass_hz(settings.highpass_hz, BUTTERWORTH_Q)
                >> lowpass_hz(settings.lowpass_hz, BUTTERWORTH_Q)
                >> bell_hz(
                    settings.bell_hz,
                    settings.bell_q(),
                    db_amp(settings.bell_gain_db),
                ),
        );
        Self { settings, chain }
    }

    pub fn settings(&self) -> &PresenceEq {
        &self.settings
    }
}

impl Default for PresenceEqNode {
    fn default() -> Self {
        Self::new(PresenceEq::default())
    }
}

impl RenderNode for PresenceEqNode {
    fn inputs(&self) -> usize {
        1
    }

    fn outputs(&self) -> usize {
        1
    }

    #[inline]
    fn tick(&mut self, input: &[f32], output: &mut [f32]) {
        self.chain.tick(input, output);
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.chain.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.chain.reset();
    }

    fn name(&self) -> &'static str {
        "presence_eq"
    }
}
