//! Main mixer: stereo pass-through with a smoothed master gain.

use marble_core::{AtomicFloat, RenderNode, SmoothedValue};
use std::sync::Arc;

const MASTER_RAMP_SECS: f32 = 0.010;

pub struct MainMixerNode {
    master: Arc<AtomicFloat>,
    gain: SmoothedValue,
}

impl MainMixerNode {
    pub fn new(master: Arc<AtomicFloat>) -> Self {
        let gain = SmoothedValue::new(master.get(), MASTER_RAMP_SECS, 48_000.0);
        Self { master, gain }
    }

    pub fn master(&self) -> Arc<AtomicFloat> {
        Arc::clone(&self.master)
    }
}

impl RenderNode for MainMixerNode {
    fn inputs(&self) -> usize {
        2
    }

    fn outputs(&self) -> usize {
        2
    }

    #[inline]
    fn tick(&mut self, input: &[f32], output: &mut [f32]) {
        self.gain.set_target(self.master.get());
        let g = self.gain.next_sample();
        output[0] = input[0] * g;
        output[1] = input[1] * g;
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.gain.set_ramp_time(MASTER_RAMP_SECS, sample_rate as f32);
    }

    fn reset(&mut self) {
        self.gain.set_immediate(self.master.get());
    }

    fn name(&self) -> &'static str {
        "main_mixer"
    }
}
