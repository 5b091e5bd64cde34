//! Mono sample voice.
//!
//! The control side owns an `Arc<VoiceParams>` and the render graph owns the
//! matching [`VoiceNode`]. Commands travel as atomics: gain and rate are
//! latest-value scalars, play/stop is a sequence number so the render thread
//! sees every retrigger, and the buffer is swapped in one pointer store.

use crate::buffer::MonoBuffer;
use arc_swap::ArcSwapOption;
use marble_core::{AtomicFlag, AtomicFloat, RenderNode, SmoothedValue};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const GAIN_RAMP_SECS: f32 = 0.005;

/// Shared control surface of one voice.
#[derive(Debug)]
pub struct VoiceParams {
    gain: AtomicFloat,
    rate: AtomicFloat,
    looping: AtomicFlag,
    /// `(sequence << 1) | playing`
    transport: AtomicU64,
    buffer: ArcSwapOption<MonoBuffer>,
}

impl VoiceParams {
    pub fn new(looping: bool) -> Self {
        Self {
            gain: AtomicFloat::new(1.0),
            rate: AtomicFloat::new(1.0),
            looping: AtomicFlag::new(looping),
            transport: AtomicU64::new(0),
            buffer: ArcSwapOption::empty(),
        }
    }

    pub fn set_gain(&self, gain: f32) {
        self.gain.set(gain.max(0.0));
    }

    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    /// Playback rate multiplier; 1.0 is the buffer's natural speed.
    pub fn set_rate(&self, rate: f32) {
        self.rate.set(rate.max(0.0));
    }

    pub fn rate(&self) -> f32 {
        self.rate.get()
    }

    pub fn set_looping(&self, looping: bool) {
        self.looping.set(looping);
    }

    pub fn is_looping(&self) -> bool {
        self.looping.get()
    }

    /// Restart from the beginning. A voice that is still sounding is cut.
    pub fn trigger(&self) {
        self.command(true);
    }

    pub fn stop(&self) {
        self.command(false);
    }

    /// Whether the last command was a trigger. Says nothing about whether a
    /// one-shot has run out.
    pub fn is_triggered(&self) -> bool {
        self.transport.load(Ordering::Acquire) & 1 == 1
    }

    /// Number of play/stop commands issued so far.
    pub fn command_count(&self) -> u64 {
        self.transport.load(Ordering::Acquire) >> 1
    }

    fn command(&self, play: bool) {
        let bit = u64::from(play);
        let _ = self
            .transport
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| {
                Some((((value >> 1) + 1) << 1) | bit)
            });
    }

    /// Swap the buffer. The play head keeps its position if the new buffer is
    /// long enough.
    pub fn set_buffer(&self, buffer: Option<Arc<MonoBuffer>>) {
        self.buffer.store(buffer);
    }

    /// Swap the buffer and play it from the top.
    pub fn replace_and_trigger(&self, buffer: Arc<MonoBuffer>) {
        self.set_buffer(Some(buffer));
        self.trigger();
    }

    pub fn buffer(&self) -> Option<Arc<MonoBuffer>> {
        self.buffer.load_full()
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.load().is_some()
    }
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Render side of a voice: zero inputs, one mono output.
pub struct VoiceNode {
    params: Arc<VoiceParams>,
    seen: u64,
    playing: bool,
    position: f64,
    gain: SmoothedValue,
    sample_rate: f64,
}

impl VoiceNode {
    pub fn new(params: Arc<VoiceParams>) -> Self {
        let seen = params.transport.load(Ordering::Acquire);
        Self {
            playing: seen & 1 == 1,
            params,
            seen,
            position: 0.0,
            gain: SmoothedValue::new(0.0, GAIN_RAMP_SECS, 48_000.0),
            sample_rate: 48_000.0,
        }
    }

    pub fn params(&self) -> &Arc<VoiceParams> {
        &self.params
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn poll_transport(&mut self) {
        let transport = self.params.transport.load(Ordering::Acquire);
        if transport == self.seen {
            return;
        }
        self.seen = transport;
        self.playing = transport & 1 == 1;
        if self.playing {
            self.position = 0.0;
            // Start from the current gain, no ramp from the old tail
            self.gain.set_immediate(self.params.gain());
        }
    }
}

impl RenderNode for VoiceNode {
    fn inputs(&self) -> usize {
        0
    }

    fn outputs(&self) -> usize {
        1
    }

    fn tick(&mut self, _input: &[f32], output: &mut [f32]) {
        self.poll_transport();
        self.gain.set_target(self.params.gain());
        let gain = self.gain.next_sample();

        if !self.playing {
            output[0] = 0.0;
            return;
        }

        let guard = self.params.buffer.load();
        let Some(buffer) = guard.as_deref() else {
            output[0] = 0.0;
            return;
        };
        let len = buffer.len() as f64;
        if len == 0.0 {
            output[0] = 0.0;
            return;
        }

        let looping = self.params.is_looping();
        if self.position >= len {
            if looping {
                self.position %= len;
            } else {
                self.playing = false;
                output[0] = 0.0;
                return;
            }
        }

        output[0] = buffer.read(self.position, looping) * gain;

        let step =
            f64::from(self.params.rate()) * buffer.sample_rate() / self.sample_rate.max(1.0);
        self.position += step;
        if looping && self.position >= len {
            self.position %= len;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.gain.set_ramp_time(GAIN_RAMP_SECS, sample_rate as f32);
    }

    fn reset(&mut self) {
        self.playing = false;
        self.position = 0.0;
        self.gain.set_immediate(0.0);
        self.seen = self.params.transport.load(Ordering::Acquire);
    }

    fn name(&self) -> &'static str {
        "voice"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp_buffer(len: usize) -> Arc<MonoBuffer> {
        Arc::new(MonoBuffer::new(
            (0..len).map(|i| i as f32 / len as f32).collect(),
            48_000.0,
        ))
    }

    fn render(node: &mut VoiceNode, frames: usize) -> Vec<f32> {
        let mut out = [0.0f32];
        (0..frames)
            .map(|_| {
                node.tick(&[], &mut out);
                out[0]
            })
            .collect()
    }

    fn node(looping: bool) -> (Arc<VoiceParams>, VoiceNode) {
        let params = Arc::new(VoiceParams::new(looping));
        let mut node = VoiceNode::new(Arc::clone(&params));
        node.set_sample_rate(48_000.0);
        (params, node)
    }

    #[test]
    fn test_silent_until_triggered() {
        let (params, mut node) = node(false);
        params.set_buffer(Some(ramp_buffer(8)));
        assert!(render(&mut node, 16).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_one_shot_plays_once() {
        let (params, mut node) = node(false);
        params.set_buffer(Some(ramp_buffer(4)));
        params.trigger();

        let out = render(&mut node, 8);
        assert_relative_eq!(out[1], 0.25);
        assert_relative_eq!(out[3], 0.75);
        assert!(out[4..].iter().all(|&s| s == 0.0));
        assert!(!node.is_playing());
    }

    #[test]
    fn test_retrigger_restarts() {
        let (params, mut node) = node(false);
        params.set_buffer(Some(ramp_buffer(100)));
        params.trigger();
        render(&mut node, 50);

        params.trigger();
        let out = render(&mut node, 2);
        assert_eq!(out[0], 0.0);
        assert_relative_eq!(out[1], 0.01);
        assert_eq!(params.command_count(), 2);
    }

    #[test]
    fn test_replace_restarts_from_top() {
        let (params, mut node) = node(true);
        params.set_buffer(Some(ramp_buffer(100)));
        params.trigger();
        render(&mut node, 50);

        params.replace_and_trigger(ramp_buffer(10));
        let out = render(&mut node, 2);
        assert_eq!(out[0], 0.0);
        assert_relative_eq!(out[1], 0.1);
        assert!(params.is_triggered());
    }

    #[test]
    fn test_loop_wraps() {
        let (params, mut node) = node(true);
        params.set_buffer(Some(ramp_buffer(4)));
        params.trigger();

        let out = render(&mut node, 9);
        assert_relative_eq!(out[4], 0.0);
        assert_relative_eq!(out[5], 0.25);
        assert!(node.is_playing());
    }

    #[test]
    fn test_rate_scales_step() {
        let (params, mut node) = node(false);
        params.set_buffer(Some(ramp_buffer(8)));
        params.set_rate(2.0);
        params.trigger();

        let out = render(&mut node, 3);
        assert_relative_eq!(out[1], 0.25);
        assert_relative_eq!(out[2], 0.5);
    }

    #[test]
    fn test_stop_silences() {
        let (params, mut node) = node(true);
        params.set_buffer(Some(ramp_buffer(8)));
        params.trigger();
        render(&mut node, 3);

        params.stop();
        assert!(!params.is_triggered());
        assert!(render(&mut node, 4).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_gain_change_is_ramped() {
        let (params, mut node) = node(true);
        params.set_buffer(Some(Arc::new(MonoBuffer::new(vec![1.0; 64], 48_000.0))));
        params.set_gain(1.0);
        params.trigger();
        render(&mut node, 4);

        params.set_gain(0.0);
        let out = render(&mut node, 2);
        assert!(out[0] > 0.0 && out[0] < 1.0);
    }
}
