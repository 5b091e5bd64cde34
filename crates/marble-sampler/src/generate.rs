//! Synthetic loop content for the beacon voice.

use crate::buffer::MonoBuffer;
use core::f64::consts::TAU;
use rand::Rng;

/// Sine loop. Whole-second lengths loop seamlessly for integer frequencies.
pub fn sine(freq: f64, seconds: f64, sample_rate: f64, gain: f32) -> MonoBuffer {
    let frames = (seconds * sample_rate).max(0.0) as usize;
    let w = TAU * freq / sample_rate;
    let samples = (0..frames)
        .map(|n| (w * n as f64).sin() as f32 * gain)
        .collect();
    MonoBuffer::new(samples, sample_rate)
}

/// White noise with an `am_hz` amplitude modulation between 0.2 and 1.0.
pub fn am_noise<R: Rng>(
    rng: &mut R,
    seconds: f64,
    sample_rate: f64,
    gain: f32,
    am_hz: f64,
) -> MonoBuffer {
    let frames = (seconds * sample_rate).max(0.0) as usize;
    let w_am = TAU * am_hz / sample_rate;
    let samples = (0..frames)
        .map(|n| {
            let am = 0.6 + 0.4 * (w_am * n as f64).sin();
            rng.gen_range(-1.0f32..=1.0) * gain * am as f32
        })
        .collect();
    MonoBuffer::new(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sine_shape() {
        let buf = sine(440.0, 1.0, 48_000.0, 0.18);
        assert_eq!(buf.len(), 48_000);
        let peak = buf.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert_abs_diff_eq!(peak, 0.18, epsilon = 1e-3);
        assert_eq!(buf.samples()[0], 0.0);
    }

    #[test]
    fn test_am_noise_stays_in_envelope() {
        let mut rng = StdRng::seed_from_u64(7);
        let buf = am_noise(&mut rng, 2.0, 8_000.0, 0.5, 5.0);
        assert_eq!(buf.len(), 16_000);
        assert!(buf.samples().iter().all(|s| s.abs() <= 0.5));
        assert!(buf.samples().iter().any(|s| s.abs() > 0.3));
    }
}
