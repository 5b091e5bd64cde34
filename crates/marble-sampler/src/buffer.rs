//! Decoded sample buffers.

use crate::{Error, Result};

/// Interleaved f32 frames straight from a decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(Error::InvalidBuffer("zero channels".into()));
        }
        if sample_rate == 0 {
            return Err(Error::InvalidBuffer("zero sample rate".into()));
        }
        if samples.len() % channels != 0 {
            return Err(Error::InvalidBuffer(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Downmix by averaging all channels of each frame.
    pub fn to_mono(&self) -> MonoBuffer {
        let samples = if self.channels == 1 {
            self.samples.clone()
        } else {
            let scale = 1.0 / self.channels as f32;
            self.samples
                .chunks_exact(self.channels)
                .map(|frame| frame.iter().sum::<f32>() * scale)
                .collect()
        };
        MonoBuffer::new(samples, f64::from(self.sample_rate))
    }
}

/// Mono f32 samples at a known rate: the format every voice plays.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoBuffer {
    samples: Vec<f32>,
    sample_rate: f64,
}

impl MonoBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate
    }

    /// Linear interpolation at a fractional index. `wrap` reads past the end
    /// from the start (loops); otherwise the tail interpolates towards zero.
    #[inline]
    pub fn read(&self, position: f64, wrap: bool) -> f32 {
        let len = self.samples.len();
        if len == 0 || position < 0.0 {
            return 0.0;
        }
        let idx = position as usize;
        if idx >= len {
            return 0.0;
        }
        let frac = (position - idx as f64) as f32;
        let a = self.samples[idx];
        let b = if idx + 1 < len {
            self.samples[idx + 1]
        } else if wrap {
            self.samples[0]
        } else {
            0.0
        };
        a + (b - a) * frac
    }

    /// Linear-interpolation resample to `target_rate`.
    pub fn resample(&self, target_rate: f64) -> MonoBuffer {
        if target_rate <= 0.0 || target_rate == self.sample_rate {
            return self.clone();
        }
        if self.samples.is_empty() {
            return MonoBuffer::new(Vec::new(), target_rate);
        }

        let ratio = self.sample_rate / target_rate;
        let out_len = ((self.samples.len() as f64) / ratio).round().max(1.0) as usize;
        let last = self.samples.len() - 1;

        let samples = (0..out_len)
            .map(|i| {
                let pos = i as f64 * ratio;
                let idx = (pos as usize).min(last);
                let frac = (pos - idx as f64) as f32;
                let a = self.samples[idx];
                let b = self.samples[(idx + 1).min(last)];
                a + (b - a) * frac
            })
            .collect();

        MonoBuffer::new(samples, target_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_ragged_frames() {
        assert!(SampleBuffer::new(vec![0.0; 5], 2, 48_000).is_err());
        assert!(SampleBuffer::new(vec![0.0; 4], 0, 48_000).is_err());
        assert!(SampleBuffer::new(vec![0.0; 4], 2, 0).is_err());
    }

    #[test]
    fn test_to_mono_averages() {
        let stereo = SampleBuffer::new(vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, 44_100).unwrap();
        assert_eq!(stereo.frames(), 3);

        let mono = stereo.to_mono();
        assert_eq!(mono.samples(), &[0.5, 0.5, 0.0]);
        assert_eq!(mono.sample_rate(), 44_100.0);
    }

    #[test]
    fn test_to_mono_many_channels() {
        let quad = SampleBuffer::new(vec![1.0, 1.0, 1.0, -1.0], 4, 48_000).unwrap();
        assert_relative_eq!(quad.to_mono().samples()[0], 0.5);
    }

    #[test]
    fn test_read_interpolates() {
        let buf = MonoBuffer::new(vec![0.0, 1.0], 48_000.0);
        assert_relative_eq!(buf.read(0.5, false), 0.5);
        assert_relative_eq!(buf.read(1.5, false), 0.5);
        assert_relative_eq!(buf.read(1.5, true), 0.5);
        assert_eq!(buf.read(2.0, true), 0.0);
    }

    #[test]
    fn test_resample_doubles_length() {
        let buf = MonoBuffer::new(vec![0.0, 1.0, 0.0, -1.0], 24_000.0);
        let up = buf.resample(48_000.0);
        assert_eq!(up.len(), 8);
        assert_eq!(up.sample_rate(), 48_000.0);
        assert_relative_eq!(up.samples()[1], 0.5);
        assert_relative_eq!(up.duration_secs(), buf.duration_secs());
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let buf = MonoBuffer::new(vec![0.1, 0.2, 0.3], 48_000.0);
        assert_eq!(buf.resample(48_000.0), buf);
    }
}
