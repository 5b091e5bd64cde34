//! WAV decoding.

use crate::buffer::SampleBuffer;
use crate::{Error, Result};
use hound::{SampleFormat, WavReader};
use std::io::ErrorKind;
use std::path::Path;

/// Decode a WAV file to interleaved f32.
///
/// Integer formats of 8 to 32 bits are scaled to [-1, 1); float files are
/// read as-is. A missing file is [`Error::AssetMissing`], anything the
/// decoder rejects is [`Error::Conversion`].
pub fn load_wav(path: impl AsRef<Path>) -> Result<SampleBuffer> {
    let path = path.as_ref();
    let name = path.display().to_string();

    let reader = WavReader::open(path).map_err(|e| match e {
        hound::Error::IoError(io) if io.kind() == ErrorKind::NotFound => {
            Error::AssetMissing(name.clone())
        }
        hound::Error::IoError(io) => Error::Io(io),
        other => conversion(&name, other),
    })?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| conversion(&name, e))?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(Error::Conversion {
                    name,
                    reason: format!("unsupported bit depth {}", spec.bits_per_sample),
                });
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| conversion(&name, e))?
        }
    };

    tracing::debug!(
        asset = %name,
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "decoded wav"
    );

    SampleBuffer::new(samples, usize::from(spec.channels), spec.sample_rate).map_err(|e| {
        Error::Conversion {
            name,
            reason: e.to_string(),
        }
    })
}

fn conversion(name: &str, err: hound::Error) -> Error {
    Error::Conversion {
        name: name.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hound::{WavSpec, WavWriter};
    use tempfile::TempDir;

    fn write_i16(dir: &TempDir, name: &str, channels: u16, samples: &[i16]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let spec = WavSpec {
            channels,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_loads_int16_stereo() {
        let dir = TempDir::new().unwrap();
        let path = write_i16(&dir, "stereo.wav", 2, &[16384, -16384, 0, 32767]);

        let buf = load_wav(&path).unwrap();
        assert_eq!(buf.channels(), 2);
        assert_eq!(buf.frames(), 2);
        assert_eq!(buf.sample_rate(), 44_100);
        assert_abs_diff_eq!(buf.samples()[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(buf.samples()[1], -0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_loads_float() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("float.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for s in [0.25f32, -0.75] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let buf = load_wav(&path).unwrap();
        assert_eq!(buf.samples(), &[0.25, -0.75]);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_wav(dir.path().join("nope.wav")).unwrap_err();
        assert!(matches!(err, Error::AssetMissing(_)));
    }

    #[test]
    fn test_garbage_is_conversion_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();
        let err = load_wav(&path).unwrap_err();
        assert!(matches!(err, Error::Conversion { .. }));
    }
}
