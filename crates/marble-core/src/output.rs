//! CPAL audio output backend.

use crate::backend::{AudioBackend, AudioRenderer, StreamFormat};
use crate::config::{SessionConfig, SessionProfile};
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Wrapper to hold a `cpal::Stream` in a `Send` context.
///
/// `cpal::Stream` is `!Send` due to platform internals. The stream is only
/// touched through `&mut CpalBackend`, which the controller owns, and it is
/// dropped on deactivate.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

// SAFETY: never accessed concurrently; see above.
unsafe impl Send for StreamHandle {}

struct Negotiated {
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
}

/// Output through the platform audio host.
pub struct CpalBackend {
    device_index: Option<usize>,
    negotiated: Option<Negotiated>,
    stream: Option<StreamHandle>,
}

impl CpalBackend {
    /// Use the system default output, or `SessionConfig::device_index` when set.
    pub fn new() -> Self {
        Self {
            device_index: None,
            negotiated: None,
            stream: None,
        }
    }

    /// List available output devices.
    pub fn list_output_devices() -> Result<Vec<String>> {
        cpal::default_host()
            .output_devices()?
            .enumerate()
            .map(|(i, d)| Ok(format!("{i}: {}", d.name()?)))
            .collect()
    }

    /// Name of the device this backend resolves to.
    pub fn device_name(&self) -> Result<String> {
        Ok(get_device(self.device_index)?.name()?)
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn configure(&mut self, config: &SessionConfig) -> Result<StreamFormat> {
        self.deactivate();
        self.device_index = config.device_index;
        let device = get_device(self.device_index)?;

        let negotiated = match config.profile {
            SessionProfile::Minimal => {
                let default = device
                    .default_output_config()
                    .map_err(|e| Error::Configuration(e.to_string()))?;
                Negotiated {
                    sample_format: default.sample_format(),
                    config: default.config(),
                }
            }
            SessionProfile::Spatial => negotiate_spatial(&device, config)?,
        };

        let format = StreamFormat {
            sample_rate: f64::from(negotiated.config.sample_rate.0),
            channels: usize::from(negotiated.config.channels),
            profile: config.profile,
        };
        self.negotiated = Some(negotiated);
        Ok(format)
    }

    fn activate(&mut self, renderer: Box<dyn AudioRenderer>) -> Result<()> {
        let negotiated = self.negotiated.as_ref().ok_or(Error::NotConfigured)?;
        let device = get_device(self.device_index)?;
        let config = &negotiated.config;

        let stream = match negotiated.sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, config, renderer)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, config, renderer)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, config, renderer)?,
            format => {
                return Err(Error::Configuration(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        self.stream = Some(StreamHandle(stream));
        Ok(())
    }

    fn deactivate(&mut self) {
        self.stream = None;
        self.negotiated = None;
    }

    fn is_active(&self) -> bool {
        self.stream.is_some()
    }
}

fn get_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match index {
        Some(i) => {
            let devices: Vec<_> = host.output_devices()?.collect();
            let count = devices.len();
            devices.into_iter().nth(i).ok_or_else(|| {
                Error::InvalidDevice(format!("Device index {i} out of range ({count} available)"))
            })
        }
        None => host
            .default_output_device()
            .ok_or_else(|| Error::InvalidDevice("No output device available".into())),
    }
}

/// Find a supported config matching the requested channels, rate and buffer.
fn negotiate_spatial(device: &cpal::Device, request: &SessionConfig) -> Result<Negotiated> {
    let ranges = device
        .supported_output_configs()
        .map_err(|e| Error::Configuration(e.to_string()))?;

    let fallback_rate = device
        .default_output_config()
        .map(|c| c.sample_rate().0)
        .map_err(|e| Error::Configuration(e.to_string()))?;
    let rate = request.sample_rate.unwrap_or(fallback_rate);

    let range = ranges
        .filter(|r| r.channels() == request.channels)
        .filter(|r| r.min_sample_rate().0 <= rate && rate <= r.max_sample_rate().0)
        .max_by_key(|r| r.sample_format() == cpal::SampleFormat::F32)
        .ok_or_else(|| {
            Error::Configuration(format!(
                "no output config with {} channels at {} Hz",
                request.channels, rate
            ))
        })?;

    let buffer_size = match (request.buffer_frames, range.buffer_size()) {
        (None, _) => cpal::BufferSize::Default,
        (Some(frames), cpal::SupportedBufferSize::Range { min, max }) => {
            if !(*min..=*max).contains(&frames) {
                return Err(Error::Configuration(format!(
                    "buffer of {frames} frames outside device range {min}-{max}"
                )));
            }
            cpal::BufferSize::Fixed(frames)
        }
        (Some(frames), cpal::SupportedBufferSize::Unknown) => cpal::BufferSize::Fixed(frames),
    };

    let supported = range.with_sample_rate(cpal::SampleRate(rate));
    let mut config = supported.config();
    config.buffer_size = buffer_size;

    Ok(Negotiated {
        config,
        sample_format: supported.sample_format(),
    })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut renderer: Box<dyn AudioRenderer>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = usize::from(config.channels);

    // Grows on the first callback, then stable
    let mut scratch = Vec::<f32>::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    if scratch.len() < data.len() {
                        scratch.resize(data.len(), 0.0);
                    }
                    let block = &mut scratch[..data.len()];
                    renderer.render(block, channels);
                    for (sample, value) in data.iter_mut().zip(block.iter()) {
                        *sample = T::from_sample(*value);
                    }
                }));

                if result.is_err() {
                    for sample in data.iter_mut() {
                        *sample = T::from_sample(0.0);
                    }
                }
            },
            |err| tracing::warn!(error = %err, "audio stream error"),
            None,
        )
        .map_err(|e| match e {
            cpal::BuildStreamError::StreamConfigNotSupported => {
                Error::Configuration("stream config not supported".into())
            }
            other => Error::Stream(other.to_string()),
        })
}
