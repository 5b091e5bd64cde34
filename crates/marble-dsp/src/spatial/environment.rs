//! Listener environment: N mono sources in, binaural stereo out.
//!
//! Each input port is one source with its own position cell. The listener
//! sits at the origin and only rotates. Per source the node derives azimuth,
//! elevation and distance in the listener's head frame, applies distance
//! attenuation and pans binaurally; all sources then share one reverb send.
//! Distance model and reverb level are fixed when the node is built.

use super::binaural_panner::BinauralPanner;
use crate::{Error, Result};
use fundsp::prelude::{db_amp, reverb_stereo, AudioUnit};
use glam::Vec3;
use marble_core::{
    azimuth_degrees, elevation_degrees, ListenerOrientation, RenderNode, SnapshotCell,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Frames between geometry updates. Panners glide between them.
const CONTROL_INTERVAL: u32 = 32;

/// Distance attenuation curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceModel {
    #[default]
    Inverse,
    Linear,
    Exponential,
}

impl DistanceModel {
    /// Gain for a source `distance` meters away. Sources nearer than
    /// `reference` play at full level.
    pub fn gain(self, distance: f32, reference: f32, rolloff: f32, max_distance: f32) -> f32 {
        let reference = reference.max(f32::EPSILON);
        let d = distance.clamp(reference, max_distance.max(reference));
        let gain = match self {
            DistanceModel::Inverse => reference / (reference + rolloff * (d - reference)),
            DistanceModel::Linear => {
                let span = (max_distance - reference).max(f32::EPSILON);
                1.0 - rolloff * (d - reference) / span
            }
            DistanceModel::Exponential => (d / reference).powf(-rolloff),
        };
        gain.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Wet level in dB relative to the dry mix.
    pub reverb_level_db: f32,
    /// Meters; ~10-30 is a medium room.
    pub reverb_room_size: f64,
    /// Seconds.
    pub reverb_time: f64,
    /// 0 = bright, 1 = dark.
    pub reverb_damping: f64,
    pub distance_model: DistanceModel,
    /// Meters.
    pub reference_distance: f32,
    pub rolloff_factor: f32,
    pub max_distance: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            reverb_level_db: -10.0,
            reverb_room_size: 15.0,
            reverb_time: 1.2,
            reverb_damping: 0.5,
            distance_model: DistanceModel::Inverse,
            reference_distance: 1.5,
            rolloff_factor: 0.0,
            max_distance: 100_000.0,
        }
    }
}

impl EnvironmentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(-96.0..=12.0).contains(&self.reverb_level_db) {
            return Err(Error::InvalidParameter(format!(
                "reverb_level_db {} out of range (-96 to 12)",
                self.reverb_level_db
            )));
        }
        if !(1.0..=100.0).contains(&self.reverb_room_size) {
            return Err(Error::InvalidParameter(format!(
                "reverb_room_size {} out of range (1-100 m)",
                self.reverb_room_size
            )));
        }
        if !(self.reverb_time > 0.0 && self.reverb_time <= 30.0) {
            return Err(Error::InvalidParameter(format!(
                "reverb_time {} out of range (0-30 s]",
                self.reverb_time
            )));
        }
        if !(0.0..=1.0).contains(&self.reverb_damping) {
            return Err(Error::InvalidParameter(format!(
                "reverb_damping {} out of range (0-1)",
                self.reverb_damping
            )));
        }
        if !(self.reference_distance > 0.0 && self.reference_distance <= self.max_distance) {
            return Err(Error::InvalidParameter(format!(
                "reference_distance {} must be positive and at most max_distance {}",
                self.reference_distance, self.max_distance
            )));
        }
        if !(self.rolloff_factor >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "rolloff_factor {} must not be negative",
                self.rolloff_factor
            )));
        }
        Ok(())
    }
}

struct SourceSlot {
    position: Arc<SnapshotCell<Vec3>>,
    panner: BinauralPanner,
    azimuth: f32,
    elevation: f32,
    gain: f32,
}

/// Binaural environment node.
///
/// ```rust,ignore
/// let listener = Arc::new(SnapshotCell::new(ListenerOrientation::default()));
/// let env = EnvironmentNode::new(4, EnvironmentConfig::default(), Arc::clone(&listener))?;
/// let beacon = env.source_position(3).unwrap();
/// beacon.store(Vec3::new(0.0, 0.0, -1.8));
/// ```
pub struct EnvironmentNode {
    config: EnvironmentConfig,
    listener: Arc<SnapshotCell<ListenerOrientation>>,
    sources: Vec<SourceSlot>,
    reverb: Box<dyn AudioUnit>,
    wet_gain: f32,
    countdown: u32,
    wet: [f32; 2],
}

impl EnvironmentNode {
    pub fn new(
        inputs: usize,
        config: EnvironmentConfig,
        listener: Arc<SnapshotCell<ListenerOrientation>>,
    ) -> Result<Self> {
        if inputs == 0 {
            return Err(Error::InvalidChannelCount(
                "environment needs at least one source".into(),
            ));
        }
        config.validate()?;

        let sources = (0..inputs)
            .map(|_| SourceSlot {
                position: Arc::new(SnapshotCell::new(Vec3::ZERO)),
                panner: BinauralPanner::new(48_000.0),
                azimuth: 0.0,
                elevation: 0.0,
                gain: 1.0,
            })
            .collect();

        let reverb: Box<dyn AudioUnit> = Box::new(reverb_stereo(
            config.reverb_room_size,
            config.reverb_time,
            config.reverb_damping,
        ));

        Ok(Self {
            wet_gain: db_amp(config.reverb_level_db),
            config,
            listener,
            sources,
            reverb,
            countdown: 0,
            wet: [0.0; 2],
        })
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Position cell of input `index`, in meters relative to the listener.
    pub fn source_position(&self, index: usize) -> Option<Arc<SnapshotCell<Vec3>>> {
        self.sources.get(index).map(|s| Arc::clone(&s.position))
    }

    pub fn listener(&self) -> Arc<SnapshotCell<ListenerOrientation>> {
        Arc::clone(&self.listener)
    }

    fn update_geometry(&mut self) {
        let listener = self.listener.get();
        let listener = if listener.is_finite() {
            listener
        } else {
            ListenerOrientation::default()
        };
        let rotation = listener.rotation().inverse();
        let config = &self.config;

        for source in self.sources.iter_mut() {
            let position = source.position.get();
            if !position.is_finite() {
                // Hold the last direction and gain.
                continue;
            }
            let head = rotation * position;
            let distance = head.length();
            if distance < 1e-4 {
                // Inside the head: no direction to pan towards.
                source.azimuth = 0.0;
                source.elevation = 0.0;
            } else {
                source.azimuth = azimuth_degrees(head);
                source.elevation = elevation_degrees(head);
            }
            source.gain = config.distance_model.gain(
                distance,
                config.reference_distance,
                config.rolloff_factor,
                config.max_distance,
            );
        }
    }
}

impl RenderNode for EnvironmentNode {
    fn inputs(&self) -> usize {
        self.sources.len()
    }

    fn outputs(&self) -> usize {
        2
    }

    fn tick(&mut self, input: &[f32], output: &mut [f32]) {
        if self.countdown == 0 {
            self.update_geometry();
            self.countdown = CONTROL_INTERVAL;
        }
        self.countdown -= 1;

        let mut left = 0.0;
        let mut right = 0.0;
        let mut send = 0.0;
        for (source, &sample) in self.sources.iter_mut().zip(input) {
            let dry = sample * source.gain;
            let (l, r) = source
                .panner
                .process_mono(dry, source.azimuth, source.elevation);
            left += l;
            right += r;
            send += dry;
        }

        self.reverb.tick(&[send, send], &mut self.wet);
        output[0] = left + self.wet[0] * self.wet_gain;
        output[1] = right + self.wet[1] * self.wet_gain;
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        for source in self.sources.iter_mut() {
            source.panner.set_sample_rate(sample_rate as f32);
        }
        self.reverb.set_sample_rate(sample_rate);
        self.countdown = 0;
    }

    fn reset(&mut self) {
        for source in self.sources.iter_mut() {
            source.panner.reset();
        }
        self.reverb.reset();
        self.countdown = 0;
    }

    fn name(&self) -> &'static str {
        "environment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f32::consts::FRAC_PI_2;

    fn dry_config() -> EnvironmentConfig {
        EnvironmentConfig {
            reverb_level_db: -96.0,
            ..Default::default()
        }
    }

    fn node(inputs: usize, config: EnvironmentConfig) -> EnvironmentNode {
        let listener = Arc::new(SnapshotCell::new(ListenerOrientation::default()));
        let mut node = EnvironmentNode::new(inputs, config, listener).unwrap();
        node.set_sample_rate(48_000.0);
        node
    }

    fn settle(node: &mut EnvironmentNode, input: &[f32]) -> [f32; 2] {
        let mut out = [0.0f32; 2];
        for _ in 0..9_600 {
            node.tick(input, &mut out);
        }
        out
    }

    #[test]
    fn test_inverse_distance_gain() {
        let m = DistanceModel::Inverse;
        assert_relative_eq!(m.gain(0.5, 1.5, 1.0, 100.0), 1.0);
        assert_relative_eq!(m.gain(3.0, 1.5, 1.0, 100.0), 0.5);
        // Rolloff 0 disables attenuation
        assert_relative_eq!(m.gain(50.0, 1.5, 0.0, 100.0), 1.0);
    }

    #[test]
    fn test_linear_and_exponential_gain() {
        assert_relative_eq!(DistanceModel::Linear.gain(51.0, 1.0, 1.0, 101.0), 0.5);
        assert_relative_eq!(DistanceModel::Exponential.gain(4.0, 2.0, 1.0, 100.0), 0.5);
    }

    #[test]
    fn test_source_on_right_pans_right() {
        let mut env = node(1, dry_config());
        env.source_position(0)
            .unwrap()
            .store(Vec3::new(1.8, 0.0, 0.0));
        let out = settle(&mut env, &[0.5]);
        assert!(out[1] > out[0], "L={} R={}", out[0], out[1]);
    }

    #[test]
    fn test_listener_rotation_moves_image() {
        let listener = Arc::new(SnapshotCell::new(ListenerOrientation::default()));
        let mut env = EnvironmentNode::new(1, dry_config(), Arc::clone(&listener)).unwrap();
        env.set_sample_rate(48_000.0);
        env.source_position(0)
            .unwrap()
            .store(Vec3::new(0.0, 0.0, -1.8));

        // Turning the head left puts a front source on the right.
        listener.store(ListenerOrientation::new(FRAC_PI_2, 0.0, 0.0));
        let out = settle(&mut env, &[0.5]);
        assert!(out[1] > out[0], "L={} R={}", out[0], out[1]);
    }

    #[test]
    fn test_non_finite_geometry_keeps_output_finite() {
        let listener = Arc::new(SnapshotCell::new(ListenerOrientation::default()));
        let mut env = EnvironmentNode::new(1, EnvironmentConfig::default(), Arc::clone(&listener))
            .unwrap();
        env.set_sample_rate(48_000.0);
        let position = env.source_position(0).unwrap();

        position.store(Vec3::new(f32::NAN, 0.0, -1.8));
        listener.store(ListenerOrientation::new(f32::INFINITY, 0.0, 0.0));
        let out = settle(&mut env, &[0.5]);
        assert!(out.iter().all(|s| s.is_finite()));

        position.store(Vec3::new(1.8, 0.0, 0.0));
        listener.store(ListenerOrientation::default());
        let out = settle(&mut env, &[0.5]);
        assert!(out.iter().all(|s| s.is_finite()));
        assert!(out[1] > out[0], "L={} R={}", out[0], out[1]);
    }

    #[test]
    fn test_rejects_bad_config() {
        let listener = Arc::new(SnapshotCell::new(ListenerOrientation::default()));
        assert!(EnvironmentNode::new(0, EnvironmentConfig::default(), Arc::clone(&listener)).is_err());

        let config = EnvironmentConfig {
            reference_distance: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EnvironmentConfig {
            rolloff_factor: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reverb_adds_tail() {
        let mut env = node(1, EnvironmentConfig::default());
        let mut out = [0.0f32; 2];
        env.tick(&[1.0], &mut out);
        let mut tail = 0.0f32;
        for _ in 0..48_000 {
            env.tick(&[0.0], &mut out);
            tail = tail.max(out[0].abs());
        }
        assert!(tail > 0.0);
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: EnvironmentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EnvironmentConfig::default());
        assert_eq!(config.distance_model, DistanceModel::Inverse);
    }
}
