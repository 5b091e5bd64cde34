//! # Marble - Head-Tracked Spatial Audio
//!
//! Turns head motion and object velocity into a binaural scene.
//!
//! ## Architecture
//!
//! Marble is an umbrella crate that coordinates:
//! - **marble-core** - Render graph, parameter cells, lifecycle, sessions and backends
//! - **marble-motion** - Motion samples, pose mapping, orbit test mode, movement energy
//! - **marble-dsp** - Binaural environment, presence EQ, main mixer
//! - **marble-sampler** - Sound assets, loop generators, sample voices
//!
//! ```text
//! MotionSource → PoseDriver ─┐
//!                            ├→ SpatialAudioController → voices → presence EQ
//! physics velocity / hits ───┘      → environment (binaural + reverb) → mixer → backend
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use marble::prelude::*;
//!
//! let mut controller = SpatialAudioController::builder()
//!     .asset_root("assets/sounds")
//!     .build()?;
//! controller.start()?;
//!
//! // Hook up a head sensor
//! let (mut source, publisher) = ChannelMotionSource::new();
//! controller.attach_motion(source.subscribe()?);
//! source.start()?;
//!
//! // Each frame
//! controller.pump_motion();
//! controller.set_velocity(0.4);
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - CPAL audio output
//! - `cpal` - Real output devices; without it only custom backends work

/// Re-export of marble-core for direct access
pub use marble_core as core;

pub use marble_core::{
    AudioBackend, AudioRenderer, AudioSession, LifecycleState, ListenerOrientation,
    OfflineBackend, OfflineHandle, SessionConfig, SessionProfile, StreamFormat,
};

#[cfg(feature = "cpal")]
pub use marble_core::CpalBackend;

pub use glam::{Vec2, Vec3};

// Head motion
pub use marble_motion as motion;

pub use marble_motion::{
    ChannelMotionSource, DriveMode, ListenerAxes, MappingConfig, MotionEvent, MotionPublisher,
    MotionSample, MotionSource, MotionSubscription, MovementEnergy, OrbitConfig, PoseUpdate,
};

// DSP nodes
pub use marble_dsp as dsp;

pub use marble_dsp::{DistanceModel, EnvironmentConfig};

// Sampler
pub use marble_sampler as sampler;

mod error;
pub use error::{Error, Result};

mod clock;
pub use clock::{Clock, ManualClock, MonotonicClock};

pub mod curves;
pub use curves::{ImpactCurve, LinearCurve, VelocityCurves, WhooshPolicy};

mod cooldown;
pub use cooldown::CooldownGate;

mod event;
pub use event::{OneShotEvent, OneShotKind};

mod config;
pub use config::{AssetNames, BeaconSource, ControllerConfig};

mod rig;
pub use rig::VoiceKind;

mod builder;
mod controller;

pub use builder::SpatialAudioControllerBuilder;
pub use controller::SpatialAudioController;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{SpatialAudioController, SpatialAudioControllerBuilder};

    pub use crate::{
        BeaconSource, ControllerConfig, DriveMode, OneShotEvent, OneShotKind, VoiceKind,
    };

    pub use crate::{ChannelMotionSource, MotionSample, MotionSource};

    pub use crate::{OfflineBackend, SessionConfig};

    pub use crate::{Vec2, Vec3};
}
