//! Spatial audio controller.

use crate::clock::{Clock, MonotonicClock};
use crate::config::{beacon_gain_in_range, tone_in_range, BeaconSource, ControllerConfig};
use crate::cooldown::CooldownGate;
use crate::curves::clamp_unit;
use crate::event::{OneShotEvent, OneShotKind};
use crate::rig::{Rig, VoiceKind};
use crate::{Error, Result};
use glam::{Vec2, Vec3};
use marble_core::{
    AudioBackend, AudioSession, LifecycleEvent, LifecycleFsm, LifecycleState, ListenerOrientation,
    StreamFormat, Transition,
};
use marble_motion::{
    DriveMode, EnergyEstimator, MotionEvent, MotionSubscription, MovementEnergy, OrbitGenerator,
    PoseDriver, PoseMapper, PoseUpdate,
};
use marble_sampler::{generate, AssetLibrary, MonoBuffer};
use std::sync::Arc;

/// Screen-space Y maps onto this many meters of height.
const SCREEN_HEIGHT_SPAN: f32 = 0.3;
const TONE_SECONDS: f64 = 1.0;
const NOISE_SECONDS: f64 = 2.0;

/// Owns the audio session, the render graph and the live pose/gain state.
///
/// All parameter calls are no-ops unless the controller is
/// [`Running`](LifecycleState::Running); they return `None` or `false` in
/// that case.
///
/// # Example
///
/// ```ignore
/// use marble::prelude::*;
///
/// let mut controller = SpatialAudioController::builder()
///     .asset_root("assets/sounds")
///     .build()?;
/// controller.start()?;
///
/// // Physics tick
/// if let Some(whoosh) = controller.set_velocity(0.9) {
///     println!("whoosh at {:.2}", whoosh.intensity);
/// }
/// controller.play_impact(0.5);
///
/// // Head tracking
/// controller.update_listener(0.3, 0.0, 0.0);
/// ```
pub struct SpatialAudioController {
    config: ControllerConfig,
    fsm: LifecycleFsm,
    session: AudioSession,
    clock: Box<dyn Clock>,
    library: Option<AssetLibrary>,

    /// Present only while Running.
    rig: Option<Rig>,
    format: Option<StreamFormat>,

    driver: PoseDriver,
    energy: EnergyEstimator,
    motion: Option<MotionSubscription>,

    whoosh_gate: CooldownGate,
    velocity: f32,
}

impl SpatialAudioController {
    pub fn builder() -> crate::SpatialAudioControllerBuilder {
        crate::SpatialAudioControllerBuilder::default()
    }

    /// Controller on `backend` with the wall clock.
    pub fn new(config: ControllerConfig, backend: Box<dyn AudioBackend>) -> Result<Self> {
        Self::from_parts(config, backend, Box::new(MonotonicClock::new()))
    }

    pub(crate) fn from_parts(
        config: ControllerConfig,
        backend: Box<dyn AudioBackend>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let mapper = PoseMapper::new(config.mapping.clone())?;
        let orbit = OrbitGenerator::new(config.orbit.clone(), config.mapping.radius)?;
        let library = config.asset_root.as_ref().map(AssetLibrary::new);

        Ok(Self {
            whoosh_gate: CooldownGate::new(config.whoosh.cooldown),
            fsm: LifecycleFsm::new(),
            session: AudioSession::new(backend),
            clock,
            library,
            rig: None,
            format: None,
            driver: PoseDriver::new(mapper, orbit),
            energy: EnergyEstimator::default(),
            motion: None,
            velocity: 0.0,
            config,
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Acquire the audio session, load sounds and start rendering.
    ///
    /// No-op when already running. If the device rejects the configured
    /// session the minimal profile is tried once; if that fails too the
    /// controller ends up [`Stopped`](LifecycleState::Stopped) and
    /// [`Error::AudioUnavailable`] is returned. Missing sounds only silence
    /// their voice.
    pub fn start(&mut self) -> Result<()> {
        if self.fsm.transition(LifecycleEvent::Start) == Transition::None {
            return Ok(());
        }
        tracing::info!(backend = self.session.backend_name(), "starting spatial audio");

        match self.launch() {
            Ok(format) => {
                self.fsm.transition(LifecycleEvent::Started);
                tracing::info!(
                    sample_rate = format.sample_rate,
                    channels = format.channels,
                    profile = ?format.profile,
                    "spatial audio running"
                );
                Ok(())
            }
            Err(err) => {
                self.rig = None;
                self.format = None;
                self.fsm.transition(LifecycleEvent::StartFailed);
                tracing::warn!(error = %err, "spatial audio failed to start");
                Err(err)
            }
        }
    }

    fn launch(&mut self) -> Result<StreamFormat> {
        let pending = self
            .session
            .acquire(&self.config.session)
            .map_err(|err| Error::AudioUnavailable(err.to_string()))?;
        let sample_rate = pending.format().sample_rate;

        let (rig, graph) = Rig::build(
            &self.config.environment,
            self.config.master_gain,
            sample_rate,
        )?;
        prime_rig(&rig, &self.config, self.library.as_mut(), sample_rate);

        let format = pending
            .activate(Box::new(graph))
            .map_err(|err| Error::AudioUnavailable(err.to_string()))?;

        self.rig = Some(rig);
        self.format = Some(format);
        self.whoosh_gate.reset();
        self.velocity = 0.0;
        Ok(format)
    }

    /// Silence everything and release the device. No-op unless running.
    pub fn stop(&mut self) {
        if !self.fsm.is_running() {
            return;
        }
        if let Some(rig) = self.rig.take() {
            rig.silence();
        }
        self.session.deactivate();
        self.format = None;
        self.fsm.transition(LifecycleEvent::Stop);
        tracing::info!("spatial audio stopped");
    }

    pub fn state(&self) -> LifecycleState {
        self.fsm.state()
    }

    pub fn is_running(&self) -> bool {
        self.fsm.is_running()
    }

    /// Format of the running session.
    pub fn format(&self) -> Option<StreamFormat> {
        self.format
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    fn rig(&self) -> Option<&Rig> {
        if self.fsm.is_running() {
            self.rig.as_ref()
        } else {
            None
        }
    }

    // =========================================================================
    // Velocity and one-shots
    // =========================================================================

    /// Drive the roll loop from a normalized velocity and maybe fire a whoosh.
    ///
    /// Returns the whoosh if one was triggered.
    pub fn set_velocity(&mut self, velocity: f32) -> Option<OneShotEvent> {
        if !self.fsm.is_running() {
            return None;
        }
        let rig = self.rig.as_ref()?;
        let v = clamp_unit(velocity);
        self.velocity = v;

        let roll = rig.voice(VoiceKind::Roll);
        roll.set_gain(self.config.curves.gain(v));
        roll.set_rate(self.config.curves.rate(v));

        let intensity = self.config.whoosh.intensity(v)?;
        let now = self.clock.now();
        if !self.whoosh_gate.try_fire(now) {
            return None;
        }

        let volume = self.config.whoosh.volume(intensity);
        let whoosh = rig.voice(VoiceKind::Whoosh);
        whoosh.set_gain(volume);
        whoosh.trigger();

        tracing::trace!(intensity, volume, "whoosh");
        Some(OneShotEvent::new(OneShotKind::Whoosh, intensity, now))
    }

    /// Last velocity applied, clamped.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Fire the impact sound right away. Retriggering cuts the previous one.
    pub fn play_impact(&mut self, intensity: f32) -> Option<OneShotEvent> {
        let rig = self.rig()?;
        let intensity = clamp_unit(intensity);
        let volume = self.config.impact.volume(intensity);

        let impact = rig.voice(VoiceKind::Impact);
        impact.set_gain(volume);
        impact.trigger();

        tracing::trace!(intensity, volume, "impact");
        Some(OneShotEvent::new(
            OneShotKind::Impact,
            intensity,
            self.clock.now(),
        ))
    }

    // =========================================================================
    // Positions
    // =========================================================================

    /// Move the rolling object to a point on a `scene_size` screen.
    ///
    /// Screen X spans `meters_per_screen` across, Y a fixed 0.3 m. Applies to
    /// the roll, impact and whoosh voices. Degenerate scene sizes and
    /// non-finite points are ignored.
    pub fn update_position(&mut self, point: Vec2, scene_size: Vec2) -> bool {
        let Some(rig) = self.rig() else {
            return false;
        };
        if !(scene_size.x > 0.0 && scene_size.y > 0.0 && scene_size.is_finite()) {
            return false;
        }
        if !point.is_finite() {
            return false;
        }
        let nx = point.x / scene_size.x * 2.0 - 1.0;
        let ny = point.y / scene_size.y * 2.0 - 1.0;
        let position = Vec3::new(
            nx * self.config.meters_per_screen * 0.5,
            ny * SCREEN_HEIGHT_SPAN,
            0.0,
        );
        for kind in [VoiceKind::Roll, VoiceKind::Impact, VoiceKind::Whoosh] {
            rig.set_position(kind, position);
        }
        true
    }

    /// Place the beacon on the horizontal plane.
    pub fn update_source(&mut self, x: f32, z: f32) -> bool {
        self.set_source_position(VoiceKind::Beacon, Vec3::new(x, 0.0, z))
    }

    /// Listener orientation in radians. The listener stays at the origin.
    /// Non-finite angles are ignored and the previous orientation is kept.
    pub fn update_listener(&mut self, yaw: f32, pitch: f32, roll: f32) -> bool {
        let Some(rig) = self.rig() else {
            return false;
        };
        let orientation = ListenerOrientation::new(yaw, pitch, roll);
        if !orientation.is_finite() {
            tracing::debug!(yaw, pitch, roll, "non-finite listener ignored");
            return false;
        }
        rig.set_listener(orientation);
        true
    }

    /// Non-finite positions are ignored and the previous one is kept.
    pub fn set_source_position(&mut self, voice: VoiceKind, position: Vec3) -> bool {
        let Some(rig) = self.rig() else {
            return false;
        };
        if !position.is_finite() {
            tracing::debug!(?voice, ?position, "non-finite source position ignored");
            return false;
        }
        rig.set_position(voice, position);
        true
    }

    pub fn source_position(&self, voice: VoiceKind) -> Option<Vec3> {
        self.rig().map(|rig| rig.position(voice))
    }

    pub fn listener(&self) -> Option<ListenerOrientation> {
        self.rig().map(Rig::listener)
    }

    /// Current target gain of a voice.
    pub fn voice_gain(&self, voice: VoiceKind) -> Option<f32> {
        self.rig().map(|rig| rig.voice(voice).gain())
    }

    /// Current playback rate of a voice.
    pub fn voice_rate(&self, voice: VoiceKind) -> Option<f32> {
        self.rig().map(|rig| rig.voice(voice).rate())
    }

    pub fn set_master_gain(&mut self, gain: f32) -> bool {
        let Some(rig) = self.rig() else {
            return false;
        };
        if gain.is_nan() {
            return false;
        }
        rig.set_master(gain.clamp(0.0, 4.0));
        true
    }

    // =========================================================================
    // Head tracking
    // =========================================================================

    /// Apply a mapped pose: listener orientation plus beacon position.
    /// Non-finite poses are ignored.
    pub fn apply_pose(&mut self, update: PoseUpdate) -> bool {
        let Some(rig) = self.rig() else {
            return false;
        };
        if !update.is_finite() {
            tracing::debug!(?update, "non-finite pose ignored");
            return false;
        }
        let listener = update.listener.orientation();
        rig.set_listener(listener);
        rig.set_position(VoiceKind::Beacon, update.source.position);
        true
    }

    /// Take events from a motion source. Replaces any previous subscription.
    pub fn attach_motion(&mut self, subscription: MotionSubscription) {
        if self.motion.replace(subscription).is_some() {
            tracing::debug!("motion subscription replaced");
        }
    }

    pub fn detach_motion(&mut self) -> Option<MotionSubscription> {
        self.motion.take()
    }

    /// Drain pending motion events and apply the newest pose.
    ///
    /// Connectivity is tracked even while stopped. Returns the number of
    /// poses applied.
    pub fn pump_motion(&mut self) -> usize {
        let Some(subscription) = self.motion.as_ref() else {
            return 0;
        };
        let events = subscription.drain_latest();

        let mut applied = 0;
        for event in events {
            match event {
                MotionEvent::Connected => tracing::debug!("pose driver: sensor connected"),
                MotionEvent::Disconnected => {
                    tracing::debug!("pose driver: sensor lost, holding last pose")
                }
                MotionEvent::Sample(ref sample) if sample.connected && sample.is_finite() => {
                    self.energy.update(sample);
                }
                MotionEvent::Sample(_) => {}
            }
            if let Some(update) = self.driver.on_event(event) {
                if self.apply_pose(update) {
                    applied += 1;
                }
            }
        }
        applied
    }

    /// Advance the orbit by `dt` seconds and apply it. Only in
    /// [`DriveMode::Orbit`].
    pub fn tick(&mut self, dt: f64) -> Option<PoseUpdate> {
        self.rig()?;
        let update = self.driver.advance(dt)?;
        self.apply_pose(update);
        Some(update)
    }

    pub fn set_drive_mode(&mut self, mode: DriveMode) {
        self.driver.set_mode(mode);
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.driver.mode()
    }

    /// Orbit speed for [`DriveMode::Orbit`].
    pub fn set_orbit_rpm(&mut self, rpm: f64) -> Result<()> {
        self.driver.orbit_mut().set_rpm(rpm)?;
        Ok(())
    }

    pub fn set_orbit_clockwise(&mut self, clockwise: bool) {
        self.driver.orbit_mut().set_clockwise(clockwise);
    }

    pub fn is_sensor_connected(&self) -> bool {
        self.driver.is_connected()
    }

    /// Smoothed head-movement energy from the attached motion source.
    pub fn movement_energy(&self) -> MovementEnergy {
        self.energy.energy()
    }

    // =========================================================================
    // Beacon content
    // =========================================================================

    /// Loop a sine on the beacon.
    pub fn play_tone(&mut self, freq: f64, gain: f32) -> bool {
        let Some(rate) = self.running_rate() else {
            return false;
        };
        if !tone_in_range(freq, rate) || !beacon_gain_in_range(gain) {
            tracing::warn!(freq, gain, "beacon tone out of range, ignored");
            return false;
        }
        self.set_beacon(generate::sine(freq, TONE_SECONDS, rate, gain))
    }

    /// Loop amplitude-modulated noise on the beacon.
    pub fn play_noise(&mut self, gain: f32, am_hz: f64) -> bool {
        let Some(rate) = self.running_rate() else {
            return false;
        };
        if !beacon_gain_in_range(gain) || !(am_hz >= 0.0 && am_hz.is_finite()) {
            tracing::warn!(gain, am_hz, "beacon noise out of range, ignored");
            return false;
        }
        let buffer = generate::am_noise(&mut rand::thread_rng(), NOISE_SECONDS, rate, gain, am_hz);
        self.set_beacon(buffer)
    }

    /// Loop a named asset on the beacon. A missing asset leaves the current
    /// content playing.
    pub fn play_loop_asset(&mut self, name: &str) -> bool {
        let Some(rate) = self.running_rate() else {
            return false;
        };
        let Some(library) = self.library.as_mut() else {
            tracing::warn!(asset = name, "no asset root configured");
            return false;
        };
        match library.load_or_warn(name, rate) {
            Some(buffer) => self.set_beacon_shared(buffer),
            None => false,
        }
    }

    fn running_rate(&self) -> Option<f64> {
        self.rig()?;
        self.format.map(|f| f.sample_rate)
    }

    fn set_beacon(&self, buffer: MonoBuffer) -> bool {
        self.set_beacon_shared(Arc::new(buffer))
    }

    /// New content restarts the loop from its first frame.
    fn set_beacon_shared(&self, buffer: Arc<MonoBuffer>) -> bool {
        let Some(rig) = self.rig() else {
            return false;
        };
        let beacon = rig.voice(VoiceKind::Beacon);
        beacon.set_gain(self.config.beacon_volume);
        beacon.replace_and_trigger(buffer);
        true
    }
}

impl Drop for SpatialAudioController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Load sounds and put every voice in its starting state. Runs before the
/// graph is handed to the backend.
fn prime_rig(
    rig: &Rig,
    config: &ControllerConfig,
    mut library: Option<&mut AssetLibrary>,
    sample_rate: f64,
) {
    let mut load = |name: &str| -> Option<Arc<MonoBuffer>> {
        match library.as_deref_mut() {
            Some(library) => library.load_or_warn(name, sample_rate),
            None => {
                tracing::debug!(asset = name, "no asset root, voice stays silent");
                None
            }
        }
    };

    let roll = rig.voice(VoiceKind::Roll);
    roll.set_buffer(load(config.assets.roll_loop.as_str()));
    roll.set_gain(0.0);
    roll.set_rate(config.curves.rate(0.0));
    roll.trigger();

    rig.voice(VoiceKind::Impact)
        .set_buffer(load(config.assets.impact.as_str()));
    rig.voice(VoiceKind::Whoosh)
        .set_buffer(load(config.assets.whoosh.as_str()));

    let beacon_buffer = match &config.beacon {
        BeaconSource::Silent => None,
        BeaconSource::Tone { freq, gain } if tone_in_range(*freq, sample_rate) => Some(
            Arc::new(generate::sine(*freq, TONE_SECONDS, sample_rate, *gain)),
        ),
        BeaconSource::Tone { freq, .. } => {
            tracing::warn!(freq, sample_rate, "beacon tone above Nyquist, beacon stays silent");
            None
        }
        BeaconSource::Noise { gain, am_hz } => Some(Arc::new(generate::am_noise(
            &mut rand::thread_rng(),
            NOISE_SECONDS,
            sample_rate,
            *gain,
            *am_hz,
        ))),
        BeaconSource::Asset { name } => load(name.as_str()),
    };
    let beacon = rig.voice(VoiceKind::Beacon);
    beacon.set_gain(config.beacon_volume);
    if let Some(buffer) = beacon_buffer {
        beacon.set_buffer(Some(buffer));
        beacon.trigger();
    }

    rig.set_position(
        VoiceKind::Beacon,
        Vec3::new(0.0, 0.0, -config.mapping.radius as f32),
    );
}
