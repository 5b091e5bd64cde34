//! Chooses which input drives the poses.

use crate::mapper::{ListenerPose, PoseMapper, PoseUpdate};
use crate::orbit::OrbitGenerator;
use crate::source::MotionEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Poses follow the head sensor.
    #[default]
    Live,
    /// Poses follow the orbit generator; sensor samples are ignored.
    Orbit,
}

/// Routes motion events or orbit ticks into pose updates.
///
/// Exactly one mode produces output at a time. In live mode a disconnect
/// freezes the poses at their last value until the sensor reconnects.
#[derive(Debug, Clone)]
pub struct PoseDriver {
    mode: DriveMode,
    mapper: PoseMapper,
    orbit: OrbitGenerator,
    connected: bool,
    last: Option<PoseUpdate>,
}

impl PoseDriver {
    pub fn new(mapper: PoseMapper, orbit: OrbitGenerator) -> Self {
        Self {
            mode: DriveMode::Live,
            mapper,
            orbit,
            connected: false,
            last: None,
        }
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DriveMode) {
        if self.mode != mode {
            tracing::debug!(?mode, "pose drive mode changed");
            self.mode = mode;
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn mapper(&self) -> &PoseMapper {
        &self.mapper
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitGenerator {
        &mut self.orbit
    }

    /// Last update emitted in either mode.
    pub fn last(&self) -> Option<PoseUpdate> {
        self.last
    }

    /// Handle one event from the motion source. Returns a new pose only in
    /// live mode with a connected sensor.
    pub fn on_event(&mut self, event: MotionEvent) -> Option<PoseUpdate> {
        match event {
            MotionEvent::Connected => {
                self.connected = true;
                None
            }
            MotionEvent::Disconnected => {
                // Keep `last` so the scene holds still.
                self.connected = false;
                None
            }
            MotionEvent::Sample(sample) => {
                if !sample.connected {
                    return None;
                }
                // A connected reading implies the link is up, even if the
                // Connected event was coalesced away.
                self.connected = true;
                if self.mode != DriveMode::Live {
                    return None;
                }
                let update = self.mapper.map(&sample);
                if !update.is_finite() {
                    tracing::trace!(timestamp = sample.timestamp, "non-finite pose dropped");
                    return None;
                }
                self.last = Some(update);
                Some(update)
            }
        }
    }

    /// Advance the orbit by `dt` seconds. `None` in live mode.
    pub fn advance(&mut self, dt: f64) -> Option<PoseUpdate> {
        if self.mode != DriveMode::Orbit {
            return None;
        }
        let update = PoseUpdate {
            listener: ListenerPose::FORWARD,
            source: self.orbit.advance(dt),
        };
        self.last = Some(update);
        Some(update)
    }
}

impl Default for PoseDriver {
    fn default() -> Self {
        Self::new(PoseMapper::default(), OrbitGenerator::default())
    }
}
