//! The fixed voice → environment → mixer graph and its control handles.

use crate::Result;
use glam::Vec3;
use marble_core::{AtomicFloat, AudioGraph, GraphSpec, ListenerOrientation, SnapshotCell};
use marble_dsp::{EnvironmentConfig, EnvironmentNode, MainMixerNode, PresenceEqNode};
use marble_sampler::{VoiceNode, VoiceParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The four voices of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceKind {
    /// Rolling loop; gain and rate follow velocity.
    Roll,
    /// One-shot on collisions.
    Impact,
    /// One-shot on fast movement.
    Whoosh,
    /// Head-tracked loop the listener localizes.
    Beacon,
}

impl VoiceKind {
    pub const ALL: [VoiceKind; 4] = [
        VoiceKind::Roll,
        VoiceKind::Impact,
        VoiceKind::Whoosh,
        VoiceKind::Beacon,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    pub fn is_looping(self) -> bool {
        matches!(self, VoiceKind::Roll | VoiceKind::Beacon)
    }
}

struct Route {
    voice: VoiceKind,
    /// Environment input port.
    port: usize,
    presence_eq: bool,
}

const ROUTES: [Route; 4] = [
    Route {
        voice: VoiceKind::Roll,
        port: 0,
        presence_eq: false,
    },
    Route {
        voice: VoiceKind::Impact,
        port: 1,
        presence_eq: false,
    },
    Route {
        voice: VoiceKind::Whoosh,
        port: 2,
        presence_eq: false,
    },
    Route {
        voice: VoiceKind::Beacon,
        port: 3,
        presence_eq: true,
    },
];

/// Control side of a built graph. Lives exactly as long as one session.
pub(crate) struct Rig {
    voices: [Arc<VoiceParams>; 4],
    positions: Vec<Arc<SnapshotCell<Vec3>>>,
    listener: Arc<SnapshotCell<ListenerOrientation>>,
    master: Arc<AtomicFloat>,
}

impl Rig {
    /// Build the graph at `sample_rate` and keep the handles that steer it.
    pub(crate) fn build(
        environment: &EnvironmentConfig,
        master_gain: f32,
        sample_rate: f64,
    ) -> Result<(Rig, AudioGraph)> {
        let listener = Arc::new(SnapshotCell::new(ListenerOrientation::default()));
        let master = Arc::new(AtomicFloat::new(master_gain));
        let voices = VoiceKind::ALL.map(|kind| Arc::new(VoiceParams::new(kind.is_looping())));

        let env = EnvironmentNode::new(ROUTES.len(), environment.clone(), Arc::clone(&listener))?;
        let mut positions = Vec::with_capacity(ROUTES.len());
        for kind in VoiceKind::ALL {
            let port = ROUTES[kind.index()].port;
            let cell = env.source_position(port).ok_or_else(|| {
                marble_dsp::Error::InvalidChannelCount(format!("no environment port {port}"))
            })?;
            positions.push(cell);
        }

        let mut spec = GraphSpec::new();
        let env_id = spec.node(Box::new(env));
        let mixer = spec.node(Box::new(MainMixerNode::new(Arc::clone(&master))));
        spec.connect(env_id, mixer, 0).sink(mixer);

        for route in &ROUTES {
            let voice = spec.node(Box::new(VoiceNode::new(Arc::clone(
                &voices[route.voice.index()],
            ))));
            if route.presence_eq {
                let eq = spec.node(Box::new(PresenceEqNode::default()));
                spec.connect(voice, eq, 0).connect(eq, env_id, route.port);
            } else {
                spec.connect(voice, env_id, route.port);
            }
        }

        let graph = spec.build(sample_rate)?;
        Ok((
            Rig {
                voices,
                positions,
                listener,
                master,
            },
            graph,
        ))
    }

    pub(crate) fn voice(&self, kind: VoiceKind) -> &Arc<VoiceParams> {
        &self.voices[kind.index()]
    }

    pub(crate) fn set_position(&self, kind: VoiceKind, position: Vec3) {
        self.positions[kind.index()].store(position);
    }

    pub(crate) fn position(&self, kind: VoiceKind) -> Vec3 {
        self.positions[kind.index()].get()
    }

    pub(crate) fn set_listener(&self, orientation: ListenerOrientation) {
        self.listener.store(orientation);
    }

    pub(crate) fn listener(&self) -> ListenerOrientation {
        self.listener.get()
    }

    pub(crate) fn set_master(&self, gain: f32) {
        self.master.set(gain);
    }

    pub(crate) fn silence(&self) {
        for voice in &self.voices {
            voice.set_gain(0.0);
            voice.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_match_voice_order() {
        for (route, kind) in ROUTES.iter().zip(VoiceKind::ALL) {
            assert_eq!(route.voice, kind);
            assert_eq!(route.voice.index(), kind.index());
        }
    }

    #[test]
    fn test_graph_renders_all_nodes() {
        let (_rig, graph) = Rig::build(&EnvironmentConfig::default(), 1.0, 48_000.0).unwrap();
        // 4 voices, presence EQ, environment, mixer
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.render_order().len(), 7);
        assert_eq!(graph.sink_channels(), 2);
    }

    #[test]
    fn test_positions_are_per_voice() {
        let (rig, _graph) = Rig::build(&EnvironmentConfig::default(), 1.0, 48_000.0).unwrap();
        rig.set_position(VoiceKind::Beacon, Vec3::new(0.0, 0.0, -1.8));
        assert_eq!(rig.position(VoiceKind::Beacon), Vec3::new(0.0, 0.0, -1.8));
        assert_eq!(rig.position(VoiceKind::Roll), Vec3::ZERO);
    }

    #[test]
    fn test_silence_stops_every_voice() {
        let (rig, _graph) = Rig::build(&EnvironmentConfig::default(), 1.0, 48_000.0).unwrap();
        rig.voice(VoiceKind::Roll).trigger();
        rig.voice(VoiceKind::Roll).set_gain(0.5);
        rig.silence();
        for kind in VoiceKind::ALL {
            assert!(!rig.voice(kind).is_triggered());
            assert_eq!(rig.voice(kind).gain(), 0.0);
        }
    }
}
