//! Real-time core for head-tracked spatial audio.
//!
//! # Primary API
//!
//! - [`GraphSpec`] / [`AudioGraph`]: typed render graph declared as data, built once
//! - [`AudioSession`]: owned output session with configure/activate/deactivate lifecycle
//! - [`AudioBackend`]: output seam ([`OfflineBackend`], and `CpalBackend` with the `"cpal"` feature)
//! - [`LifecycleFsm`]: Idle → Starting → Running → Stopped
//! - [`AtomicFloat`] / [`SnapshotCell`]: parameter hand-off to the render thread
//!
//! # Example
//!
//! ```ignore
//! use marble_core::{AudioSession, GraphSpec, OfflineBackend, SessionConfig};
//!
//! let (backend, handle) = OfflineBackend::new(48_000.0);
//! let mut session = AudioSession::new(Box::new(backend));
//!
//! let pending = session.acquire(&SessionConfig::default())?;
//! let mut spec = GraphSpec::new();
//! let mixer = spec.node(Box::new(my_mixer));
//! spec.sink(mixer);
//! pending.activate(Box::new(spec.build(48_000.0)?))?;
//!
//! let block = handle.render(512);
//! ```

pub mod error;
pub use error::{Error, Result};

mod lockfree;
pub use lockfree::{AtomicDouble, AtomicFlag, AtomicFloat, SnapshotCell};

pub mod smooth;
pub use smooth::SmoothedValue;

pub mod config;
pub use config::{SessionConfig, SessionProfile};

mod fsm;
pub use fsm::{LifecycleEvent, LifecycleFsm, LifecycleState, Transition};

mod space;
pub use space::{azimuth_degrees, elevation_degrees, ListenerOrientation};

mod node;
pub use node::RenderNode;

pub mod graph;
pub use graph::{AudioGraph, Edge, GraphSpec, NodeId};

mod backend;
pub use backend::{AudioBackend, AudioRenderer, OfflineBackend, OfflineHandle, StreamFormat};

mod session;
pub use session::{AudioSession, PendingSession};

#[cfg(feature = "cpal")]
mod output;
#[cfg(feature = "cpal")]
pub use output::CpalBackend;

pub use glam::{Vec2, Vec3};
