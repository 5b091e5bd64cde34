//! RT-safe render nodes: binaural environment, presence EQ and main mixer.
//! All nodes take their live parameters from lock-free cells shared with the
//! control thread.

mod error;
pub use error::{Error, Result};

mod spatial;
pub use spatial::{DistanceModel, EnvironmentConfig, EnvironmentNode};

mod eq;
pub use eq::{PresenceEq, PresenceEqNode};

mod mixer;
pub use mixer::MainMixerNode;
