//! Binaural spatialization of mono sources around a head-tracked listener.

mod utils;

mod binaural_panner;

mod environment;
pub use environment::{DistanceModel, EnvironmentConfig, EnvironmentNode};
