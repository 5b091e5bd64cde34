//! Head-motion input for marble.
//!
//! Turns a stream of [`MotionSample`]s into listener/source poses and a
//! movement-energy scalar:
//!
//! - [`PoseMapper`]: pure sample → pose transform (live head-tilt mode)
//! - [`OrbitGenerator`]: synthetic circular sweep (test mode)
//! - [`PoseDriver`]: selects one of the two per tick, freezes on disconnect
//! - [`ChannelMotionSource`]: event channel hosts push sensor data into
//! - [`EnergyEstimator`] / [`MovementEnergy`]: normalized [0, 1] drive signal

mod error;
pub use error::{Error, Result};

mod sample;
pub use sample::{Attitude, MotionSample};

mod source;
pub use source::{
    ChannelMotionSource, MotionEvent, MotionPublisher, MotionSource, MotionSubscription,
    MOTION_CHANNEL_CAPACITY,
};

pub mod mapper;
pub use mapper::{ListenerAxes, ListenerPose, MappingConfig, PoseMapper, PoseUpdate, SourcePose};

pub mod orbit;
pub use orbit::{OrbitConfig, OrbitGenerator};

mod driver;
pub use driver::{DriveMode, PoseDriver};

pub mod energy;
pub use energy::{gravity_from_tilt, EnergyEstimator, MovementEnergy};
