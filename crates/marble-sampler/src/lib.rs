//! Sample assets and voice playback.
//!
//! Everything here that allocates or touches the filesystem runs at startup,
//! before the session is activated. Only [`VoiceNode`] runs on the render
//! thread.

mod error;
pub use error::{Error, Result};

mod buffer;
pub use buffer::{MonoBuffer, SampleBuffer};

mod wav;
pub use wav::load_wav;

mod library;
pub use library::AssetLibrary;

pub mod generate;

mod voice;
pub use voice::{VoiceNode, VoiceParams};
