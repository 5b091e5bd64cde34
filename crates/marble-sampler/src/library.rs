//! Named sound assets on disk.

use crate::buffer::MonoBuffer;
use crate::wav::load_wav;
use crate::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves asset names to mono buffers at the session rate.
///
/// `"pling"` resolves to `<root>/pling.wav`. Buffers are cached per name;
/// asking for a different rate reloads.
#[derive(Debug)]
pub struct AssetLibrary {
    root: PathBuf,
    extension: String,
    cache: HashMap<String, Arc<MonoBuffer>>,
}

impl AssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "wav".to_string(),
            cache: HashMap::new(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, self.extension))
    }

    /// Load, downmix to mono and resample to `sample_rate`.
    pub fn load(&mut self, name: &str, sample_rate: f64) -> Result<Arc<MonoBuffer>> {
        if let Some(buffer) = self.cache.get(name) {
            if buffer.sample_rate() == sample_rate {
                return Ok(Arc::clone(buffer));
            }
        }

        let decoded = load_wav(self.path_for(name))?;
        let mono = decoded.to_mono();
        let buffer = Arc::new(if mono.sample_rate() == sample_rate {
            mono
        } else {
            mono.resample(sample_rate)
        });

        tracing::debug!(
            asset = name,
            frames = buffer.len(),
            source_rate = decoded.sample_rate(),
            sample_rate,
            "asset loaded"
        );

        self.cache.insert(name.to_string(), Arc::clone(&buffer));
        Ok(buffer)
    }

    /// Like [`load`](Self::load), but logs failures and returns `None` so the
    /// caller can carry on with that voice silent.
    pub fn load_or_warn(&mut self, name: &str, sample_rate: f64) -> Option<Arc<MonoBuffer>> {
        match self.load(name, sample_rate) {
            Ok(buffer) => Some(buffer),
            Err(e) => {
                tracing::warn!(asset = name, error = %e, "asset unavailable, voice stays silent");
                None
            }
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
