//! Owned audio output session.

use crate::backend::{AudioBackend, AudioRenderer, StreamFormat};
use crate::config::{SessionConfig, SessionProfile};
use crate::Result;

/// Owns a backend and drives its configure / activate / deactivate cycle.
///
/// A spatial request the device rejects is retried once with
/// [`SessionConfig::minimal`]. Any other error, or a second rejection, is
/// returned to the caller.
pub struct AudioSession {
    backend: Box<dyn AudioBackend>,
    format: Option<StreamFormat>,
}

impl AudioSession {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            format: None,
        }
    }

    /// Configure the backend. The returned [`PendingSession`] must be
    /// activated to start audio; dropping it releases the device.
    pub fn acquire(&mut self, config: &SessionConfig) -> Result<PendingSession<'_>> {
        config.validate()?;

        let format = match self.backend.configure(config) {
            Ok(format) => format,
            Err(err) if err.is_configuration() && config.profile != SessionProfile::Minimal => {
                tracing::warn!(
                    backend = self.backend.name(),
                    error = %err,
                    "spatial session rejected, retrying with minimal profile"
                );
                match self.backend.configure(&SessionConfig::minimal()) {
                    Ok(format) => format,
                    Err(err) => {
                        self.backend.deactivate();
                        return Err(err);
                    }
                }
            }
            Err(err) => {
                self.backend.deactivate();
                return Err(err);
            }
        };

        tracing::debug!(
            backend = self.backend.name(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            profile = ?format.profile,
            "audio session configured"
        );

        Ok(PendingSession {
            session: self,
            format,
            committed: false,
        })
    }

    /// Stop output and release the device. No-op when inactive.
    pub fn deactivate(&mut self) {
        if self.format.take().is_some() || self.backend.is_active() {
            self.backend.deactivate();
            tracing::debug!(backend = self.backend.name(), "audio session deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.format.is_some() && self.backend.is_active()
    }

    /// Format of the running session.
    pub fn format(&self) -> Option<StreamFormat> {
        self.format
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// A configured session that has not started rendering yet.
pub struct PendingSession<'a> {
    session: &'a mut AudioSession,
    format: StreamFormat,
    committed: bool,
}

impl PendingSession<'_> {
    /// Format granted by the device. Build the render graph for this rate.
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Start rendering. On failure the device is released.
    pub fn activate(mut self, renderer: Box<dyn AudioRenderer>) -> Result<StreamFormat> {
        self.session.backend.activate(renderer)?;
        self.session.format = Some(self.format);
        self.committed = true;
        Ok(self.format)
    }
}

impl Drop for PendingSession<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.session.backend.deactivate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OfflineBackend;
    use crate::Error;

    struct Silence;

    impl AudioRenderer for Silence {
        fn render(&mut self, output: &mut [f32], _channels: usize) {
            output.fill(0.0);
        }
    }

    #[test]
    fn test_acquire_and_activate() {
        let (backend, handle) = OfflineBackend::new(48_000.0);
        let mut session = AudioSession::new(Box::new(backend));

        let pending = session.acquire(&SessionConfig::default()).unwrap();
        assert_eq!(pending.format().profile, SessionProfile::Spatial);
        pending.activate(Box::new(Silence)).unwrap();

        assert!(session.is_active());
        assert!(handle.is_active());

        session.deactivate();
        assert!(!session.is_active());
        assert!(!handle.is_active());
    }

    #[test]
    fn test_falls_back_to_minimal_once() {
        let (backend, handle) = OfflineBackend::new(44_100.0);
        let mut session = AudioSession::new(Box::new(backend.reject_first(1)));

        let pending = session.acquire(&SessionConfig::default()).unwrap();
        assert_eq!(pending.format().profile, SessionProfile::Minimal);
        assert_eq!(pending.format().sample_rate, 44_100.0);
        pending.activate(Box::new(Silence)).unwrap();
        assert_eq!(handle.configure_attempts(), 2);
    }

    #[test]
    fn test_second_rejection_is_returned() {
        let (backend, handle) = OfflineBackend::new(48_000.0);
        let mut session = AudioSession::new(Box::new(backend.reject_always()));

        assert!(matches!(
            session.acquire(&SessionConfig::default()),
            Err(Error::Configuration(_))
        ));
        assert_eq!(handle.configure_attempts(), 2);
        assert!(!session.is_active());
    }

    #[test]
    fn test_minimal_request_is_not_retried() {
        let (backend, handle) = OfflineBackend::new(48_000.0);
        let mut session = AudioSession::new(Box::new(backend.reject_always()));

        assert!(session.acquire(&SessionConfig::minimal()).is_err());
        assert_eq!(handle.configure_attempts(), 1);
    }

    #[test]
    fn test_dropped_pending_releases_device() {
        let (backend, handle) = OfflineBackend::new(48_000.0);
        let mut session = AudioSession::new(Box::new(backend));

        drop(session.acquire(&SessionConfig::default()).unwrap());
        assert!(handle.format().is_none());
        assert!(!session.is_active());
    }

    #[test]
    fn test_invalid_config_never_reaches_backend() {
        let (backend, handle) = OfflineBackend::new(48_000.0);
        let mut session = AudioSession::new(Box::new(backend));
        let config = SessionConfig {
            channels: 0,
            ..Default::default()
        };

        assert!(matches!(
            session.acquire(&config),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(handle.configure_attempts(), 0);
    }
}
