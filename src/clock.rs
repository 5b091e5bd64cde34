//! Time source for the cooldown gate and event timestamps.

use marble_core::AtomicDouble;
use std::sync::Arc;
use std::time::Instant;

/// Seconds since an arbitrary, fixed origin. Must never go backwards.
pub trait Clock: Send {
    fn now(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock moved by hand. Clones share the same time.
///
/// ```rust,ignore
/// let clock = ManualClock::new();
/// let controller = SpatialAudioController::builder()
///     .clock(clock.clone())
///     .build()?;
/// clock.advance(0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicDouble>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f64) {
        self.now.fetch_add(seconds.max(0.0));
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(0.25);
        clock.advance(-1.0);
        assert_eq!(other.now(), 0.25);
        other.set(3.0);
        assert_eq!(clock.now(), 3.0);
    }

    #[test]
    fn test_monotonic_clock_moves_forward() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
