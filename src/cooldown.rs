//! Minimum spacing between one-shot triggers.

/// Opens at most once per `cooldown` seconds.
///
/// The gate fires when strictly more than `cooldown` has elapsed since the
/// last time it fired. A fresh gate fires on the first request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownGate {
    cooldown: f64,
    last: Option<f64>,
}

impl CooldownGate {
    pub fn new(cooldown: f64) -> Self {
        Self {
            cooldown: cooldown.max(0.0),
            last: None,
        }
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }

    /// Time of the last accepted request.
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    /// Whether a request at `now` would be accepted. Does not consume.
    pub fn is_open(&self, now: f64) -> bool {
        match self.last {
            None => true,
            Some(last) => now - last > self.cooldown,
        }
    }

    /// Accept and record the request if the gate is open.
    pub fn try_fire(&mut self, now: f64) -> bool {
        if !self.is_open(now) {
            return false;
        }
        self.last = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
