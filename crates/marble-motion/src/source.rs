//! Motion source boundary.
//!
//! Sensor hosts push readings and connectivity changes through a
//! [`MotionPublisher`]; the controller owns the single [`MotionSubscription`]
//! and drains it from its update loop.
//!
//! The channel is bounded. When the consumer falls behind, the oldest event
//! is evicted so the newest always gets in. While disconnected only
//! connectivity reports can queue, so a `Disconnected` is only evicted by
//! newer reports; an evicted `Connected` is implied by the connected samples
//! behind it.

use crate::sample::MotionSample;
use crate::{Error, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use marble_core::AtomicFlag;
use std::sync::Arc;

/// Events held for a consumer that is not pumping.
pub const MOTION_CHANNEL_CAPACITY: usize = 64;

/// Event delivered to the subscriber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionEvent {
    Sample(MotionSample),
    Connected,
    Disconnected,
}

/// A producer of head-motion events with exactly one subscriber.
pub trait MotionSource: Send {
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);

    fn is_connected(&self) -> bool;

    /// Take the event stream. Fails with [`Error::AlreadySubscribed`] on any
    /// call after the first.
    fn subscribe(&mut self) -> Result<MotionSubscription>;
}

struct SourceState {
    running: AtomicFlag,
    connected: AtomicFlag,
    /// Set once the subscription is dropped.
    closed: AtomicFlag,
}

/// Channel-backed [`MotionSource`].
pub struct ChannelMotionSource {
    state: Arc<SourceState>,
    receiver: Option<Receiver<MotionEvent>>,
}

impl ChannelMotionSource {
    /// Create a source and the publisher the sensor host writes into.
    pub fn new() -> (Self, MotionPublisher) {
        let (sender, receiver) = bounded(MOTION_CHANNEL_CAPACITY);
        let state = Arc::new(SourceState {
            running: AtomicFlag::new(false),
            connected: AtomicFlag::new(false),
            closed: AtomicFlag::new(false),
        });

        (
            Self {
                state: Arc::clone(&state),
                receiver: Some(receiver.clone()),
            },
            MotionPublisher {
                state,
                sender,
                evict: receiver,
            },
        )
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }
}

impl MotionSource for ChannelMotionSource {
    fn start(&mut self) -> Result<()> {
        if !self.state.running.swap(true) {
            tracing::info!("motion source started");
        }
        Ok(())
    }

    fn stop(&mut self) {
        if self.state.running.swap(false) {
            tracing::info!("motion source stopped");
        }
    }

    fn is_connected(&self) -> bool {
        self.state.connected.get()
    }

    fn subscribe(&mut self) -> Result<MotionSubscription> {
        let receiver = self.receiver.take().ok_or(Error::AlreadySubscribed)?;
        Ok(MotionSubscription {
            receiver,
            state: Arc::clone(&self.state),
        })
    }
}

/// Write side of a [`ChannelMotionSource`].
#[derive(Clone)]
pub struct MotionPublisher {
    state: Arc<SourceState>,
    sender: Sender<MotionEvent>,
    /// Second handle on the queue, used only to drop the oldest event.
    evict: Receiver<MotionEvent>,
}

impl MotionPublisher {
    /// Forward a reading. Returns `false` when it was dropped because the
    /// source is stopped, disconnected, or the subscriber is gone.
    pub fn publish(&self, sample: MotionSample) -> bool {
        if !self.state.running.get() || !self.state.connected.get() || !sample.connected {
            return false;
        }
        self.push(MotionEvent::Sample(sample))
    }

    /// Report a connectivity change. Repeated reports of the same state are
    /// ignored.
    pub fn set_connected(&self, connected: bool) {
        if self.state.connected.swap(connected) == connected {
            return;
        }

        let event = if connected {
            tracing::info!("motion sensor connected");
            MotionEvent::Connected
        } else {
            tracing::info!("motion sensor disconnected");
            MotionEvent::Disconnected
        };
        let _ = self.push(event);
    }

    fn push(&self, mut event: MotionEvent) -> bool {
        if self.state.closed.get() {
            return false;
        }
        loop {
            match self.sender.try_send(event) {
                Ok(()) => return true,
                Err(TrySendError::Full(rejected)) => {
                    let _ = self.evict.try_recv();
                    event = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
    }
}

/// Read side; owned by a single consumer.
pub struct MotionSubscription {
    receiver: Receiver<MotionEvent>,
    state: Arc<SourceState>,
}

impl MotionSubscription {
    /// Next pending event, if any.
    pub fn try_next(&self) -> Option<MotionEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain everything pending. Connectivity events are kept in order; of
    /// the samples only the most recent survives, placed after the events
    /// that preceded it.
    pub fn drain_latest(&self) -> Vec<MotionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_next() {
            if matches!(event, MotionEvent::Sample(_)) {
                events.retain(|e| !matches!(e, MotionEvent::Sample(_)));
            }
            events.push(event);
        }
        events
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Drop for MotionSubscription {
    fn drop(&mut self) {
        self.state.closed.set(true);
    }
}
