//! Controller lifecycle state machine.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Caller asked to start.
    Start,
    /// Session acquired and graph is playing.
    Started,
    /// Session could not be acquired, even with the fallback profile.
    StartFailed,
    /// Caller asked to stop.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Changed(LifecycleState),
}

/// Idle → Starting → Running → Stopped, with Stopped → Starting for restarts.
///
/// Repeated `Start` while Starting/Running and repeated `Stop` while
/// Idle/Stopped are no-ops and report [`Transition::None`].
#[derive(Debug, Default)]
pub struct LifecycleFsm {
    state: LifecycleState,
}

impl LifecycleFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LifecycleState::Running
    }

    pub fn transition(&mut self, event: LifecycleEvent) -> Transition {
        use LifecycleEvent::*;
        use LifecycleState::*;

        let next = match (self.state, event) {
            (Idle | Stopped, Start) => Starting,
            (Starting, Started) => Running,
            (Starting, StartFailed) => Stopped,
            (Starting | Running, Stop) => Stopped,
            _ => return Transition::None,
        };

        tracing::debug!(from = ?self.state, to = ?next, ?event, "lifecycle transition");
        self.state = next;
        Transition::Changed(next)
    }
}
