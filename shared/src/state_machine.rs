//! Connection Lifecycle State Machine
//!
//! Every shell command walks the device link through one full cycle:
//! `Idle -> Connecting -> Connected -> Executing -> Disconnecting -> Idle`.

/// Phases of a single command invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPhase {
    #[default]
    Idle,
    Connecting,
    Connected,
    Executing,
    Disconnecting,
}

/// Events that drive the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A device command was issued
    ConnectRequested,
    /// No endpoint was configured or the port could not be opened
    ConnectFailed,
    /// The port is open
    Opened,
    /// The handler started running
    HandlerStarted,
    /// The handler returned, successfully or not
    HandlerFinished,
    /// The port was released
    Closed,
}

/// Result of a transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition was valid and the phase changed
    Success(LinkPhase),
    /// Transition was invalid from the current phase
    Invalid { from: LinkPhase, event: LinkEvent },
}

/// Tracks where the current invocation is in its lifecycle
#[derive(Debug, Default)]
pub struct LinkStateMachine {
    current: LinkPhase,
}

impl LinkStateMachine {
    /// Create a new state machine in the Idle phase
    pub fn new() -> Self {
        Self {
            current: LinkPhase::Idle,
        }
    }

    /// Get current phase
    pub fn phase(&self) -> LinkPhase {
        self.current
    }

    /// Process an event and return the transition result
    ///
    /// An invalid event leaves the phase unchanged.
    pub fn process_event(&mut self, event: LinkEvent) -> TransitionResult {
        match self.next_phase(event) {
            Some(phase) => {
                self.current = phase;
                TransitionResult::Success(phase)
            }
            None => TransitionResult::Invalid {
                from: self.current,
                event,
            },
        }
    }

    fn next_phase(&self, event: LinkEvent) -> Option<LinkPhase> {
        use LinkEvent::*;
        use LinkPhase::*;

        match (self.current, event) {
            (Idle, ConnectRequested) => Some(Connecting),
            (Connecting, ConnectFailed) => Some(Idle),
            (Connecting, Opened) => Some(Connected),
            (Connected, HandlerStarted) => Some(Executing),
            (Executing, HandlerFinished) => Some(Disconnecting),
            (Disconnecting, Closed) => Some(Idle),
            _ => None,
        }
    }
}
