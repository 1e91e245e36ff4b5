//! Bring-up state machine
//!
//! ```text
//! Allocating → Subscribing → Initializing → AwaitingLink → StartingWorker → ReportingVersion → Done
//!      │             │             │              │               │                │
//!      └─────────────┴─────────────┴──── Aborting ┴───────────────┴────────────────┘
//!                                          │
//!                                      Terminated
//! ```

use std::fmt;

use serde::Serialize;

/// A step of the bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BringupState {
    Allocating,
    Subscribing,
    Initializing,
    AwaitingLink,
    StartingWorker,
    ReportingVersion,
    Done,
    Aborting,
    Terminated,
}

impl BringupState {
    /// Next state on the success path
    pub fn next(self) -> Option<Self> {
        use BringupState::*;
        match self {
            Allocating => Some(Subscribing),
            Subscribing => Some(Initializing),
            Initializing => Some(AwaitingLink),
            AwaitingLink => Some(StartingWorker),
            StartingWorker => Some(ReportingVersion),
            ReportingVersion => Some(Done),
            Aborting => Some(Terminated),
            Done | Terminated => None,
        }
    }

    /// Whether `to` is a legal successor of this state
    pub fn can_transition_to(self, to: Self) -> bool {
        if self.next() == Some(to) {
            return true;
        }
        to == BringupState::Aborting && self.can_abort()
    }

    /// States a failure can abort from
    pub fn can_abort(self) -> bool {
        !matches!(
            self,
            BringupState::Done | BringupState::Aborting | BringupState::Terminated
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BringupState::Done | BringupState::Terminated)
    }
}

impl fmt::Display for BringupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks the current state and every state entered so far
#[derive(Debug, Clone)]
pub struct StateMachine {
    current: BringupState,
    trace: Vec<BringupState>,
}

impl StateMachine {
    /// Start in `Allocating`
    pub fn new() -> Self {
        Self {
            current: BringupState::Allocating,
            trace: vec![BringupState::Allocating],
        }
    }

    pub fn current(&self) -> BringupState {
        self.current
    }

    /// States entered, in order
    pub fn trace(&self) -> &[BringupState] {
        &self.trace
    }

    /// Move to `to`, logging the transition
    ///
    /// Illegal transitions are refused and logged; the state is unchanged.
    pub fn transition(&mut self, to: BringupState) -> bool {
        if !self.current.can_transition_to(to) {
            tracing::error!("Illegal bring-up transition {} -> {}", self.current, to);
            return false;
        }

        tracing::debug!("Bring-up state {} -> {}", self.current, to);
        self.current = to;
        self.trace.push(to);
        true
    }

    /// Move along the success path
    pub fn advance(&mut self) -> bool {
        match self.current.next() {
            Some(next) => self.transition(next),
            None => false,
        }
    }

    /// Move to `Aborting` if the current state allows it
    pub fn abort(&mut self) -> bool {
        self.transition(BringupState::Aborting)
    }

    /// Whether `state` was ever entered
    pub fn entered(&self, state: BringupState) -> bool {
        self.trace.contains(&state)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BringupState::*;

    #[test]
    fn test_success_path() {
        let mut machine = StateMachine::new();
        while machine.advance() {}

        assert_eq!(machine.current(), Done);
        assert_eq!(
            machine.trace(),
            &[
                Allocating,
                Subscribing,
                Initializing,
                AwaitingLink,
                StartingWorker,
                ReportingVersion,
                Done
            ]
        );
    }

    #[test]
    fn test_abort_from_every_running_state() {
        for state in [
            Allocating,
            Subscribing,
            Initializing,
            AwaitingLink,
            StartingWorker,
            ReportingVersion,
        ] {
            assert!(state.can_transition_to(Aborting), "{state} should abort");
        }
        assert!(!Done.can_transition_to(Aborting));
        assert!(Aborting.can_transition_to(Terminated));
    }

    #[test]
    fn test_illegal_transition_is_refused() {
        let mut machine = StateMachine::new();
        assert!(!machine.transition(AwaitingLink));
        assert_eq!(machine.current(), Allocating);
        assert_eq!(machine.trace().len(), 1);
    }

    #[test]
    fn test_abort_then_terminate() {
        let mut machine = StateMachine::new();
        machine.advance();
        assert!(machine.abort());
        assert!(machine.advance());
        assert_eq!(machine.current(), Terminated);
        assert!(machine.current().is_terminal());
        assert!(!machine.abort());
    }
}
