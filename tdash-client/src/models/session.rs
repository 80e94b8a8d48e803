//! Workflow run state machine
//!
//! A run progresses IDLE → UPLOADING → AWAITING_SELECTION → PROCESSING →
//! DONE, with IDLE both initial and terminal: every run returns to IDLE on
//! completion or abort, and DONE collapses back to IDLE immediately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// No operation in flight; initial and terminal state
    Idle,
    /// Sequential upload of pending files in progress
    Uploading,
    /// Uploads confirmed; waiting for the user to trigger processing
    AwaitingSelection,
    /// Processing request in flight
    Processing,
    /// Processing finished; transient, collapses back to Idle
    Done,
}

impl RunState {
    /// States during which a second operation must be rejected
    pub fn is_busy(&self) -> bool {
        matches!(self, RunState::Uploading | RunState::Processing)
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: RunState,
    pub new_state: RunState,
    pub transitioned_at: DateTime<Utc>,
}

/// One client session's workflow state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSession {
    /// Unique session identifier
    pub session_id: Uuid,

    /// Current workflow state
    pub state: RunState,

    /// Session start time
    pub started_at: DateTime<Utc>,

    /// Most recent state change
    pub last_transition_at: DateTime<Utc>,
}

impl WorkflowSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            state: RunState::Idle,
            started_at: now,
            last_transition_at: now,
        }
    }

    /// Transition to a new state, recording the change
    pub fn transition_to(&mut self, new_state: RunState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        self.last_transition_at = transition.transitioned_at;
        transition
    }
}

impl Default for WorkflowSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_idle() {
        let session = WorkflowSession::new();
        assert_eq!(session.state, RunState::Idle);
        assert!(!session.state.is_busy());
    }

    #[test]
    fn transition_records_old_and_new_state() {
        let mut session = WorkflowSession::new();

        let transition = session.transition_to(RunState::Uploading);

        assert_eq!(transition.old_state, RunState::Idle);
        assert_eq!(transition.new_state, RunState::Uploading);
        assert_eq!(session.state, RunState::Uploading);
        assert!(session.state.is_busy());
    }

    #[test]
    fn busy_states_are_uploading_and_processing() {
        assert!(RunState::Uploading.is_busy());
        assert!(RunState::Processing.is_busy());
        assert!(!RunState::Idle.is_busy());
        assert!(!RunState::AwaitingSelection.is_busy());
        assert!(!RunState::Done.is_busy());
    }
}
