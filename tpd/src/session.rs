//! Session checkpoints
//!
//! One conversation is one session. Everything needed to pick the
//! conversation back up lives in [`SessionCheckpoint`]: the full message
//! history plus, when the assistant is waiting on an answer to a gathering
//! question, the suspended elicitation run. Checkpoints are persisted
//! through the sessionstore crate after every turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::Message;
use crate::schema::RequirementState;
use crate::workflow::Intent;

/// Where a suspended workflow is parked. Presenting to the human is the only
/// suspension point, but it is recorded explicitly so a resumed session
/// knows what it is resuming into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendPoint {
    PresentToHuman,
}

/// A requirement-gathering run frozen at the human boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElicitationCheckpoint {
    pub intent: Intent,
    pub node: SuspendPoint,
    pub requirements: RequirementState,
    /// Validation passes completed so far, checked against the turn limit.
    pub turns: u32,
}

impl ElicitationCheckpoint {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            node: SuspendPoint::PresentToHuman,
            requirements: RequirementState::new(),
            turns: 0,
        }
    }
}

/// The full persisted state of one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCheckpoint {
    pub session_id: String,
    pub history: Vec<Message>,
    /// Present while the assistant is waiting on an answer to a gathering
    /// question; cleared when the workflow finishes or gives up.
    pub elicitation: Option<ElicitationCheckpoint>,
    pub updated_at: DateTime<Utc>,
}

impl SessionCheckpoint {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            history: Vec::new(),
            elicitation: None,
            updated_at: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Latest human message text, if the last human turn was plain text.
    pub fn latest_user_text(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|m| m.role == crate::llm::Role::User)
            .and_then(Message::as_text)
    }
}

/// Fresh identifier for a new conversation. v7 keeps ids time-ordered, so
/// session listings sort naturally.
pub fn new_session_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
