//! Event types and broadcast bus for pipeline progress
//!
//! Events are broadcast via `EventBus` and serialized for SSE
//! transmission; dropped events are acceptable (observers poll the
//! progress endpoint for authoritative state).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{SessionState, VerificationStatus};

/// Verification pipeline events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VerifyEvent {
    /// A document was accepted for verification
    VerificationSubmitted {
        request_id: Uuid,
        mime_type: String,
        timestamp: DateTime<Utc>,
    },

    /// The pipeline entered a new stage
    StageStarted {
        request_id: Uuid,
        stage_index: usize,
        stage_label: String,
        detail: String,
        timestamp: DateTime<Utc>,
    },

    /// Fusion produced a result and the registry stored it
    VerificationCompleted {
        request_id: Uuid,
        result_id: Uuid,
        status: VerificationStatus,
        confidence_score: u8,
        timestamp: DateTime<Utc>,
    },

    /// A stage timed out or the analyzer failed
    VerificationFailed {
        request_id: Uuid,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// Cancelled by the caller or superseded by a newer submission
    VerificationCancelled {
        request_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl VerifyEvent {
    /// Event name used as the SSE event type
    pub fn event_type(&self) -> &'static str {
        match self {
            VerifyEvent::VerificationSubmitted { .. } => "VerificationSubmitted",
            VerifyEvent::StageStarted { .. } => "StageStarted",
            VerifyEvent::VerificationCompleted { .. } => "VerificationCompleted",
            VerifyEvent::VerificationFailed { .. } => "VerificationFailed",
            VerifyEvent::VerificationCancelled { .. } => "VerificationCancelled",
        }
    }

    /// Terminal session state this event corresponds to, if any
    pub fn terminal_state(&self) -> Option<SessionState> {
        match self {
            VerifyEvent::VerificationCompleted { .. } => Some(SessionState::Completed),
            VerifyEvent::VerificationFailed { .. } => Some(SessionState::Failed),
            VerifyEvent::VerificationCancelled { .. } => Some(SessionState::Cancelled),
            _ => None,
        }
    }
}

/// Broadcast bus for verification events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VerifyEvent>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity; old events are
    /// dropped for lagging subscribers once capacity is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<VerifyEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the no-subscriber case
    pub fn emit_lossy(&self, event: VerifyEvent) {
        let _ = self.tx.send(event);
    }
}
