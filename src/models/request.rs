//! Verification request submitted by a caller

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One submitted document awaiting or undergoing verification.
///
/// The request exclusively owns the document bytes until they are
/// consumed by the analyzer collaborator; the request is dropped once
/// the pipeline reaches a terminal state.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// Unique request identifier
    pub id: Uuid,

    /// Raw document bytes
    pub document: Vec<u8>,

    /// Declared media type (validated against the supported set on submit)
    pub mime_type: String,

    /// Submission time
    pub submitted_at: DateTime<Utc>,
}

impl VerificationRequest {
    pub fn new(document: Vec<u8>, mime_type: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            document,
            mime_type,
            submitted_at: Utc::now(),
        }
    }
}
