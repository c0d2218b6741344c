//! Verification result produced by the fusion transition
//!
//! A result is immutable once created and is owned by the Verification
//! Registry after creation; the pipeline does not retain it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Indicator;

/// Risk classification of a verified document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    /// Confidence score above 88
    Genuine,
    /// Confidence score in (45, 88] - requires manual audit
    Suspicious,
    /// Confidence score at or below 45
    Fake,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Genuine => "GENUINE",
            VerificationStatus::Suspicious => "SUSPICIOUS",
            VerificationStatus::Fake => "FAKE",
        }
    }
}

/// Certificate fields lifted from the document by the analyzer.
///
/// Opaque strings; the core never validates their content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub candidate_name: String,
    pub institution: String,
    pub certificate_id: String,
    pub issue_date: String,
    pub qualification: String,
}

/// Final outcome of one verification attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Unique id, generated at fusion time
    pub id: Uuid,

    /// When fusion produced this result
    pub verified_at: DateTime<Utc>,

    /// Risk classification derived from the confidence score
    pub status: VerificationStatus,

    /// Aggregate weighted authenticity score (0-100)
    pub confidence_score: u8,

    /// Certificate fields extracted by the analyzer
    pub extracted_data: ExtractedData,

    /// Per-stage indicators in stage execution order
    pub indicators: Vec<Indicator>,

    /// Deterministic justification for the fusion outcome
    pub summary_explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&VerificationStatus::Genuine).unwrap(),
            "\"GENUINE\""
        );
        assert_eq!(
            serde_json::to_string(&VerificationStatus::Suspicious).unwrap(),
            "\"SUSPICIOUS\""
        );
        assert_eq!(
            serde_json::to_string(&VerificationStatus::Fake).unwrap(),
            "\"FAKE\""
        );
    }
}
