//! Verification pipeline state machine
//!
//! One session tracks one in-flight verification request through the
//! ordered stage list:
//! INGESTION → TEXTUAL → VISUAL → TYPOGRAPHIC → FUSION → COMPLETED

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One step of the verification pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerifyStage {
    /// Document parsing and sanity checks
    Ingestion,
    /// Logical consistency of dates, names, credentials
    Textual,
    /// Logos, seals, cloning/healing artifacts
    Visual,
    /// Font faces, kerning, stroke-width anomalies
    Typographic,
    /// Weighted fusion of accumulated indicators
    Fusion,
}

impl VerifyStage {
    /// Stages that invoke the analyzer collaborator, in execution order.
    /// The fusion stage is excluded; it consumes the accumulated
    /// indicators instead of producing one.
    pub const ANALYSIS_STAGES: [VerifyStage; 4] = [
        VerifyStage::Ingestion,
        VerifyStage::Textual,
        VerifyStage::Visual,
        VerifyStage::Typographic,
    ];

    /// Total number of stages including fusion
    pub const COUNT: usize = 5;

    /// Zero-based position in the pipeline
    pub fn index(&self) -> usize {
        match self {
            VerifyStage::Ingestion => 0,
            VerifyStage::Textual => 1,
            VerifyStage::Visual => 2,
            VerifyStage::Typographic => 3,
            VerifyStage::Fusion => 4,
        }
    }

    /// Human-readable label for progress reporting
    pub fn label(&self) -> &'static str {
        match self {
            VerifyStage::Ingestion => "Ingestion",
            VerifyStage::Textual => "Textual analysis",
            VerifyStage::Visual => "Visual analysis",
            VerifyStage::Typographic => "Typographic analysis",
            VerifyStage::Fusion => "Weighted fusion",
        }
    }

    /// URL path segment used by the analyzer client
    pub fn slug(&self) -> &'static str {
        match self {
            VerifyStage::Ingestion => "ingestion",
            VerifyStage::Textual => "textual",
            VerifyStage::Visual => "visual",
            VerifyStage::Typographic => "typographic",
            VerifyStage::Fusion => "fusion",
        }
    }
}

impl std::fmt::Display for VerifyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Pipeline session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    /// Request accepted, pipeline not yet running
    Staged,
    /// Stage execution in progress
    Running,
    /// All stages done, result stored in the registry
    Completed,
    /// A stage timed out or errored
    Failed,
    /// Cancelled by the caller or superseded by a newer submission
    Cancelled,
}

/// Observable progress snapshot for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProgress {
    /// Zero-based index of the current stage
    pub stage_index: usize,

    /// Label of the current stage
    pub stage_label: String,

    /// Human-readable detail of the current operation
    pub detail: String,
}

impl Default for StageProgress {
    fn default() -> Self {
        Self {
            stage_index: 0,
            stage_label: VerifyStage::Ingestion.label().to_string(),
            detail: "Waiting for pipeline start".to_string(),
        }
    }
}

/// Per-request pipeline state, owned by the session controller.
///
/// Destroyed (or left terminal for queries) once the request reaches
/// Completed, Failed, or Cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifySession {
    /// Request this session tracks
    pub request_id: Uuid,

    /// Current pipeline state
    pub state: SessionState,

    /// Progress of the current stage
    pub progress: StageProgress,

    /// Generation tag distinguishing this run from stale, superseded ones
    pub generation: u64,

    /// Result id once Completed
    pub result_id: Option<Uuid>,

    /// Error description once Failed
    pub error: Option<String>,

    /// When the request was submitted
    pub submitted_at: DateTime<Utc>,

    /// When the session reached a terminal state
    pub ended_at: Option<DateTime<Utc>>,
}

impl VerifySession {
    pub fn new(request_id: Uuid, generation: u64) -> Self {
        Self {
            request_id,
            state: SessionState::Staged,
            progress: StageProgress::default(),
            generation,
            result_id: None,
            error: None,
            submitted_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to a new state, stamping the end time for terminal states
    pub fn transition_to(&mut self, new_state: SessionState) {
        self.state = new_state;
        if self.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
    }

    /// Record a stage transition; stage index is monotone for observers
    pub fn enter_stage(&mut self, stage: VerifyStage, detail: String) {
        debug_assert!(stage.index() >= self.progress.stage_index);
        self.state = SessionState::Running;
        self.progress = StageProgress {
            stage_index: stage.index(),
            stage_label: stage.label().to_string(),
            detail,
        };
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_staged() {
        let session = VerifySession::new(Uuid::new_v4(), 1);
        assert_eq!(session.state, SessionState::Staged);
        assert!(!session.is_terminal());
        assert!(session.ended_at.is_none());
    }

    #[test]
    fn terminal_transition_sets_end_time() {
        let mut session = VerifySession::new(Uuid::new_v4(), 1);
        session.transition_to(SessionState::Completed);
        assert!(session.is_terminal());
        assert!(session.ended_at.is_some());
    }

    #[test]
    fn enter_stage_updates_progress() {
        let mut session = VerifySession::new(Uuid::new_v4(), 1);
        session.enter_stage(VerifyStage::Visual, "Auditing seals".to_string());
        assert_eq!(session.state, SessionState::Running);
        assert_eq!(session.progress.stage_index, 2);
        assert_eq!(session.progress.stage_label, "Visual analysis");
    }

    #[test]
    fn stage_order_is_fixed() {
        let indices: Vec<usize> = VerifyStage::ANALYSIS_STAGES
            .iter()
            .map(|s| s.index())
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(VerifyStage::Fusion.index(), 4);
    }
}
