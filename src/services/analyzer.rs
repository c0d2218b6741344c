//! Analyzer collaborator contract
//!
//! The analyzer is an external service: its internal reasoning is
//! opaque, the orchestrator only consumes its typed output. One call
//! per analysis stage; the orchestrator enforces the stage timeout and
//! never retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ExtractedData, Indicator, VerifyStage};

/// One stage's analyzer output.
///
/// Every stage yields one indicator; stages that can read certificate
/// fields off the document also return extracted data (the
/// orchestrator merges these first-present-wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageFinding {
    pub indicator: Indicator,
    #[serde(default)]
    pub extracted: Option<ExtractedData>,
}

/// Analyzer collaborator failures, surfaced verbatim to the caller
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Could not reach the analyzer service
    #[error("transport failure: {0}")]
    Transport(String),

    /// Analyzer responded with something other than a stage finding
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Analyzer refused to process the document
    #[error("document rejected: {0}")]
    Rejected(String),
}

/// External analyzer collaborator.
///
/// Implementations must be safe to call concurrently; the orchestrator
/// serializes calls per pipeline run but multiple runs may exist across
/// process restarts or tests.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze one forensic dimension of the document.
    ///
    /// Must respond within the stage timeout or the orchestrator treats
    /// the stage as timed out. Retries, if any, are the analyzer's own
    /// concern.
    async fn analyze(
        &self,
        stage: VerifyStage,
        document: &[u8],
        mime_type: &str,
    ) -> Result<StageFinding, AnalyzerError>;
}
