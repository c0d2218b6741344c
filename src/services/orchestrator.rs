//! Pipeline orchestrator
//!
//! Drives one verification request through the ordered stage list,
//! invoking the analyzer collaborator per analysis stage with a
//! per-stage timeout, and running the fusion engine as the final stage.
//!
//! State progression:
//! INGESTION → TEXTUAL → VISUAL → TYPOGRAPHIC → FUSION → Completed
//!
//! Cancellation is cooperative: it is observed at the next suspension
//! boundary at the latest, and a stage result arriving after
//! cancellation is discarded. There is no orchestrator-level retry; a
//! stage timeout or analyzer error surfaces as one structured failure.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{VerifyError, VerifyResult};
use crate::events::{EventBus, VerifyEvent};
use crate::fusion;
use crate::models::{
    ExtractedData, Indicator, VerificationRequest, VerificationResult, VerifySession, VerifyStage,
};
use crate::services::Analyzer;

/// Session snapshot shared between the controller and the running
/// pipeline task
pub type SharedSession = Arc<RwLock<VerifySession>>;

/// Terminal outcome of one pipeline run. Failures travel as errors.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// All stages done; the result is ready for the registry
    Completed(VerificationResult),
    /// Cancellation observed; no result was produced
    Cancelled,
}

pub struct PipelineOrchestrator {
    analyzer: Arc<dyn Analyzer>,
    event_bus: EventBus,
    stage_timeout: Duration,
}

impl PipelineOrchestrator {
    pub fn new(analyzer: Arc<dyn Analyzer>, event_bus: EventBus, stage_timeout: Duration) -> Self {
        Self {
            analyzer,
            event_bus,
            stage_timeout,
        }
    }

    /// Execute all stages for one request.
    ///
    /// The session snapshot is updated at every stage transition, which
    /// is the only place incremental output is produced before the
    /// final result.
    pub async fn execute(
        &self,
        request: &VerificationRequest,
        session: &SharedSession,
        cancel: &CancellationToken,
    ) -> VerifyResult<PipelineOutcome> {
        tracing::info!(
            request_id = %request.id,
            mime_type = %request.mime_type,
            document_bytes = request.document.len(),
            "Starting verification pipeline"
        );

        let mut indicators: Vec<Indicator> = Vec::with_capacity(VerifyStage::ANALYSIS_STAGES.len());
        let mut extracted: Option<ExtractedData> = None;

        for stage in VerifyStage::ANALYSIS_STAGES {
            if cancel.is_cancelled() {
                tracing::info!(request_id = %request.id, stage = %stage, "Pipeline cancelled before stage");
                return Ok(PipelineOutcome::Cancelled);
            }

            self.enter_stage(request.id, session, stage, format!("Running {}", stage)).await;

            let finding = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(request_id = %request.id, stage = %stage, "Pipeline cancelled during stage");
                    return Ok(PipelineOutcome::Cancelled);
                }
                outcome = tokio::time::timeout(
                    self.stage_timeout,
                    self.analyzer.analyze(stage, &request.document, &request.mime_type),
                ) => match outcome {
                    Ok(Ok(finding)) => finding,
                    Ok(Err(e)) => {
                        tracing::warn!(request_id = %request.id, stage = %stage, error = %e, "Analyzer stage failed");
                        return Err(VerifyError::Analyzer {
                            stage,
                            cause: e.to_string(),
                        });
                    }
                    Err(_) => {
                        tracing::warn!(
                            request_id = %request.id,
                            stage = %stage,
                            timeout_secs = self.stage_timeout.as_secs(),
                            "Analyzer stage timed out"
                        );
                        return Err(VerifyError::StageTimeout { stage });
                    }
                }
            };

            // A result that raced cancellation is discarded, never fused
            if cancel.is_cancelled() {
                tracing::info!(request_id = %request.id, stage = %stage, "Discarding stage result after cancellation");
                return Ok(PipelineOutcome::Cancelled);
            }

            tracing::debug!(
                request_id = %request.id,
                stage = %stage,
                kind = finding.indicator.kind.as_str(),
                weight = finding.indicator.weight,
                local_score = finding.indicator.local_score,
                "Stage indicator collected"
            );

            if extracted.is_none() {
                extracted = finding.extracted;
            }
            indicators.push(finding.indicator);
        }

        self.enter_stage(
            request.id,
            session,
            VerifyStage::Fusion,
            format!("Fusing {} indicators", indicators.len()),
        )
        .await;

        let outcome = fusion::fuse(&indicators)?;

        let result = VerificationResult {
            id: Uuid::new_v4(),
            verified_at: Utc::now(),
            status: outcome.status,
            confidence_score: outcome.confidence_score,
            extracted_data: extracted.unwrap_or_default(),
            indicators: outcome.indicators,
            summary_explanation: outcome.summary,
        };

        tracing::info!(
            request_id = %request.id,
            result_id = %result.id,
            status = ?result.status,
            confidence_score = result.confidence_score,
            "Pipeline completed"
        );

        Ok(PipelineOutcome::Completed(result))
    }

    /// Record a stage transition on the session and broadcast it
    async fn enter_stage(
        &self,
        request_id: Uuid,
        session: &SharedSession,
        stage: VerifyStage,
        detail: String,
    ) {
        {
            let mut session = session.write().await;
            session.enter_stage(stage, detail.clone());
        }

        self.event_bus.emit_lossy(VerifyEvent::StageStarted {
            request_id,
            stage_index: stage.index(),
            stage_label: stage.label().to_string(),
            detail,
            timestamp: Utc::now(),
        });
    }
}
