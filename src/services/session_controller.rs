//! Session controller
//!
//! Thin composition layer exposing submit/cancel/progress/result and
//! the registry queries. Holds the single "active" pipeline slot: at
//! most one request is in flight, and submitting a new one cancels the
//! previous run (last-writer-wins). Each run is tagged with a
//! generation counter; a completed result from a stale generation is
//! discarded instead of committed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{VerifyError, VerifyResult};
use crate::events::{EventBus, VerifyEvent};
use crate::models::{
    SessionState, StageProgress, VerificationRequest, VerificationResult, VerifySession,
};
use crate::registry::VerificationRegistry;
use crate::services::orchestrator::{PipelineOrchestrator, PipelineOutcome, SharedSession};
use crate::services::Analyzer;

/// Outcome of a result query for one request
#[derive(Debug)]
pub enum ResultQuery {
    /// Pipeline still running or staged
    Pending,
    /// Completed; result fetched from the registry
    Completed(VerificationResult),
    /// Pipeline failed with the given error description
    Failed(String),
    /// Run was cancelled; no result exists
    Cancelled,
}

/// The currently active pipeline run
struct ActiveRun {
    request_id: Uuid,
    generation: u64,
    cancel: CancellationToken,
}

#[derive(Clone)]
pub struct SessionController {
    config: AppConfig,
    orchestrator: Arc<PipelineOrchestrator>,
    registry: Arc<VerificationRegistry>,
    event_bus: EventBus,
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
    active: Arc<Mutex<Option<ActiveRun>>>,
    generation: Arc<AtomicU64>,
}

impl SessionController {
    pub fn new(
        config: AppConfig,
        analyzer: Arc<dyn Analyzer>,
        registry: Arc<VerificationRegistry>,
        event_bus: EventBus,
    ) -> Self {
        let stage_timeout = Duration::from_secs(config.stage_timeout_secs);
        let orchestrator = Arc::new(PipelineOrchestrator::new(
            analyzer,
            event_bus.clone(),
            stage_timeout,
        ));

        Self {
            config,
            orchestrator,
            registry,
            event_bus,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            active: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Submit a document for verification. Validation failures reject
    /// the submission outright; otherwise the pipeline starts
    /// immediately in a background task and the request id is returned.
    pub async fn submit(&self, document: Vec<u8>, mime_type: String) -> VerifyResult<Uuid> {
        self.validate_submission(&document, &mime_type)?;

        let request = VerificationRequest::new(document, mime_type);
        let request_id = request.id;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();

        // Supersede the previous run: cancel its token and mark its
        // session terminal before installing the new active slot.
        {
            let mut active = self.active.lock().await;
            if let Some(prev) = active.take() {
                tracing::info!(
                    previous_request_id = %prev.request_id,
                    request_id = %request_id,
                    "New submission supersedes in-flight request"
                );
                prev.cancel.cancel();
                self.mark_cancelled(prev.request_id).await;
            }
            *active = Some(ActiveRun {
                request_id,
                generation,
                cancel: cancel.clone(),
            });
        }

        let session: SharedSession = Arc::new(RwLock::new(VerifySession::new(request_id, generation)));
        self.sessions.write().await.insert(request_id, session.clone());

        self.event_bus.emit_lossy(VerifyEvent::VerificationSubmitted {
            request_id,
            mime_type: request.mime_type.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(request_id = %request_id, generation, "Verification request staged");

        let controller = self.clone();
        tokio::spawn(async move {
            controller.run_pipeline(request, session, cancel, generation).await;
        });

        Ok(request_id)
    }

    /// Cancel an in-flight request. No-op when the session is already
    /// terminal; unknown ids fail with `NotFound`.
    pub async fn cancel(&self, request_id: Uuid) -> VerifyResult<()> {
        let session = self.session(request_id).await?;
        if session.read().await.is_terminal() {
            return Ok(());
        }

        let active = self.active.lock().await;
        if let Some(run) = active.as_ref() {
            if run.request_id == request_id {
                tracing::info!(request_id = %request_id, "Cancellation requested");
                run.cancel.cancel();
            }
        }
        Ok(())
    }

    /// Observable progress snapshot for one request
    pub async fn progress(&self, request_id: Uuid) -> VerifyResult<StageProgress> {
        let session = self.session(request_id).await?;
        let snapshot = session.read().await;
        Ok(snapshot.progress.clone())
    }

    /// Full session snapshot (state + progress + outcome references)
    pub async fn session_snapshot(&self, request_id: Uuid) -> VerifyResult<VerifySession> {
        let session = self.session(request_id).await?;
        let snapshot = session.read().await;
        Ok(snapshot.clone())
    }

    /// Query the outcome of one request
    pub async fn result(&self, request_id: Uuid) -> VerifyResult<ResultQuery> {
        let session = self.session(request_id).await?;
        let snapshot = session.read().await.clone();

        match snapshot.state {
            SessionState::Completed => {
                let result_id = snapshot.result_id.ok_or_else(|| {
                    VerifyError::Internal("Completed session without result id".to_string())
                })?;
                let result = self.registry.load(result_id).await?.ok_or_else(|| {
                    VerifyError::Internal(format!("Result missing from registry: {}", result_id))
                })?;
                Ok(ResultQuery::Completed(result))
            }
            SessionState::Failed => Ok(ResultQuery::Failed(
                snapshot.error.unwrap_or_else(|| "Unknown failure".to_string()),
            )),
            SessionState::Cancelled => Ok(ResultQuery::Cancelled),
            SessionState::Staged | SessionState::Running => Ok(ResultQuery::Pending),
        }
    }

    /// Ordered history, most recent first
    pub async fn history(&self) -> VerifyResult<Vec<VerificationResult>> {
        self.registry.history().await
    }

    /// Favorited results in registry order
    pub async fn favorites(&self) -> VerifyResult<Vec<VerificationResult>> {
        self.registry.favorites().await
    }

    /// Flip favorites membership; returns the new state
    pub async fn toggle_favorite(&self, result_id: Uuid) -> VerifyResult<bool> {
        self.registry.toggle_favorite(result_id).await
    }

    /// Background task: run the pipeline and commit or discard its
    /// outcome depending on generation freshness.
    async fn run_pipeline(
        &self,
        request: VerificationRequest,
        session: SharedSession,
        cancel: CancellationToken,
        generation: u64,
    ) {
        let request_id = request.id;
        let outcome = self.orchestrator.execute(&request, &session, &cancel).await;
        drop(request); // document bytes are consumed; release them

        let fresh = self.is_current_generation(generation).await && !cancel.is_cancelled();

        match outcome {
            Ok(PipelineOutcome::Completed(result)) if fresh => {
                self.commit_result(request_id, &session, result).await;
            }
            Ok(PipelineOutcome::Completed(result)) => {
                // Late result from a superseded or cancelled run
                tracing::info!(
                    request_id = %request_id,
                    discarded_result_id = %result.id,
                    "Discarding result from stale pipeline run"
                );
                self.mark_cancelled(request_id).await;
            }
            Ok(PipelineOutcome::Cancelled) => {
                self.mark_cancelled(request_id).await;
            }
            Err(e) if fresh => {
                self.mark_failed(request_id, &session, e).await;
            }
            Err(e) => {
                tracing::debug!(request_id = %request_id, error = %e, "Stale pipeline run failed; recording as cancelled");
                self.mark_cancelled(request_id).await;
            }
        }

        // Release the active slot if this run still owns it
        let mut active = self.active.lock().await;
        if matches!(active.as_ref(), Some(run) if run.generation == generation) {
            *active = None;
        }
    }

    async fn commit_result(
        &self,
        request_id: Uuid,
        session: &SharedSession,
        result: VerificationResult,
    ) {
        let result_id = result.id;
        let status = result.status;
        let confidence_score = result.confidence_score;

        match self.registry.append(&result).await {
            Ok(()) => {
                {
                    let mut session = session.write().await;
                    session.result_id = Some(result_id);
                    session.transition_to(SessionState::Completed);
                }
                self.event_bus.emit_lossy(VerifyEvent::VerificationCompleted {
                    request_id,
                    result_id,
                    status,
                    confidence_score,
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    result_id = %result_id,
                    error = %e,
                    "Failed to append result to registry"
                );
                self.mark_failed(request_id, session, e).await;
            }
        }
    }

    async fn mark_failed(&self, request_id: Uuid, session: &SharedSession, error: VerifyError) {
        let message = error.to_string();
        {
            let mut session = session.write().await;
            if session.is_terminal() {
                return;
            }
            session.error = Some(message.clone());
            session.transition_to(SessionState::Failed);
        }
        tracing::warn!(request_id = %request_id, error = %message, "Verification failed");
        self.event_bus.emit_lossy(VerifyEvent::VerificationFailed {
            request_id,
            error: message,
            timestamp: Utc::now(),
        });
    }

    /// Mark a session cancelled unless it already reached a terminal
    /// state (supersede and cooperative cancellation can race; first
    /// writer wins).
    async fn mark_cancelled(&self, request_id: Uuid) {
        let Ok(session) = self.session(request_id).await else {
            return;
        };
        {
            let mut session = session.write().await;
            if session.is_terminal() {
                return;
            }
            session.transition_to(SessionState::Cancelled);
        }
        tracing::info!(request_id = %request_id, "Verification cancelled");
        self.event_bus.emit_lossy(VerifyEvent::VerificationCancelled {
            request_id,
            timestamp: Utc::now(),
        });
    }

    async fn is_current_generation(&self, generation: u64) -> bool {
        let active = self.active.lock().await;
        matches!(active.as_ref(), Some(run) if run.generation == generation)
    }

    async fn session(&self, request_id: Uuid) -> VerifyResult<SharedSession> {
        self.sessions
            .read()
            .await
            .get(&request_id)
            .cloned()
            .ok_or_else(|| VerifyError::NotFound(format!("Unknown request: {}", request_id)))
    }

    fn validate_submission(&self, document: &[u8], mime_type: &str) -> VerifyResult<()> {
        if document.is_empty() {
            return Err(VerifyError::InvalidInput("Document is empty".to_string()));
        }
        if document.len() > self.config.max_document_bytes {
            return Err(VerifyError::InvalidInput(format!(
                "Document size {} exceeds limit of {} bytes",
                document.len(),
                self.config.max_document_bytes
            )));
        }
        if !self.config.supports_mime_type(mime_type) {
            return Err(VerifyError::InvalidInput(format!(
                "Unsupported media type: {}",
                mime_type
            )));
        }
        Ok(())
    }
}
