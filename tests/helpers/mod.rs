//! Shared test helpers: stub analyzers and app construction
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use smartcert::config::AppConfig;
use smartcert::models::{ExtractedData, Indicator, IndicatorKind, VerifyStage};
use smartcert::services::{Analyzer, AnalyzerError, StageFinding};
use smartcert::AppState;

/// Indicator kind the stub analyzers report per stage
pub fn kind_for(stage: VerifyStage) -> IndicatorKind {
    match stage {
        VerifyStage::Ingestion => IndicatorKind::Metadata,
        VerifyStage::Textual => IndicatorKind::Textual,
        VerifyStage::Visual => IndicatorKind::Visual,
        VerifyStage::Typographic | VerifyStage::Fusion => IndicatorKind::Typographic,
    }
}

pub fn stub_finding(stage: VerifyStage, weight: f64, local_score: f64) -> StageFinding {
    let extracted = (stage == VerifyStage::Textual).then(|| ExtractedData {
        candidate_name: "Jane Doe".to_string(),
        institution: "Example University".to_string(),
        certificate_id: "CERT-001".to_string(),
        issue_date: "2024-06-01".to_string(),
        qualification: "BSc Computer Science".to_string(),
    });

    StageFinding {
        indicator: Indicator {
            kind: kind_for(stage),
            label: format!("{} finding", stage.label()),
            weight,
            local_score,
            explanation: "stubbed".to_string(),
            detected_issues: Vec::new(),
        },
        extracted,
    }
}

/// Analyzer that answers immediately with a uniform score
pub struct InstantAnalyzer {
    pub local_score: f64,
}

#[async_trait]
impl Analyzer for InstantAnalyzer {
    async fn analyze(
        &self,
        stage: VerifyStage,
        _document: &[u8],
        _mime_type: &str,
    ) -> Result<StageFinding, AnalyzerError> {
        Ok(stub_finding(stage, 0.25, self.local_score))
    }
}

/// Analyzer that sleeps before every answer
pub struct SlowAnalyzer {
    pub delay: Duration,
    pub local_score: f64,
}

#[async_trait]
impl Analyzer for SlowAnalyzer {
    async fn analyze(
        &self,
        stage: VerifyStage,
        _document: &[u8],
        _mime_type: &str,
    ) -> Result<StageFinding, AnalyzerError> {
        tokio::time::sleep(self.delay).await;
        Ok(stub_finding(stage, 0.25, self.local_score))
    }
}

/// Analyzer that fails at one specific stage
pub struct FailingAnalyzer {
    pub fail_stage: VerifyStage,
}

#[async_trait]
impl Analyzer for FailingAnalyzer {
    async fn analyze(
        &self,
        stage: VerifyStage,
        _document: &[u8],
        _mime_type: &str,
    ) -> Result<StageFinding, AnalyzerError> {
        if stage == self.fail_stage {
            return Err(AnalyzerError::Rejected("stub refusal".to_string()));
        }
        Ok(stub_finding(stage, 0.25, 90.0))
    }
}

/// Analyzer that blocks exactly once, at the textual stage, until
/// released. Later calls answer immediately, so a superseding request
/// can complete while the first one hangs.
pub struct BlockOnceAnalyzer {
    release: Arc<Notify>,
    armed: AtomicBool,
    entered: Arc<Notify>,
}

impl BlockOnceAnalyzer {
    pub fn new() -> Self {
        Self {
            release: Arc::new(Notify::new()),
            armed: AtomicBool::new(true),
            entered: Arc::new(Notify::new()),
        }
    }

    /// Notified when the blocking call has started waiting
    pub fn entered(&self) -> Arc<Notify> {
        self.entered.clone()
    }

    /// Unblock the waiting call
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl Analyzer for BlockOnceAnalyzer {
    async fn analyze(
        &self,
        stage: VerifyStage,
        _document: &[u8],
        _mime_type: &str,
    ) -> Result<StageFinding, AnalyzerError> {
        if stage == VerifyStage::Textual && self.armed.swap(false, Ordering::SeqCst) {
            // notify_one stores a permit, so the test cannot miss the
            // signal even if it subscribes after this point
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(stub_finding(stage, 0.25, 92.0))
    }
}

/// Config tuned for tests: short timeout, small size limit left at the
/// default 5 MiB unless a test overrides it.
pub fn test_config() -> AppConfig {
    AppConfig {
        stage_timeout_secs: 2,
        ..AppConfig::default()
    }
}

/// Build app state over an in-memory database
pub async fn test_state(config: AppConfig, analyzer: Arc<dyn Analyzer>) -> AppState {
    // One connection: pooled in-memory SQLite otherwise gives each
    // connection its own empty database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    smartcert::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    AppState::new(config, pool, analyzer)
}

/// Poll until the closure returns true or the deadline passes
pub async fn wait_until<F, Fut>(mut condition: F, timeout: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
