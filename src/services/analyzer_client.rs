//! HTTP client for the remote analyzer service
//!
//! Wire contract: `POST {base_url}/analyze/{stage}` with a JSON body
//! carrying the base64 document and media type; the response body is a
//! `StageFinding`. Timeouts are enforced by the orchestrator, not here,
//! so the HTTP client itself runs without a request timeout.

use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;

use crate::models::VerifyStage;
use crate::services::{Analyzer, AnalyzerError, StageFinding};

/// Analyzer collaborator reached over HTTP
pub struct RemoteAnalyzer {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    document: String,
    mime_type: &'a str,
}

impl RemoteAnalyzer {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AnalyzerError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("smartcert/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalyzerError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Analyzer for RemoteAnalyzer {
    async fn analyze(
        &self,
        stage: VerifyStage,
        document: &[u8],
        mime_type: &str,
    ) -> Result<StageFinding, AnalyzerError> {
        let url = format!("{}/analyze/{}", self.base_url, stage.slug());
        let body = AnalyzeRequest {
            document: base64::engine::general_purpose::STANDARD.encode(document),
            mime_type,
        };

        tracing::debug!(stage = %stage, url = %url, "Dispatching stage to analyzer");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyzerError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Rejected(format!("{}: {}", status, detail)));
        }
        if !status.is_success() {
            return Err(AnalyzerError::Transport(format!(
                "analyzer returned {}",
                status
            )));
        }

        response
            .json::<StageFinding>()
            .await
            .map_err(|e| AnalyzerError::Malformed(e.to_string()))
    }
}
