//! smartcert library interface
//!
//! Credential verification service: drives a submitted document
//! through an ordered forensic pipeline, fuses per-stage indicators
//! into one classification through the weighted fusion engine, and
//! records outcomes in a durable registry with a favorites set.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod fusion;
pub mod models;
pub mod registry;
pub mod services;

pub use crate::error::{ApiError, ApiResult, VerifyError, VerifyResult};

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::events::EventBus;
use crate::registry::VerificationRegistry;
use crate::services::{Analyzer, SessionController};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session controller: the submit/cancel/query surface
    pub controller: SessionController,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the full service: registry over the pool, controller over
    /// the injected analyzer. Tests pass stub analyzers here.
    pub fn new(config: AppConfig, pool: sqlx::SqlitePool, analyzer: Arc<dyn Analyzer>) -> Self {
        let event_bus = EventBus::new(config.event_capacity);
        let registry = Arc::new(VerificationRegistry::new(pool));
        let controller =
            SessionController::new(config, analyzer, registry, event_bus.clone());

        Self {
            controller,
            event_bus,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::verification_routes())
        .merge(api::registry_routes())
        .merge(api::health_routes())
        .route("/verify/events", get(api::verify_event_stream))
        .with_state(state)
}
