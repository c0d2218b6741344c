//! Service layer: analyzer collaborator, pipeline orchestrator,
//! session controller

pub mod analyzer;
pub mod analyzer_client;
pub mod orchestrator;
pub mod session_controller;

pub use analyzer::{Analyzer, AnalyzerError, StageFinding};
pub use analyzer_client::RemoteAnalyzer;
pub use orchestrator::{PipelineOrchestrator, PipelineOutcome};
pub use session_controller::{ResultQuery, SessionController};
