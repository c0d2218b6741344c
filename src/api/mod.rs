//! HTTP API handlers for smartcert

pub mod health;
pub mod registry;
pub mod sse;
pub mod verification;

pub use health::health_routes;
pub use registry::registry_routes;
pub use sse::verify_event_stream;
pub use verification::verification_routes;
