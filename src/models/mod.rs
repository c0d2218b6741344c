//! Data model for the smartcert verification service

pub mod indicator;
pub mod request;
pub mod result;
pub mod session;

pub use indicator::{Indicator, IndicatorKind};
pub use request::VerificationRequest;
pub use result::{ExtractedData, VerificationResult, VerificationStatus};
pub use session::{SessionState, StageProgress, VerifySession, VerifyStage};
