//! Weighted fusion decision engine

mod engine;

pub use engine::{fuse, FusionOutcome};
