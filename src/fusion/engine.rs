//! Weighted fusion of per-stage indicators into one classification
//!
//! Pure function: no I/O, no state, no clock. Identical indicator
//! input always yields identical output, which is what makes results
//! auditable and regression-testable.
//!
//! # Algorithm
//! 1. Clamp every weight into [0,1] and every local score into [0,100].
//! 2. Empty input fails with `InsufficientEvidence`.
//! 3. `W = Σ weight`; if `W == 0`, substitute equal weights `1/n`.
//! 4. `confidence = round(Σ (weight/W) * local_score)`, clamped to [0,100].
//! 5. Classify: `>88` GENUINE, `(45, 88]` SUSPICIOUS, `<=45` FAKE.
//! 6. Summarize issue-bearing indicators by descending weight.

use std::cmp::Ordering;

use crate::error::VerifyError;
use crate::models::{Indicator, VerificationStatus};

/// Output of one fusion pass.
///
/// Ids and timestamps are deliberately absent; the orchestrator attaches
/// them when it builds the `VerificationResult`, keeping fusion pure.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    /// Aggregate weighted authenticity score (0-100)
    pub confidence_score: u8,

    /// Risk classification derived from the score
    pub status: VerificationStatus,

    /// Deterministic justification text
    pub summary: String,

    /// Indicators as used by fusion: input order, clamped into range
    pub indicators: Vec<Indicator>,
}

/// Fuse per-stage indicators into a confidence score and classification.
///
/// Fails with `InsufficientEvidence` on empty input; the orchestrator
/// treats that as a failed pipeline run, never as a silent zero score.
pub fn fuse(indicators: &[Indicator]) -> Result<FusionOutcome, VerifyError> {
    if indicators.is_empty() {
        return Err(VerifyError::InsufficientEvidence);
    }

    let clamped: Vec<Indicator> = indicators.iter().map(Indicator::clamped).collect();

    let total_weight: f64 = clamped.iter().map(|i| i.weight).sum();

    // All-zero weights degrade to an unweighted mean instead of
    // dividing by zero or failing outright.
    let weighted_sum: f64 = if total_weight == 0.0 {
        let equal = 1.0 / clamped.len() as f64;
        clamped.iter().map(|i| equal * i.local_score).sum()
    } else {
        clamped
            .iter()
            .map(|i| (i.weight / total_weight) * i.local_score)
            .sum()
    };

    let confidence_score = weighted_sum.round().clamp(0.0, 100.0) as u8;
    let status = classify(confidence_score);
    let summary = summarize(&clamped, confidence_score, status);

    Ok(FusionOutcome {
        confidence_score,
        status,
        summary,
        indicators: clamped,
    })
}

/// Risk classification thresholds, applied to the rounded score.
///
/// The GENUINE rule is strictly greater than 88: a score of exactly 88
/// still requires manual audit.
fn classify(confidence_score: u8) -> VerificationStatus {
    if confidence_score > 88 {
        VerificationStatus::Genuine
    } else if confidence_score > 45 {
        VerificationStatus::Suspicious
    } else {
        VerificationStatus::Fake
    }
}

/// Build the deterministic summary from issue-bearing indicators.
///
/// Indicators with detected issues are listed by descending weight; the
/// sort is stable, so equal weights keep stage execution order.
fn summarize(
    indicators: &[Indicator],
    confidence_score: u8,
    status: VerificationStatus,
) -> String {
    let mut flagged: Vec<&Indicator> = indicators.iter().filter(|i| i.has_issues()).collect();

    if flagged.is_empty() {
        return format!(
            "Weighted fusion score {} ({}). No anomalies were detected at any fusion level.",
            confidence_score,
            status.as_str()
        );
    }

    flagged.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));

    let findings: Vec<String> = flagged
        .iter()
        .map(|i| {
            format!(
                "{} [{}] (weight {:.2}): {}",
                i.label,
                i.kind.as_str(),
                i.weight,
                i.detected_issues.join("; ")
            )
        })
        .collect();

    format!(
        "Weighted fusion score {} ({}). Anomalies by relevance: {}",
        confidence_score,
        status.as_str(),
        findings.join(" | ")
    )
}
