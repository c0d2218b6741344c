//! Forensic indicator produced by the analyzer, one per analysis stage
//!
//! An indicator is one forensic dimension's weighted, scored finding.
//! Indicators are immutable once produced; the fusion engine clamps
//! `weight` and `local_score` into range defensively before use.

use serde::{Deserialize, Serialize};

/// Forensic dimension an indicator belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    /// Logical consistency of dates, names, credentials
    Textual,
    /// Logos, seals, cloning/healing artifacts
    Visual,
    /// Mixed font faces, kerning, stroke-width anomalies
    Typographic,
    /// Signature authenticity
    Signature,
    /// Document-level metadata
    Metadata,
}

impl IndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Textual => "textual",
            IndicatorKind::Visual => "visual",
            IndicatorKind::Typographic => "typographic",
            IndicatorKind::Signature => "signature",
            IndicatorKind::Metadata => "metadata",
        }
    }
}

/// One analyzer finding for one forensic dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Forensic dimension
    pub kind: IndicatorKind,

    /// Human-readable label (e.g. "Seal integrity audit")
    pub label: String,

    /// Dynamic relevance weight, expected in [0.0, 1.0]
    pub weight: f64,

    /// Authenticity score for this dimension, expected in [0.0, 100.0]
    pub local_score: f64,

    /// Technical justification for the score
    pub explanation: String,

    /// Concrete anomalies found, empty when the dimension is clean
    pub detected_issues: Vec<String>,
}

impl Indicator {
    /// Copy of this indicator with weight and score clamped into range.
    ///
    /// The analyzer collaborator is not trusted to honor the range
    /// contract; fusion always works on clamped values.
    pub fn clamped(&self) -> Self {
        Self {
            weight: self.weight.clamp(0.0, 1.0),
            local_score: self.local_score.clamp(0.0, 100.0),
            ..self.clone()
        }
    }

    /// Whether this indicator flagged at least one anomaly
    pub fn has_issues(&self) -> bool {
        !self.detected_issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(weight: f64, local_score: f64) -> Indicator {
        Indicator {
            kind: IndicatorKind::Visual,
            label: "Seal integrity audit".to_string(),
            weight,
            local_score,
            explanation: String::new(),
            detected_issues: Vec::new(),
        }
    }

    #[test]
    fn clamps_out_of_range_values() {
        let clamped = indicator(1.7, 140.0).clamped();
        assert_eq!(clamped.weight, 1.0);
        assert_eq!(clamped.local_score, 100.0);

        let clamped = indicator(-0.2, -5.0).clamped();
        assert_eq!(clamped.weight, 0.0);
        assert_eq!(clamped.local_score, 0.0);
    }

    #[test]
    fn in_range_values_unchanged() {
        let clamped = indicator(0.4, 72.5).clamped();
        assert_eq!(clamped.weight, 0.4);
        assert_eq!(clamped.local_score, 72.5);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&IndicatorKind::Typographic).unwrap();
        assert_eq!(json, "\"typographic\"");
    }
}
