use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// OUTCOME
// ============================================================================

/// Classification outcome against ground truth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    TruePositive,
    TrueNegative,
    FalsePositive,
    FalseNegative,
}

impl Outcome {
    /// Fixed truth table over (anomalous, faulty)
    pub fn from_flags(anomalous: bool, faulty: bool) -> Self {
        match (anomalous, faulty) {
            (true, true) => Outcome::TruePositive,
            (false, false) => Outcome::TrueNegative,
            (true, false) => Outcome::FalsePositive,
            (false, true) => Outcome::FalseNegative,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::TruePositive => "TP",
            Outcome::TrueNegative => "TN",
            Outcome::FalsePositive => "FP",
            Outcome::FalseNegative => "FN",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// DECISION
// ============================================================================

/// Per-signal comparison against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalVerdict {
    pub signal: String,
    /// measured - set-point
    pub error: f64,
    /// |error - baseline mean|
    pub deviation: f64,
    pub tolerance: f64,
    /// Diagnostic only
    pub z_score: f64,
    pub anomalous: bool,
}

/// Outcome of classifying one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub timestamp: DateTime<Utc>,
    /// Evaluated signals in baseline key order; unmonitored or absent signals are not listed
    pub signals: Vec<SignalVerdict>,
    /// OR over `signals`; false when nothing was evaluated
    pub anomalous: bool,
    /// Ground truth supplied by the caller
    pub fault: bool,
    /// Active fault labels, when the caller knows them
    #[serde(default)]
    pub faults: Vec<String>,
    pub outcome: Outcome,
    /// max |z| over evaluated signals, logged for analysis
    pub score: f64,
}

impl Decision {
    pub fn verdict(&self, signal: &str) -> Option<&SignalVerdict> {
        self.signals.iter().find(|v| v.signal == signal)
    }

    /// Human-readable reason, e.g. "pH err +0.41 > tol 0.25"
    pub fn reason(&self) -> String {
        let reasons: Vec<String> = self
            .signals
            .iter()
            .filter(|v| v.anomalous)
            .map(|v| format!("{} err {:+.3} dev {:.3} > tol {:.3}",
                v.signal, v.error, v.deviation, v.tolerance))
            .collect();

        if reasons.is_empty() {
            "within_tolerance".to_string()
        } else {
            reasons.join("; ")
        }
    }
}
