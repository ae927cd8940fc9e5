use serde::{Deserialize, Serialize};

use super::types::Outcome;

/// Running confusion matrix for one detection run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: u64,
    pub tn: u64,
    pub fp: u64,
    pub fn_: u64,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::TruePositive => self.tp += 1,
            Outcome::TrueNegative => self.tn += 1,
            Outcome::FalsePositive => self.fp += 1,
            Outcome::FalseNegative => self.fn_ += 1,
        }
    }

    #[cfg(test)]
    pub fn count(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::TruePositive => self.tp,
            Outcome::TrueNegative => self.tn,
            Outcome::FalsePositive => self.fp,
            Outcome::FalseNegative => self.fn_,
        }
    }

    /// Samples classified so far
    pub fn total(&self) -> u64 {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn precision(&self) -> Option<f64> {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> Option<f64> {
        ratio(self.tp, self.tp + self.fn_)
    }
}

fn ratio(num: u64, den: u64) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

impl std::fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TP={} TN={} FP={} FN={}", self.tp, self.tn, self.fp, self.fn_)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_total() {
        let mut m = ConfusionMatrix::new();
        m.record(Outcome::TruePositive);
        m.record(Outcome::TruePositive);
        m.record(Outcome::FalseNegative);
        m.record(Outcome::TrueNegative);

        assert_eq!(m.count(Outcome::TruePositive), 2);
        assert_eq!(m.count(Outcome::FalsePositive), 0);
        assert_eq!(m.total(), 4);
        assert_eq!(m.to_string(), "TP=2 TN=1 FP=0 FN=1");
    }

    #[test]
    fn test_ratios() {
        let m = ConfusionMatrix { tp: 3, tn: 5, fp: 1, fn_: 1 };
        assert_eq!(m.accuracy(), Some(0.8));
        assert_eq!(m.precision(), Some(0.75));
        assert_eq!(m.recall(), Some(0.75));
    }

    #[test]
    fn test_ratios_undefined_when_empty() {
        let m = ConfusionMatrix::new();
        assert_eq!(m.accuracy(), None);
        assert_eq!(m.precision(), None);
        assert_eq!(m.recall(), None);
    }
}
