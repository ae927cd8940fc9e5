use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// SIGNAL STATISTICS
// ============================================================================

/// Control-error statistics for one monitored signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    /// Mean control error over the baseline run
    pub mean: f64,
    /// Standard deviation of control error (>= 0)
    pub std: f64,
    /// Maximum allowed |error - mean| before the signal is anomalous
    pub tolerance: f64,
    /// Baseline rows that contributed
    #[serde(default)]
    pub samples: u64,
}

impl SignalStats {
    pub fn new(mean: f64, std: f64, tolerance: f64) -> Self {
        Self { mean, std, tolerance, samples: 0 }
    }

    /// |error - mean|
    pub fn deviation(&self, error: f64) -> f64 {
        (error - self.mean).abs()
    }

    /// Strictly greater than tolerance; with σ = 0 any nonzero deviation counts
    pub fn is_anomalous(&self, error: f64) -> bool {
        self.deviation(error) > self.tolerance
    }

    /// Diagnostic z-score, 0 when σ = 0
    pub fn z_score(&self, error: f64) -> f64 {
        if self.std > 0.0 {
            (error - self.mean) / self.std
        } else {
            0.0
        }
    }
}

/// Mean/σ of an actuator channel (diagnostic, never classified)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub mean: f64,
    pub std: f64,
    #[serde(default)]
    pub samples: u64,
}

// ============================================================================
// BASELINE STATISTICS
// ============================================================================

/// Everything the detector needs from a training run
///
/// Immutable once loaded. Signals absent from `signals` are not monitored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    pub id: String,
    pub created_at: i64, // Unix timestamp
    /// k in tolerance = k * σ
    pub multiplier: f64,
    /// Baseline rows read
    pub samples: u64,
    pub signals: BTreeMap<String, SignalStats>,
    #[serde(default)]
    pub actuators: BTreeMap<String, ChannelStats>,
}

impl BaselineStats {
    pub fn new(multiplier: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().timestamp(),
            multiplier,
            samples: 0,
            signals: BTreeMap::new(),
            actuators: BTreeMap::new(),
        }
    }

    pub fn with_signal(mut self, name: &str, stats: SignalStats) -> Self {
        self.signals.insert(name.to_string(), stats);
        self
    }

    /// Statistics for `name`, or None when the signal is not monitored
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&SignalStats> {
        self.signals.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn signal_names(&self) -> Vec<String> {
        self.signals.keys().cloned().collect()
    }
}

// ============================================================================
// RUNNING STATISTICS
// ============================================================================

/// Single-pass mean/variance accumulator (Welford)
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample standard deviation (n - 1); 0 for a single observation
    pub fn std(&self) -> Option<f64> {
        match self.count {
            0 => None,
            1 => Some(0.0),
            n => Some((self.m2 / (n - 1) as f64).max(0.0).sqrt()),
        }
    }
}
