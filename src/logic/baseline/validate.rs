use std::path::PathBuf;

use super::types::BaselineStats;

#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("baseline statistics not found: {0:?}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid statistics for signal '{signal}': {reason}")]
    InvalidSignal { signal: String, reason: String },

    #[error("invalid tolerance multiplier {0}")]
    InvalidMultiplier(f64),
}

/// Reject statistics the detector could not compare against safely
pub fn validate_stats(stats: &BaselineStats) -> Result<(), BaselineError> {
    if !stats.multiplier.is_finite() || stats.multiplier < 0.0 {
        return Err(BaselineError::InvalidMultiplier(stats.multiplier));
    }

    for (signal, s) in &stats.signals {
        let invalid = |reason: &str| BaselineError::InvalidSignal {
            signal: signal.clone(),
            reason: reason.to_string(),
        };

        if !s.mean.is_finite() {
            return Err(invalid("mean is not finite"));
        }
        if !s.std.is_finite() || s.std < 0.0 {
            return Err(invalid("std must be finite and >= 0"));
        }
        if !s.tolerance.is_finite() || s.tolerance < 0.0 {
            return Err(invalid("tolerance must be finite and >= 0"));
        }
    }

    Ok(())
}
