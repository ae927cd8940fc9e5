//! Baseline Module - Normal-Operation Statistics
//!
//! Learns per-signal control-error statistics from a fault-free run and
//! persists them for the detector.
//!
//! # Architecture
//! - `types.rs`: `BaselineStats`, `SignalStats`, Welford accumulator
//! - `trainer.rs`: batch aggregation over the baseline log
//! - `validate.rs`: `BaselineError`, value checks on load
//! - `storage.rs`: JSON persistence
//!
//! # Failure Strategy
//! A missing or invalid statistics file is fatal for the detector. A valid
//! file with no signals loads fine; the detector warns about it.

pub mod types;
pub mod trainer;
pub mod validate;
pub mod storage;

use std::path::Path;

pub use storage::{load_stats, save_stats};
pub use trainer::{parse_floor, train, TrainerConfig};
pub use types::BaselineStats;
pub use validate::{validate_stats, BaselineError};

use crate::logic::dataset::{self, DatasetError};

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Baseline(#[from] BaselineError),
}

/// Read the baseline log, train, and save the statistics
pub fn train_from_file(
    input: &Path,
    output: &Path,
    config: &TrainerConfig,
) -> Result<BaselineStats, TrainError> {
    let baseline_log = dataset::read_baseline_log(input)?;
    if baseline_log.bad_cells > 0 {
        log::warn!("Baseline log {:?}: {} unparseable cells ignored", input, baseline_log.bad_cells);
    }
    let stats = train(&baseline_log, config);

    if stats.is_empty() {
        log::warn!("Training produced no signal statistics - check {:?}", input);
    }

    validate_stats(&stats)?;
    save_stats(&stats, output)?;
    log::info!("Saved baseline stats '{}' to {:?}", stats.id, output);
    for (name, s) in &stats.signals {
        log::info!("  {:<16} mean={:+.4} std={:.4} tol={:.4} (n={})",
            name, s.mean, s.std, s.tolerance, s.samples);
    }

    Ok(stats)
}
