//! Logic Module - Business Logic & Engines
//!
//! Pipeline: collector -> (baseline.csv) -> baseline trainer -> (baseline_stats.json)
//! -> detector -> decision log.
//!
//! - `telemetry/` - samples and simulator payload decoding
//! - `dataset/` - baseline CSV log
//! - `baseline/` - statistics training and storage
//! - `detector/` - residual anomaly detection, confusion matrix, decision log
//! - `stream/` - MQTT subscription and offline replay

pub mod config;
pub mod telemetry;
pub mod dataset;
pub mod baseline;
pub mod detector;
pub mod collector;
pub mod stream;
