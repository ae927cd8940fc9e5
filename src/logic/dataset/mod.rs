//! Dataset Module - Baseline Log (collector output, trainer input)
//!
//! Records fault-free telemetry as CSV, one row per sample, and reads it back
//! for training. Column layout lives in `layout.rs`.

pub mod layout;
pub mod reader;
pub mod writer;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

pub use layout::LogLayout;
pub use reader::{read_baseline_log, BaselineLog};
pub use writer::BaselineLogWriter;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("baseline log not found: {0:?}")]
    NotFound(PathBuf),

    #[error("baseline log {path:?} has header [{found}], expected [{expected}]")]
    HeaderMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}
