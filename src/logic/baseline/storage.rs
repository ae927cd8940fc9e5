use std::fs;
use std::path::Path;

use super::types::BaselineStats;
use super::validate::{validate_stats, BaselineError};

/// Save statistics to disk as pretty JSON
pub fn save_stats(stats: &BaselineStats, path: &Path) -> Result<(), BaselineError> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(stats)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load statistics from disk with validation
pub fn load_stats(path: &Path) -> Result<BaselineStats, BaselineError> {
    if !path.exists() {
        return Err(BaselineError::NotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;
    let stats: BaselineStats = serde_json::from_slice(&data)?;

    validate_stats(&stats)?;

    Ok(stats)
}
