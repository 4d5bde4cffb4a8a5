//! Read/write model artifact JSON.
//!
//! The schema is `models::ModelArtifact`. Reading validates the forest fully; a file that
//! parses but fails an integrity check is reported with exit code 4.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;
use crate::models::{ModelArtifact, TrainedForest};

/// Load and validate a forest.
pub fn read_model(path: &Path) -> Result<TrainedForest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model artifact '{}': {e}", path.display())))?;
    let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid model artifact '{}': {e}", path.display())))?;

    TrainedForest::from_artifact(artifact)
        .map_err(|e| AppError::new(e.exit_code(), format!("{e} (artifact '{}')", path.display())))
}

/// Write a forest as pretty-printed artifact JSON.
pub fn write_model(path: &Path, forest: &TrainedForest) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model artifact '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &forest.to_artifact())
        .map_err(|e| AppError::new(2, format!("Failed to write model artifact: {e}")))?;

    Ok(())
}
