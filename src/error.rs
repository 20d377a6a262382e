//! Run-level errors
//!
//! Only these end a run early. Collector and region-listing failures are
//! absorbed where they happen and never reach this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Could not authenticate with AWS. Please check your credentials: {0}")]
    Authentication(String),

    #[error("Error writing report {}: {message}", path.display())]
    ReportWrite { path: PathBuf, message: String },
}

impl InventoryError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            InventoryError::Authentication(_) => 1,
            InventoryError::ReportWrite { .. } => 2,
        }
    }
}
