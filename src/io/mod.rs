pub mod csv_export;
pub mod csv_import;
pub mod file;
pub mod store;

use thiserror::Error;

pub use file::{load_plan_file, save_plan_file};
pub use store::{load_plan, save_plan, FileStore, KeyValueStore};

/// Failures while reading or writing plans.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("file access failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid plan data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Format(String),

    #[error("no data directory available on this system")]
    NoDataDir,
}
