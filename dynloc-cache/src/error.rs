use std::path::PathBuf;

use dynloc_core::DesignError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{} exists, not overwriting", .path.display())]
    OutputExists { path: PathBuf },

    #[error("invalid subject id '{0}'")]
    InvalidSubject(String),

    #[error("no stored experiment at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("run {run} not found in {}", .path.display())]
    MissingRun { run: usize, path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Design(#[from] DesignError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
