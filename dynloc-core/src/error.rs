use thiserror::Error;

/// Errors raised while building or checking a localizer design
#[derive(Error, Debug)]
pub enum DesignError {
    #[error("category '{category}' has {available} stimuli left, {required} required")]
    InsufficientStimuli {
        category: String,
        available: usize,
        required: usize,
    },

    #[error("no eligible trial for an attention check of '{category}' in run {run}")]
    AttentionCheckPlacement { run: usize, category: String },

    #[error("stimulus pool is empty")]
    EmptyPool,

    #[error("invalid design: {0}")]
    InvalidDesign(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DesignError>;
