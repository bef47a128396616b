pub mod cache;
pub mod error;

pub use cache::{ExperimentStore, file_name, load_path};
pub use error::{Result, StoreError};
