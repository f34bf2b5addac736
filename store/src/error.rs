use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access stats file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stats file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StoreError>;
