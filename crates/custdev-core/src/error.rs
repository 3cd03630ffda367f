use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
