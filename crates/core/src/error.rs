use modelpeek_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeekError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logging error: {0}")]
    Logging(String),
    #[error("Model error: {0}")]
    Model(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, PeekError>;
