#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Evaluation error: {0}")]
    Evaluation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn evaluation(message: impl Into<String>) -> Self {
        ApiError::Evaluation(message.into())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
