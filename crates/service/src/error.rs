use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// One failed field check, reported back to the caller as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
}

impl FieldError {
    pub fn new(param: &str, msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
            param: param.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Post already liked")]
    AlreadyLiked,

    #[error("Post has not yet been liked")]
    NotLiked,

    #[error("{0}")]
    NothingToDelete(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(msg: &str) -> Self {
        ServiceError::NotFound(msg.to_string())
    }

    pub fn unauthorized(msg: &str) -> Self {
        ServiceError::Unauthorized(msg.to_string())
    }

    pub fn forbidden(msg: &str) -> Self {
        ServiceError::Forbidden(msg.to_string())
    }
}
