use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record already exists: {0}")]
    AlreadyExists(String),

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub(crate) fn post_not_found(id: &str) -> Self {
        DomainError::NotFound(format!("post id: {id}"))
    }

    pub(crate) fn post_already_exists(id: &str) -> Self {
        DomainError::AlreadyExists(format!("post id: {id}"))
    }
}
