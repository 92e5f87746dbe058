use thiserror::Error;

use crate::collections::CollectionKind;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("collection {key} is not a {expected} collection")]
    WrongKind { key: String, expected: CollectionKind },
    #[error("malformed data in {key}: {reason}")]
    Malformed { key: String, reason: String },
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn wrong_kind(key: &str, expected: CollectionKind) -> Self {
        Self::WrongKind { key: key.to_string(), expected }
    }
}
