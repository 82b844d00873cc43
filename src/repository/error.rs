use thiserror::Error;

use crate::classify::{classify, ErrorCode};
use crate::store::StoreError;

#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The referenced document does not exist.
    #[error("{collection} not found with ID {id}")]
    NotFound { collection: String, id: String },

    /// Input rejected before any store call was attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller may not perform this operation on this document.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Any failure reported by the document store.
    #[error("{source}")]
    Store {
        code: ErrorCode,
        #[source]
        source: StoreError,
    },

    /// A blob upload failed before any metadata was written.
    #[error("upload failed: {source}")]
    Upload {
        code: ErrorCode,
        #[source]
        source: StoreError,
    },

    /// A stored document could not be mapped into its entity type.
    #[error("malformed document {path}: {message}")]
    Decode { path: String, message: String },
}

impl RepositoryError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        RepositoryError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn upload(source: StoreError) -> Self {
        RepositoryError::Upload {
            code: classify(&source),
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RepositoryError::NotFound { .. } => ErrorCode::NotFound,
            RepositoryError::Validation(_) => ErrorCode::Validation,
            RepositoryError::Forbidden(_) => ErrorCode::PermissionDenied,
            RepositoryError::Store { code, .. } | RepositoryError::Upload { code, .. } => *code,
            RepositoryError::Decode { .. } => ErrorCode::Unknown,
        }
    }
}

impl From<StoreError> for RepositoryError {
    fn from(source: StoreError) -> Self {
        RepositoryError::Store {
            code: classify(&source),
            source,
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Decode {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

/// Fails with `Validation` when a required text field is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), RepositoryError> {
    if value.trim().is_empty() {
        return Err(RepositoryError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
