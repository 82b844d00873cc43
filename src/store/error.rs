use thiserror::Error;

/// Raw failure reported by a document or blob store.
///
/// Mirrors what hosted document stores hand back: an optional structured code
/// (e.g. `permission-denied`) plus a human-readable message. Interpretation is
/// left to [`crate::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub code: Option<String>,
    pub message: String,
}

impl StoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// An error carrying only a message, no structured code.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn not_found(path: impl std::fmt::Display) -> Self {
        Self::new("not-found", format!("no document to update: {}", path))
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new("permission-denied", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new("unavailable", message)
    }

    pub(crate) fn lock_poisoned(operation: &str) -> Self {
        Self::new("internal", format!("store lock poisoned during {}", operation))
    }
}
