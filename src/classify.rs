//! Error classification: raw store failures into a small, actionable taxonomy.

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Message shown to collaborators when the store rejects an operation on
/// access-control grounds.
pub const ACCESS_DENIED_NOTICE: &str = "insufficient privileges, check access rules";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// Store-level access-control rejection. Actionable by an administrator.
    PermissionDenied,
    NotFound,
    /// Transient: the same call may succeed later.
    Unavailable,
    /// Input rejected locally before any store call.
    Validation,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PermissionDenied => "permission-denied",
            ErrorCode::NotFound => "not-found",
            ErrorCode::Unavailable => "unavailable",
            ErrorCode::Validation => "validation",
            ErrorCode::Unknown => "unknown",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::Unavailable)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a store error. The structured code wins when it is recognized;
/// otherwise the message is searched for known phrases.
pub fn classify(error: &StoreError) -> ErrorCode {
    error
        .code
        .as_deref()
        .and_then(from_code)
        .or_else(|| from_message(&error.message))
        .unwrap_or(ErrorCode::Unknown)
}

fn from_code(code: &str) -> Option<ErrorCode> {
    let normalized = code.trim().to_ascii_lowercase().replace('_', "-");
    let normalized = normalized
        .strip_prefix("firestore/")
        .unwrap_or(&normalized);

    match normalized {
        "permission-denied" | "unauthenticated" => Some(ErrorCode::PermissionDenied),
        "not-found" => Some(ErrorCode::NotFound),
        "unavailable" | "deadline-exceeded" | "resource-exhausted" | "aborted" | "cancelled" => {
            Some(ErrorCode::Unavailable)
        }
        _ => None,
    }
}

const PERMISSION_PHRASES: &[&str] = &["permission", "insufficient privileges", "unauthorized"];
const NOT_FOUND_PHRASES: &[&str] = &["not found", "not-found", "no document"];
const UNAVAILABLE_PHRASES: &[&str] = &["unavailable", "offline", "network", "timed out", "timeout", "deadline"];

fn from_message(message: &str) -> Option<ErrorCode> {
    let message = message.to_lowercase();
    let contains_any = |phrases: &[&str]| phrases.iter().any(|p| message.contains(p));

    if contains_any(PERMISSION_PHRASES) {
        Some(ErrorCode::PermissionDenied)
    } else if contains_any(NOT_FOUND_PHRASES) {
        Some(ErrorCode::NotFound)
    } else if contains_any(UNAVAILABLE_PHRASES) {
        Some(ErrorCode::Unavailable)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_code_is_permission_denied() {
        let err = StoreError::new("permission-denied", "Missing or insufficient grants.");
        assert_eq!(classify(&err), ErrorCode::PermissionDenied);
    }

    #[test]
    fn permission_message_without_code() {
        let err = StoreError::message("FirebaseError: Missing or insufficient PERMISSIONS.");
        assert_eq!(classify(&err), ErrorCode::PermissionDenied);
    }

    #[test]
    fn code_variants_are_normalized() {
        assert_eq!(classify(&StoreError::new("PERMISSION_DENIED", "")), ErrorCode::PermissionDenied);
        assert_eq!(classify(&StoreError::new("firestore/unavailable", "")), ErrorCode::Unavailable);
        assert_eq!(classify(&StoreError::new(" Not-Found ", "")), ErrorCode::NotFound);
    }

    #[test]
    fn structured_code_takes_precedence() {
        let err = StoreError::new("unavailable", "permission cache offline");
        assert_eq!(classify(&err), ErrorCode::Unavailable);
    }

    #[test]
    fn unrecognized_code_falls_back_to_message() {
        let err = StoreError::new("internal", "request timed out");
        assert_eq!(classify(&err), ErrorCode::Unavailable);
    }

    #[test]
    fn anything_else_is_unknown() {
        assert_eq!(classify(&StoreError::message("kaboom")), ErrorCode::Unknown);
        assert_eq!(classify(&StoreError::new("internal", "kaboom")), ErrorCode::Unknown);
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(ErrorCode::Unavailable.is_retryable());
        assert!(!ErrorCode::PermissionDenied.is_retryable());
        assert!(!ErrorCode::Unknown.is_retryable());
    }
}
