use serde::Serialize;

use super::RepositoryError;
use crate::classify::{ErrorCode, ACCESS_DENIED_NOTICE};

/// Tagged result shape handed to callers outside the crate (UI, RPC layers):
/// a success flag, the payload, and on failure a message plus classifier code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

/// What a collaborator should show for a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Access-control rejection; direct the user to an administrator.
    AccessDenied(&'static str),
    Failure(String),
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn failed(error: &RepositoryError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            code: Some(error.code()),
        }
    }

    pub fn notice(&self) -> Option<Notice> {
        if self.success {
            return None;
        }
        match self.code {
            Some(ErrorCode::PermissionDenied) => Some(Notice::AccessDenied(ACCESS_DENIED_NOTICE)),
            _ => Some(Notice::Failure(
                self.error.clone().unwrap_or_else(|| "operation failed".to_string()),
            )),
        }
    }

    pub fn into_result(self) -> Result<T, (Option<ErrorCode>, String)> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err((
                self.code,
                self.error.unwrap_or_else(|| "operation failed".to_string()),
            )),
        }
    }
}

impl<T> From<Result<T, RepositoryError>> for Outcome<T> {
    fn from(result: Result<T, RepositoryError>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(err) => Outcome::failed(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use serde_json::json;

    #[test]
    fn success_serializes_without_error_fields() {
        let outcome = Outcome::ok("l1".to_string());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "success": true, "data": "l1" })
        );
        assert!(outcome.notice().is_none());
    }

    #[test]
    fn permission_failure_gets_access_notice() {
        let result: Result<(), RepositoryError> =
            Err(StoreError::new("permission-denied", "Missing or insufficient permissions.").into());
        let outcome = Outcome::from(result);

        assert!(!outcome.success);
        assert_eq!(outcome.code, Some(ErrorCode::PermissionDenied));
        assert_eq!(outcome.notice(), Some(Notice::AccessDenied(ACCESS_DENIED_NOTICE)));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap()["code"],
            json!("permission-denied")
        );
    }

    #[test]
    fn other_failures_get_generic_notice() {
        let result: Result<(), RepositoryError> = Err(RepositoryError::not_found("lessons", "l9"));
        let outcome = Outcome::from(result);

        assert_eq!(outcome.code, Some(ErrorCode::NotFound));
        assert_eq!(
            outcome.notice(),
            Some(Notice::Failure("lessons not found with ID l9".into()))
        );
    }
}
