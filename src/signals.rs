//! Collaborator-facing failure signals.
//!
//! Every signal is logged through `tracing`. With the `emitter` feature the
//! signal is also emitted to listeners registered with [`Signals::on_access_denied`],
//! [`Signals::on_failure`] and [`Signals::on_orphan_blob`]. Listeners run on
//! the emitter's own threads, so they must not assume they run before the
//! emitting call returns.

#[cfg(feature = "emitter")]
use std::sync::{Arc, Mutex};

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};

use crate::classify::{ErrorCode, ACCESS_DENIED_NOTICE};
use crate::repository::RepositoryError;

pub const ACCESS_DENIED: &str = "access-denied";
pub const FAILURE: &str = "failure";
pub const ORPHAN_BLOB: &str = "orphan-blob";

/// The store rejected an operation on access-control grounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDenied {
    pub operation: String,
    pub message: String,
    pub notice: String,
}

/// Any other failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub operation: String,
    pub code: ErrorCode,
    pub message: String,
}

/// A blob that no metadata document references any more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanBlob {
    pub url: String,
    pub owner_id: String,
    pub reason: String,
}

#[derive(Clone)]
pub struct Signals {
    #[cfg(feature = "emitter")]
    emitter: Arc<Mutex<EventEmitter>>,
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Signals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signals").finish_non_exhaustive()
    }
}

impl Signals {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "emitter")]
            emitter: Arc::new(Mutex::new(EventEmitter::new())),
        }
    }

    /// Route a failed operation to the matching signal.
    pub fn report(&self, operation: &str, error: &RepositoryError) {
        match error.code() {
            ErrorCode::PermissionDenied => self.access_denied(AccessDenied {
                operation: operation.to_string(),
                message: error.to_string(),
                notice: ACCESS_DENIED_NOTICE.to_string(),
            }),
            code => self.failure(Failure {
                operation: operation.to_string(),
                code,
                message: error.to_string(),
            }),
        }
    }

    pub fn access_denied(&self, signal: AccessDenied) {
        tracing::error!(
            operation = %signal.operation,
            message = %signal.message,
            "access denied: {}",
            signal.notice
        );
        self.emit(ACCESS_DENIED, signal);
    }

    pub fn failure(&self, signal: Failure) {
        tracing::warn!(
            operation = %signal.operation,
            code = %signal.code,
            message = %signal.message,
            "operation failed"
        );
        self.emit(FAILURE, signal);
    }

    pub fn orphan_blob(&self, signal: OrphanBlob) {
        tracing::warn!(
            orphan_blob = %signal.url,
            owner_id = %signal.owner_id,
            reason = %signal.reason,
            "blob left without metadata"
        );
        self.emit(ORPHAN_BLOB, signal);
    }

    #[cfg(feature = "emitter")]
    pub fn on_access_denied<F>(&self, listener: F)
    where
        F: Fn(AccessDenied) + Send + Sync + 'static,
    {
        self.listen(ACCESS_DENIED, listener);
    }

    #[cfg(feature = "emitter")]
    pub fn on_failure<F>(&self, listener: F)
    where
        F: Fn(Failure) + Send + Sync + 'static,
    {
        self.listen(FAILURE, listener);
    }

    #[cfg(feature = "emitter")]
    pub fn on_orphan_blob<F>(&self, listener: F)
    where
        F: Fn(OrphanBlob) + Send + Sync + 'static,
    {
        self.listen(ORPHAN_BLOB, listener);
    }

    #[cfg(feature = "emitter")]
    fn listen<T, F>(&self, event: &str, listener: F)
    where
        T: for<'de> Deserialize<'de>,
        F: Fn(T) + Send + Sync + 'static,
    {
        match self.emitter.lock() {
            Ok(mut emitter) => {
                emitter.on(event, listener);
            }
            Err(_) => tracing::error!(event, "signal emitter poisoned, listener dropped"),
        }
    }

    #[cfg(feature = "emitter")]
    fn emit<T: Serialize>(&self, event: &str, signal: T) {
        if let Ok(mut emitter) = self.emitter.lock() {
            emitter.emit(event, signal);
        }
    }

    #[cfg(not(feature = "emitter"))]
    fn emit<T: Serialize>(&self, _event: &str, _signal: T) {}
}
