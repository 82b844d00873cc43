//! Denormalized aggregate maintenance on parent documents.
//!
//! Counters (`viewsCount`, `commentsCount`) and embedded member arrays
//! (`resources`, `files`) summarize child state on the parent. Every mutation
//! that affects one makes exactly one maintainer call, awaited before the
//! mutation reports success.

mod members;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::repository::RepositoryError;
use crate::store::{DocPath, DocumentStore, Patch};

/// How counter deltas reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterStrategy {
    /// Server-side increment, applied atomically by the store.
    #[default]
    Atomic,
    /// Read the parent, then write `current + delta`. Concurrent callers can
    /// lose updates.
    ReadModifyWrite,
}

/// How one array member is swapped for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceStrategy {
    /// A single array-replace write.
    #[default]
    Atomic,
    /// Remove then add, re-adding the old member if the add fails.
    TwoStep,
}

/// Outcome of a counter reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub previous: i64,
    pub actual: u64,
}

impl Reconciled {
    pub fn drifted(&self) -> bool {
        i64::try_from(self.actual).map_or(true, |actual| actual != self.previous)
    }
}

#[derive(Debug, Clone)]
pub struct CounterMaintainer<S> {
    store: S,
    counters: CounterStrategy,
    replace: ReplaceStrategy,
}

impl<S: DocumentStore> CounterMaintainer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            counters: CounterStrategy::default(),
            replace: ReplaceStrategy::default(),
        }
    }

    pub fn with_strategies(mut self, counters: CounterStrategy, replace: ReplaceStrategy) -> Self {
        self.counters = counters;
        self.replace = replace;
        self
    }

    pub fn counter_strategy(&self) -> CounterStrategy {
        self.counters
    }

    pub fn replace_strategy(&self) -> ReplaceStrategy {
        self.replace
    }

    /// Adds `delta` to a counter field. The result never drops below zero.
    pub async fn adjust(&self, parent: &DocPath, field: &str, delta: i64) -> Result<(), RepositoryError> {
        match self.counters {
            CounterStrategy::Atomic => {
                self.store
                    .update(parent, Patch::new().increment_floored(field, delta, 0))
                    .await?;
            }
            CounterStrategy::ReadModifyWrite => {
                let current = self.read_counter(parent, field).await?;
                let next = current.saturating_add(delta).max(0);
                self.store.update(parent, Patch::new().set(field, next)).await?;
            }
        }

        tracing::debug!(%parent, field, delta, strategy = ?self.counters, "counter adjusted");
        Ok(())
    }

    /// Sets a counter back to zero.
    pub async fn reset(&self, parent: &DocPath, field: &str) -> Result<(), RepositoryError> {
        self.store.update(parent, Patch::new().set(field, 0)).await?;
        tracing::info!(%parent, field, "counter reset");
        Ok(())
    }

    /// Overwrites a counter with a freshly computed count, logging any drift.
    pub async fn reconcile(
        &self,
        parent: &DocPath,
        field: &str,
        actual: u64,
    ) -> Result<Reconciled, RepositoryError> {
        let previous = self.read_counter(parent, field).await?;
        let reconciled = Reconciled { previous, actual };

        if reconciled.drifted() {
            tracing::warn!(%parent, field, previous, actual, "counter drift corrected");
            self.store.update(parent, Patch::new().set(field, actual)).await?;
        }
        Ok(reconciled)
    }

    async fn read_counter(&self, parent: &DocPath, field: &str) -> Result<i64, RepositoryError> {
        let snapshot = self
            .store
            .get(parent)
            .await?
            .ok_or_else(|| RepositoryError::not_found(parent.parent().as_str(), parent.id()))?;

        Ok(snapshot.data.get(field).and_then(Value::as_i64).unwrap_or(0))
    }
}
