//! Embedded array membership by deep equality.

use serde::Serialize;
use serde_json::Value;

use super::{CounterMaintainer, ReplaceStrategy};
use crate::repository::RepositoryError;
use crate::store::{DocPath, DocumentStore, Patch};

impl<S: DocumentStore> CounterMaintainer<S> {
    /// Adds `member` unless a deep-equal element is already present.
    pub async fn add_member<M: Serialize>(
        &self,
        parent: &DocPath,
        field: &str,
        member: &M,
    ) -> Result<(), RepositoryError> {
        let member = serde_json::to_value(member)?;
        self.store
            .update(parent, Patch::new().array_union(field, member))
            .await?;
        Ok(())
    }

    /// Removes every element deep-equal to `member`.
    pub async fn remove_member<M: Serialize>(
        &self,
        parent: &DocPath,
        field: &str,
        member: &M,
    ) -> Result<(), RepositoryError> {
        let member = serde_json::to_value(member)?;
        self.store
            .update(parent, Patch::new().array_remove(field, member))
            .await?;
        Ok(())
    }

    /// Swaps `old` for `new`.
    ///
    /// With [`ReplaceStrategy::TwoStep`] a failure between the two writes is
    /// compensated by re-adding `old`; the original error is still returned.
    pub async fn replace_member<M: Serialize>(
        &self,
        parent: &DocPath,
        field: &str,
        old: &M,
        new: &M,
    ) -> Result<(), RepositoryError> {
        let old = serde_json::to_value(old)?;
        let new = serde_json::to_value(new)?;

        match self.replace {
            ReplaceStrategy::Atomic => {
                self.store
                    .update(parent, Patch::new().array_replace(field, old, new))
                    .await?;
                Ok(())
            }
            ReplaceStrategy::TwoStep => self.replace_in_two_steps(parent, field, old, new).await,
        }
    }

    async fn replace_in_two_steps(
        &self,
        parent: &DocPath,
        field: &str,
        old: Value,
        new: Value,
    ) -> Result<(), RepositoryError> {
        self.store
            .update(parent, Patch::new().array_remove(field, old.clone()))
            .await?;

        let Err(add_error) = self
            .store
            .update(parent, Patch::new().array_union(field, new))
            .await
        else {
            return Ok(());
        };

        match self
            .store
            .update(parent, Patch::new().array_union(field, old))
            .await
        {
            Ok(()) => {
                tracing::warn!(%parent, field, error = %add_error, "member replace failed, old member restored");
            }
            Err(restore_error) => {
                tracing::error!(
                    %parent,
                    field,
                    error = %add_error,
                    %restore_error,
                    "member replace failed and old member could not be restored"
                );
            }
        }

        Err(add_error.into())
    }
}
