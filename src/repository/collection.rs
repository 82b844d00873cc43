use serde_json::Value;

use crate::counter::CounterMaintainer;
use crate::document::to_fields;
use crate::entities::{CollectionPatch, FileRef, NewCollection, ResourceCollection};
use crate::query::{Query, QueryRouter};
use crate::store::{CollectionPath, DocPath, DocumentStore, Filter, Patch};
use crate::Document;

use super::{fetch, missing_at, not_found_for, require, stamped, RepositoryError, UPDATED_AT};

const FILES: &str = "files";

/// Conjunctive equality filters over collections. `group_id` matches that
/// group only; use [`CollectionRepository::visible_to`] to include global
/// collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionFilter {
    pub teacher_id: Option<String>,
    pub subject_id: Option<String>,
    pub group_id: Option<String>,
}

impl CollectionFilter {
    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(teacher_id) = &self.teacher_id {
            filters.push(Filter::eq("teacherId", teacher_id.as_str()));
        }
        if let Some(subject_id) = &self.subject_id {
            filters.push(Filter::eq("subjectId", subject_id.as_str()));
        }
        if let Some(group_id) = &self.group_id {
            filters.push(Filter::eq("groupId", group_id.as_str()));
        }
        filters
    }
}

#[derive(Debug, Clone)]
pub struct CollectionRepository<S> {
    store: S,
    members: CounterMaintainer<S>,
    router: QueryRouter<S>,
}

impl<S: DocumentStore + Clone> CollectionRepository<S> {
    pub fn new(store: S, members: CounterMaintainer<S>) -> Self {
        Self {
            router: QueryRouter::new(store.clone()),
            store,
            members,
        }
    }

    pub fn collection() -> CollectionPath {
        CollectionPath::root(ResourceCollection::COLLECTION)
    }

    pub fn path(id: &str) -> DocPath {
        Self::collection().doc(id)
    }

    /// Creates a collection. Duplicate initial files are collapsed.
    pub async fn create(&self, mut collection: NewCollection) -> Result<String, RepositoryError> {
        require("teacherId", &collection.teacher_id)?;
        require("subjectId", &collection.subject_id)?;
        require("title", &collection.title)?;
        if let Some(group_id) = &collection.group_id {
            require("groupId", group_id)?;
        }

        let mut unique: Vec<FileRef> = Vec::with_capacity(collection.files.len());
        for file in collection.files.drain(..) {
            if !unique.contains(&file) {
                unique.push(file);
            }
        }
        collection.files = unique;

        let path = self
            .store
            .add(&Self::collection(), stamped(to_fields(&collection)?))
            .await?;
        tracing::info!(
            collection_id = path.id(),
            subject_id = %collection.subject_id,
            group_id = ?collection.group_id,
            "collection created"
        );
        Ok(path.id().to_string())
    }

    pub async fn get(&self, id: &str) -> Result<ResourceCollection, RepositoryError> {
        fetch(&self.store, &Self::path(id)).await
    }

    pub async fn query(&self, filter: &CollectionFilter) -> Result<Vec<ResourceCollection>, RepositoryError> {
        let query = Query::new(Self::collection()).filters(filter.filters());
        self.router.run(&query).await
    }

    /// Collections a group sees for a subject: those scoped to the group
    /// plus the global ones, newest first.
    pub async fn visible_to(&self, subject_id: &str, group_id: &str) -> Result<Vec<ResourceCollection>, RepositoryError> {
        let query = Query::new(Self::collection())
            .eq("subjectId", subject_id)
            .any_of("groupId", [Value::from(group_id), Value::Null]);
        self.router.run(&query).await
    }

    pub async fn update(&self, id: &str, changes: CollectionPatch) -> Result<(), RepositoryError> {
        let mut patch = Patch::new();
        if let Some(title) = changes.title {
            require("title", &title)?;
            patch = patch.set("title", title);
        }
        match changes.group_id {
            Some(Some(group_id)) => {
                require("groupId", &group_id)?;
                patch = patch.set("groupId", group_id);
            }
            Some(None) => patch = patch.set("groupId", Value::Null),
            None => {}
        }

        let path = Self::path(id);
        self.store
            .update(&path, patch.server_timestamp(UPDATED_AT))
            .await
            .map_err(missing_at(&path))
    }

    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.store.delete(&Self::path(id)).await?;
        tracing::info!(collection_id = id, "collection deleted");
        Ok(())
    }

    /// Adds a file unless an identical entry is already present.
    pub async fn add_file(&self, id: &str, file: &FileRef) -> Result<(), RepositoryError> {
        require("url", &file.url)?;
        let path = Self::path(id);
        self.members
            .add_member(&path, FILES, file)
            .await
            .map_err(|err| not_found_for(err, &path))
    }

    /// Removes every entry identical to `file`.
    pub async fn remove_file(&self, id: &str, file: &FileRef) -> Result<(), RepositoryError> {
        let path = Self::path(id);
        self.members
            .remove_member(&path, FILES, file)
            .await
            .map_err(|err| not_found_for(err, &path))
    }

    pub async fn replace_file(&self, id: &str, old: &FileRef, new: &FileRef) -> Result<(), RepositoryError> {
        require("url", &new.url)?;
        let path = Self::path(id);
        self.members
            .replace_member(&path, FILES, old, new)
            .await
            .map_err(|err| not_found_for(err, &path))
    }
}
