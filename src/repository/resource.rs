use crate::blob::{blob_path, BlobStore, ProgressFn};
use crate::document::{to_fields, Timestamp};
use crate::entities::{LessonType, NewResource, Resource, ResourceDraft, ResourcePatch};
use crate::query::{distinct_labeled, LabeledValue, Query, QueryRouter};
use crate::signals::{OrphanBlob, Signals};
use crate::store::{CollectionPath, DocPath, DocumentStore, Filter, Patch};
use crate::Document;

use super::{fetch, missing_at, require, stamped, RepositoryError, UPDATED_AT};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceFilter {
    pub group_id: Option<String>,
    pub subject_id: Option<String>,
    pub teacher_id: Option<String>,
    pub lesson_type: Option<LessonType>,
}

impl ResourceFilter {
    pub fn group(group_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            ..Self::default()
        }
    }

    pub fn teacher(teacher_id: impl Into<String>) -> Self {
        Self {
            teacher_id: Some(teacher_id.into()),
            ..Self::default()
        }
    }

    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(group_id) = &self.group_id {
            filters.push(Filter::eq("groupId", group_id.as_str()));
        }
        if let Some(subject_id) = &self.subject_id {
            filters.push(Filter::eq("subjectId", subject_id.as_str()));
        }
        if let Some(teacher_id) = &self.teacher_id {
            filters.push(Filter::eq("teacherId", teacher_id.as_str()));
        }
        if let Some(lesson_type) = self.lesson_type {
            filters.push(Filter::eq("lessonType", lesson_type.as_str()));
        }
        filters
    }
}

/// Resource metadata in `resources`, with the file itself in the blob store.
#[derive(Debug, Clone)]
pub struct ResourceRepository<S, B> {
    store: S,
    blobs: B,
    router: QueryRouter<S>,
    signals: Signals,
    domain: String,
}

impl<S, B> ResourceRepository<S, B>
where
    S: DocumentStore + Clone,
    B: BlobStore,
{
    pub fn new(store: S, blobs: B) -> Self {
        Self {
            router: QueryRouter::new(store.clone()),
            store,
            blobs,
            signals: Signals::new(),
            domain: "resources".to_string(),
        }
    }

    pub fn with_signals(mut self, signals: Signals) -> Self {
        self.signals = signals;
        self
    }

    /// Top-level blob path segment for uploads.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn collection() -> CollectionPath {
        CollectionPath::root(Resource::COLLECTION)
    }

    pub fn path(id: &str) -> DocPath {
        Self::collection().doc(id)
    }

    pub async fn create(&self, resource: NewResource) -> Result<String, RepositoryError> {
        validate(&resource.draft)?;
        require("fileUrl", &resource.file_url)?;

        let path = self
            .store
            .add(&Self::collection(), stamped(to_fields(&resource)?))
            .await?;
        tracing::info!(
            resource_id = path.id(),
            group_id = %resource.draft.group_id,
            teacher_id = %resource.draft.teacher_id,
            "resource created"
        );
        Ok(path.id().to_string())
    }

    /// Uploads the file, then writes the metadata document.
    ///
    /// A metadata failure after a successful upload leaves the blob
    /// unreferenced; it is reported as an orphan and the write error returned.
    pub async fn upload(
        &self,
        draft: ResourceDraft,
        file_name: &str,
        bytes: Vec<u8>,
        on_progress: Option<&ProgressFn>,
    ) -> Result<String, RepositoryError> {
        validate(&draft)?;
        require("fileName", file_name)?;

        let path = blob_path(&self.domain, &draft.teacher_id, Timestamp::now(), file_name);
        let file_size = bytes.len() as u64;
        let file_url = self
            .blobs
            .upload(&path, bytes, on_progress)
            .await
            .map_err(RepositoryError::upload)?;

        let owner_id = draft.teacher_id.clone();
        let created = self
            .create(NewResource {
                draft,
                file_url: file_url.clone(),
                file_name: file_name.to_string(),
                file_size,
            })
            .await;

        if let Err(err) = &created {
            self.signals.orphan_blob(OrphanBlob {
                url: file_url,
                owner_id,
                reason: err.to_string(),
            });
        }
        created
    }

    pub async fn get(&self, id: &str) -> Result<Resource, RepositoryError> {
        fetch(&self.store, &Self::path(id)).await
    }

    /// Resources matching the filter, newest first.
    pub async fn query(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, RepositoryError> {
        let query = Query::new(Self::collection()).filters(filter.filters());
        self.router.run(&query).await
    }

    pub async fn for_group(&self, group_id: &str) -> Result<Vec<Resource>, RepositoryError> {
        self.query(&ResourceFilter::group(group_id)).await
    }

    /// Distinct teachers across the resources matching `scope`, labeled
    /// with their display names.
    pub async fn teachers(&self, scope: &ResourceFilter) -> Result<Vec<LabeledValue>, RepositoryError> {
        let resources = self.query(scope).await?;
        Ok(distinct_labeled(
            &resources,
            |r| Some(r.teacher_id.as_str()),
            |r| r.teacher_name.as_deref(),
        ))
    }

    /// Distinct subjects across the resources matching `scope`.
    pub async fn subjects(&self, scope: &ResourceFilter) -> Result<Vec<LabeledValue>, RepositoryError> {
        let resources = self.query(scope).await?;
        Ok(distinct_labeled(
            &resources,
            |r| Some(r.subject_id.as_str()),
            |r| r.subject_name.as_deref(),
        ))
    }

    pub async fn update(&self, id: &str, changes: ResourcePatch) -> Result<(), RepositoryError> {
        let mut patch = Patch::new();
        if let Some(title) = changes.title {
            require("title", &title)?;
            patch = patch.set("title", title);
        }
        if let Some(lesson_type) = changes.lesson_type {
            patch = patch.set("lessonType", lesson_type.as_str());
        }
        if let Some(description) = changes.description {
            patch = patch.set("description", description);
        }
        if let Some(group_id) = changes.group_id {
            require("groupId", &group_id)?;
            patch = patch.set("groupId", group_id);
        }
        if let Some(subject_id) = changes.subject_id {
            require("subjectId", &subject_id)?;
            patch = patch.set("subjectId", subject_id);
        }

        let path = Self::path(id);
        self.store
            .update(&path, patch.server_timestamp(UPDATED_AT))
            .await
            .map_err(missing_at(&path))
    }

    /// Deletes the metadata, then the file. A file that cannot be removed
    /// is reported as an orphan; the delete itself still succeeds.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let path = Self::path(id);
        let Some(snapshot) = self.store.get(&path).await? else {
            return Ok(());
        };
        let file_url = snapshot
            .data
            .get("fileUrl")
            .and_then(|url| url.as_str())
            .map(str::to_string);
        let owner_id = snapshot
            .data
            .get("teacherId")
            .and_then(|id| id.as_str())
            .unwrap_or_default()
            .to_string();

        self.store.delete(&path).await?;
        tracing::info!(resource_id = id, "resource deleted");

        if let Some(url) = file_url.filter(|url| !url.is_empty()) {
            if let Err(err) = self.blobs.delete(&url).await {
                self.signals.orphan_blob(OrphanBlob {
                    url,
                    owner_id,
                    reason: err.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn validate(draft: &ResourceDraft) -> Result<(), RepositoryError> {
    require("groupId", &draft.group_id)?;
    require("subjectId", &draft.subject_id)?;
    require("teacherId", &draft.teacher_id)?;
    require("title", &draft.title)
}
