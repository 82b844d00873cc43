use crate::counter::CounterMaintainer;
use crate::document::to_fields;
use crate::entities::{FileRef, Lesson, LessonPatch, NewLesson};
use crate::query::{Query, QueryRouter};
use crate::store::{CollectionPath, DocPath, DocumentStore, Filter, Patch};
use crate::Document;

use super::comment::{delete_comments, live_comments};
use super::{fetch, missing_at, not_found_for, require, stamped, RepositoryError, UPDATED_AT};

pub(crate) const VIEWS_COUNT: &str = "viewsCount";
pub(crate) const COMMENTS_COUNT: &str = "commentsCount";
const RESOURCES: &str = "resources";

pub(crate) fn lesson_path(id: &str) -> DocPath {
    CollectionPath::root(Lesson::COLLECTION).doc(id)
}

/// Equality filters over lessons. Unset fields are not constrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonFilter {
    pub teacher_id: Option<String>,
    pub subject: Option<String>,
}

impl LessonFilter {
    pub fn teacher(teacher_id: impl Into<String>) -> Self {
        Self {
            teacher_id: Some(teacher_id.into()),
            ..Self::default()
        }
    }

    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(teacher_id) = &self.teacher_id {
            filters.push(Filter::eq("teacherId", teacher_id.as_str()));
        }
        if let Some(subject) = &self.subject {
            filters.push(Filter::eq("subject", subject.as_str()));
        }
        filters
    }
}

#[derive(Debug, Clone)]
pub struct LessonRepository<S> {
    store: S,
    counters: CounterMaintainer<S>,
    router: QueryRouter<S>,
    cascade_comments: bool,
}

impl<S: DocumentStore + Clone> LessonRepository<S> {
    pub fn new(store: S, counters: CounterMaintainer<S>) -> Self {
        Self {
            router: QueryRouter::new(store.clone()),
            store,
            counters,
            cascade_comments: true,
        }
    }

    pub fn with_cascade(mut self, cascade_comments: bool) -> Self {
        self.cascade_comments = cascade_comments;
        self
    }

    pub fn collection() -> CollectionPath {
        CollectionPath::root(Lesson::COLLECTION)
    }

    pub fn path(id: &str) -> DocPath {
        lesson_path(id)
    }

    pub async fn create(&self, lesson: NewLesson) -> Result<String, RepositoryError> {
        require("teacherId", &lesson.teacher_id)?;
        require("subject", &lesson.subject)?;
        require("title", &lesson.title)?;

        let mut fields = stamped(to_fields(&lesson)?);
        fields.insert(VIEWS_COUNT.to_string(), 0.into());
        fields.insert(COMMENTS_COUNT.to_string(), 0.into());

        let path = self.store.add(&Self::collection(), fields).await?;
        tracing::info!(lesson_id = path.id(), teacher_id = %lesson.teacher_id, "lesson created");
        Ok(path.id().to_string())
    }

    pub async fn get(&self, id: &str) -> Result<Lesson, RepositoryError> {
        fetch(&self.store, &Self::path(id)).await
    }

    /// Lessons matching the filter, newest first.
    pub async fn query(&self, filter: &LessonFilter) -> Result<Vec<Lesson>, RepositoryError> {
        let query = Query::new(Self::collection()).filters(filter.filters());
        self.router.run(&query).await
    }

    pub async fn update(&self, id: &str, changes: LessonPatch) -> Result<(), RepositoryError> {
        let mut patch = Patch::new();
        if let Some(title) = changes.title {
            require("title", &title)?;
            patch = patch.set("title", title);
        }
        if let Some(subject) = changes.subject {
            require("subject", &subject)?;
            patch = patch.set("subject", subject);
        }
        if let Some(description) = changes.description {
            patch = patch.set("description", description);
        }

        let path = Self::path(id);
        self.store
            .update(&path, patch.server_timestamp(UPDATED_AT))
            .await
            .map_err(missing_at(&path))
    }

    /// Deletes the lesson. Its comments are deleted first unless cascading
    /// is switched off, in which case they are left behind and logged.
    ///
    /// If some comment deletes fail the lesson is kept and its
    /// `commentsCount` is recomputed from the comments that remain.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let path = Self::path(id);

        if self.cascade_comments {
            match delete_comments(&self.store, &path).await {
                Ok(removed) => tracing::debug!(lesson_id = id, removed, "lesson comments deleted"),
                Err(err) => {
                    self.recount_after_partial_cascade(&path).await;
                    return Err(err);
                }
            }
        } else {
            tracing::warn!(lesson_id = id, "deleting lesson without its comments");
        }

        self.store.delete(&path).await?;
        tracing::info!(lesson_id = id, "lesson deleted");
        Ok(())
    }

    async fn recount_after_partial_cascade(&self, path: &DocPath) {
        let recounted = match live_comments(&self.store, path).await {
            Ok(actual) => self.counters.reconcile(path, COMMENTS_COUNT, actual).await,
            Err(err) => Err(err),
        };
        match recounted {
            Ok(reconciled) => tracing::warn!(
                %path,
                previous = reconciled.previous,
                actual = reconciled.actual,
                "comment cascade failed, lesson kept"
            ),
            Err(err) => tracing::error!(%path, error = %err, "comment cascade failed and count could not be recomputed"),
        }
    }

    pub async fn record_view(&self, id: &str) -> Result<(), RepositoryError> {
        let path = Self::path(id);
        self.counters
            .adjust(&path, VIEWS_COUNT, 1)
            .await
            .map_err(|err| not_found_for(err, &path))
    }

    pub async fn reset_views(&self, id: &str) -> Result<(), RepositoryError> {
        let path = Self::path(id);
        self.counters
            .reset(&path, VIEWS_COUNT)
            .await
            .map_err(|err| not_found_for(err, &path))
    }

    pub async fn attach_resource(&self, id: &str, file: &FileRef) -> Result<(), RepositoryError> {
        require("url", &file.url)?;
        let path = Self::path(id);
        self.counters
            .add_member(&path, RESOURCES, file)
            .await
            .map_err(|err| not_found_for(err, &path))
    }

    /// Detaches a file. `file` must deep-equal the stored entry.
    pub async fn detach_resource(&self, id: &str, file: &FileRef) -> Result<(), RepositoryError> {
        let path = Self::path(id);
        self.counters
            .remove_member(&path, RESOURCES, file)
            .await
            .map_err(|err| not_found_for(err, &path))
    }
}
