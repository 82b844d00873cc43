use futures::future::try_join_all;
use uuid::Uuid;

use crate::counter::{CounterMaintainer, Reconciled};
use crate::document::{to_fields, Timestamp};
use crate::entities::{Actor, Comment, Lesson, NewComment, NewReply, Reply};
use crate::query::{Query, QueryRouter};
use crate::store::{CollectionPath, DocPath, DocumentStore, Patch};
use crate::Document;

use super::lesson::{lesson_path, COMMENTS_COUNT};
use super::{fetch, missing_at, not_found_at, not_found_for, require, RepositoryError, CREATED_AT};

const REPLIES: &str = "replies";

fn comments_of(lesson: &DocPath) -> CollectionPath {
    lesson.collection(Comment::COLLECTION)
}

/// Deletes every comment under a lesson concurrently. Returns how many
/// there were.
pub(crate) async fn delete_comments<S>(store: &S, lesson: &DocPath) -> Result<usize, RepositoryError>
where
    S: DocumentStore + ?Sized,
{
    let comments = comments_of(lesson);
    let paths: Vec<DocPath> = store
        .query(&comments, &[])
        .await?
        .iter()
        .map(|snapshot| comments.doc(&snapshot.id))
        .collect();

    try_join_all(paths.iter().map(|path| store.delete(path))).await?;
    Ok(paths.len())
}

/// Number of comment documents currently stored under a lesson.
pub(crate) async fn live_comments<S>(store: &S, lesson: &DocPath) -> Result<u64, RepositoryError>
where
    S: DocumentStore + ?Sized,
{
    Ok(store.query(&comments_of(lesson), &[]).await?.len() as u64)
}

/// Comments live under `lessons/{lessonId}/comments`. Every create and
/// delete keeps the lesson's `commentsCount` in step.
#[derive(Debug, Clone)]
pub struct CommentRepository<S> {
    store: S,
    counters: CounterMaintainer<S>,
    router: QueryRouter<S>,
}

impl<S: DocumentStore + Clone> CommentRepository<S> {
    pub fn new(store: S, counters: CounterMaintainer<S>) -> Self {
        Self {
            router: QueryRouter::new(store.clone()),
            store,
            counters,
        }
    }

    pub fn path(lesson_id: &str, comment_id: &str) -> DocPath {
        comments_of(&lesson_path(lesson_id)).doc(comment_id)
    }

    pub async fn add(&self, lesson_id: &str, comment: NewComment) -> Result<String, RepositoryError> {
        require("authorId", &comment.author_id)?;
        require("content", &comment.content)?;

        let lesson = lesson_path(lesson_id);
        if self.store.get(&lesson).await?.is_none() {
            return Err(not_found_at(&lesson));
        }

        let mut fields = to_fields(&comment)?;
        fields.insert(CREATED_AT.to_string(), Timestamp::now().to_value());
        fields.insert(REPLIES.to_string(), serde_json::Value::Array(Vec::new()));
        let path = self.store.add(&comments_of(&lesson), fields).await?;

        if let Err(err) = self.counters.adjust(&lesson, COMMENTS_COUNT, 1).await {
            match self.store.delete(&path).await {
                Ok(()) => tracing::warn!(%path, error = %err, "comment count update failed, comment removed"),
                Err(undo) => tracing::error!(
                    %path,
                    error = %err,
                    %undo,
                    "comment count update failed and comment could not be removed"
                ),
            }
            return Err(not_found_for(err, &lesson));
        }

        tracing::info!(lesson_id, comment_id = path.id(), author_id = %comment.author_id, "comment added");
        Ok(path.id().to_string())
    }

    pub async fn get(&self, lesson_id: &str, comment_id: &str) -> Result<Comment, RepositoryError> {
        let mut comment: Comment = fetch(&self.store, &Self::path(lesson_id, comment_id)).await?;
        comment.lesson_id = lesson_id.to_string();
        Ok(comment)
    }

    /// Comments on a lesson, newest first.
    pub async fn list(&self, lesson_id: &str) -> Result<Vec<Comment>, RepositoryError> {
        let query = Query::new(comments_of(&lesson_path(lesson_id)));
        let mut comments: Vec<Comment> = self.router.run(&query).await?;
        for comment in &mut comments {
            comment.lesson_id = lesson_id.to_string();
        }
        Ok(comments)
    }

    /// Deletes a comment. Only its author, the lesson's teacher or an admin
    /// may do so.
    pub async fn delete(&self, lesson_id: &str, comment_id: &str, actor: &Actor) -> Result<(), RepositoryError> {
        let comment = self.get(lesson_id, comment_id).await?;
        let lesson = lesson_path(lesson_id);

        if !actor.is_admin() && actor.id != comment.author_id {
            let owner: Lesson = fetch(&self.store, &lesson).await?;
            if owner.teacher_id != actor.id {
                return Err(RepositoryError::Forbidden(format!(
                    "{} may not delete comment {}",
                    actor.id, comment_id
                )));
            }
        }

        self.counters
            .adjust(&lesson, COMMENTS_COUNT, -1)
            .await
            .map_err(|err| not_found_for(err, &lesson))?;

        let path = Self::path(lesson_id, comment_id);
        if let Err(err) = self.store.delete(&path).await {
            match self.counters.adjust(&lesson, COMMENTS_COUNT, 1).await {
                Ok(()) => tracing::warn!(%path, error = %err, "comment delete failed, count restored"),
                Err(undo) => tracing::error!(
                    %path,
                    error = %err,
                    %undo,
                    "comment delete failed and count could not be restored"
                ),
            }
            return Err(err.into());
        }

        tracing::info!(lesson_id, comment_id, actor_id = %actor.id, "comment deleted");
        Ok(())
    }

    /// Appends a reply to a comment's thread.
    pub async fn reply(&self, lesson_id: &str, comment_id: &str, reply: NewReply) -> Result<Reply, RepositoryError> {
        require("authorId", &reply.author_id)?;
        require("content", &reply.content)?;

        let reply = Reply {
            id: Uuid::new_v4().simple().to_string(),
            author_id: reply.author_id,
            author_role: reply.author_role,
            content: reply.content,
            created_at: Some(Timestamp::now()),
        };

        let path = Self::path(lesson_id, comment_id);
        self.store
            .update(&path, Patch::new().array_union(REPLIES, serde_json::to_value(&reply)?))
            .await
            .map_err(missing_at(&path))?;
        Ok(reply)
    }

    /// Number of live comment documents under a lesson.
    pub async fn count(&self, lesson_id: &str) -> Result<u64, RepositoryError> {
        live_comments(&self.store, &lesson_path(lesson_id)).await
    }

    /// Recomputes `commentsCount` from the live comments.
    pub async fn recount(&self, lesson_id: &str) -> Result<Reconciled, RepositoryError> {
        let actual = self.count(lesson_id).await?;
        let lesson = lesson_path(lesson_id);
        self.counters
            .reconcile(&lesson, COMMENTS_COUNT, actual)
            .await
            .map_err(|err| not_found_for(err, &lesson))
    }

    /// Deletes every comment under a lesson and zeroes its counter.
    pub async fn delete_all(&self, lesson_id: &str) -> Result<usize, RepositoryError> {
        let lesson = lesson_path(lesson_id);
        let removed = delete_comments(&self.store, &lesson).await?;
        self.counters
            .reset(&lesson, COMMENTS_COUNT)
            .await
            .map_err(|err| not_found_for(err, &lesson))?;
        Ok(removed)
    }
}
