use crate::blob::BlobStore;
use crate::entities::{
    Actor, CollectionPatch, Comment, FileRef, Lesson, LessonPatch, NewCollection, NewComment, NewLesson, NewReply,
    Reply, Resource, ResourceCollection, ResourceDraft, Role,
};
use crate::query::LabeledValue;
use crate::repository::{CollectionFilter, LessonFilter, Outcome, RepositoryError, ResourceFilter};
use crate::store::DocumentStore;

use super::Portal;

fn forbidden(actor: &str, what: &str, id: &str) -> RepositoryError {
    RepositoryError::Forbidden(format!("{} does not own {} {}", actor, what, id))
}

/// Unrestricted access, for administrators.
pub struct AdminView<'a, S, B> {
    portal: &'a Portal<S, B>,
    actor: Actor,
}

impl<'a, S, B> AdminView<'a, S, B>
where
    S: DocumentStore + Clone,
    B: BlobStore,
{
    pub(super) fn new(portal: &'a Portal<S, B>, admin_id: &str) -> Self {
        Self {
            portal,
            actor: Actor::new(admin_id, Role::Admin),
        }
    }

    pub async fn lessons(&self, filter: &LessonFilter) -> Outcome<Vec<Lesson>> {
        self.portal
            .run("admin.lessons", self.portal.lessons().query(filter))
            .await
    }

    pub async fn resources(&self, filter: &ResourceFilter) -> Outcome<Vec<Resource>> {
        self.portal
            .run("admin.resources", self.portal.resources().query(filter))
            .await
    }

    pub async fn collections(&self, filter: &CollectionFilter) -> Outcome<Vec<ResourceCollection>> {
        self.portal
            .run("admin.collections", self.portal.collections().query(filter))
            .await
    }

    pub async fn delete_lesson(&self, lesson_id: &str) -> Outcome<()> {
        self.portal
            .run("admin.delete_lesson", self.portal.lessons().delete(lesson_id))
            .await
    }

    pub async fn delete_resource(&self, resource_id: &str) -> Outcome<()> {
        self.portal
            .run("admin.delete_resource", self.portal.resources().delete(resource_id))
            .await
    }

    pub async fn delete_comment(&self, lesson_id: &str, comment_id: &str) -> Outcome<()> {
        self.portal
            .run(
                "admin.delete_comment",
                self.portal.comments().delete(lesson_id, comment_id, &self.actor),
            )
            .await
    }

    /// Recomputes a lesson's comment count, returning the live count.
    pub async fn recount_comments(&self, lesson_id: &str) -> Outcome<u64> {
        self.portal
            .run("admin.recount_comments", async {
                let reconciled = self.portal.comments().recount(lesson_id).await?;
                Ok::<_, RepositoryError>(reconciled.actual)
            })
            .await
    }

    pub async fn reset_views(&self, lesson_id: &str) -> Outcome<()> {
        self.portal
            .run("admin.reset_views", self.portal.lessons().reset_views(lesson_id))
            .await
    }
}

/// A teacher's own lessons, resources and collections. Writes to another
/// teacher's documents are refused.
pub struct TeacherView<'a, S, B> {
    portal: &'a Portal<S, B>,
    actor: Actor,
}

impl<'a, S, B> TeacherView<'a, S, B>
where
    S: DocumentStore + Clone,
    B: BlobStore,
{
    pub(super) fn new(portal: &'a Portal<S, B>, teacher_id: &str) -> Self {
        Self {
            portal,
            actor: Actor::new(teacher_id, Role::Teacher),
        }
    }

    fn id(&self) -> &str {
        &self.actor.id
    }

    async fn owned_lesson(&self, lesson_id: &str) -> Result<Lesson, RepositoryError> {
        let lesson = self.portal.lessons().get(lesson_id).await?;
        if lesson.teacher_id != self.id() {
            return Err(forbidden(self.id(), "lesson", lesson_id));
        }
        Ok(lesson)
    }

    async fn owned_collection(&self, collection_id: &str) -> Result<ResourceCollection, RepositoryError> {
        let collection = self.portal.collections().get(collection_id).await?;
        if collection.teacher_id != self.id() {
            return Err(forbidden(self.id(), "collection", collection_id));
        }
        Ok(collection)
    }

    pub async fn lessons(&self) -> Outcome<Vec<Lesson>> {
        self.portal
            .run(
                "teacher.lessons",
                self.portal.lessons().query(&LessonFilter::teacher(self.id())),
            )
            .await
    }

    pub async fn create_lesson(&self, mut lesson: NewLesson) -> Outcome<String> {
        lesson.teacher_id = self.id().to_string();
        self.portal
            .run("teacher.create_lesson", self.portal.lessons().create(lesson))
            .await
    }

    pub async fn update_lesson(&self, lesson_id: &str, changes: LessonPatch) -> Outcome<()> {
        self.portal
            .run("teacher.update_lesson", async {
                self.owned_lesson(lesson_id).await?;
                self.portal.lessons().update(lesson_id, changes).await
            })
            .await
    }

    pub async fn delete_lesson(&self, lesson_id: &str) -> Outcome<()> {
        self.portal
            .run("teacher.delete_lesson", async {
                self.owned_lesson(lesson_id).await?;
                self.portal.lessons().delete(lesson_id).await
            })
            .await
    }

    pub async fn attach_resource(&self, lesson_id: &str, file: FileRef) -> Outcome<()> {
        self.portal
            .run("teacher.attach_resource", async {
                self.owned_lesson(lesson_id).await?;
                self.portal.lessons().attach_resource(lesson_id, &file).await
            })
            .await
    }

    pub async fn detach_resource(&self, lesson_id: &str, file: FileRef) -> Outcome<()> {
        self.portal
            .run("teacher.detach_resource", async {
                self.owned_lesson(lesson_id).await?;
                self.portal.lessons().detach_resource(lesson_id, &file).await
            })
            .await
    }

    pub async fn resources(&self) -> Outcome<Vec<Resource>> {
        self.portal
            .run(
                "teacher.resources",
                self.portal.resources().query(&ResourceFilter::teacher(self.id())),
            )
            .await
    }

    pub async fn upload_resource(&self, mut draft: ResourceDraft, file_name: &str, bytes: Vec<u8>) -> Outcome<String> {
        draft.teacher_id = self.id().to_string();
        self.portal
            .run(
                "teacher.upload_resource",
                self.portal.resources().upload(draft, file_name, bytes, None),
            )
            .await
    }

    pub async fn delete_resource(&self, resource_id: &str) -> Outcome<()> {
        self.portal
            .run("teacher.delete_resource", async {
                let resource = self.portal.resources().get(resource_id).await?;
                if resource.teacher_id != self.id() {
                    return Err(forbidden(self.id(), "resource", resource_id));
                }
                self.portal.resources().delete(resource_id).await
            })
            .await
    }

    pub async fn collections(&self) -> Outcome<Vec<ResourceCollection>> {
        let mine = CollectionFilter {
            teacher_id: Some(self.id().to_string()),
            ..CollectionFilter::default()
        };
        self.portal
            .run("teacher.collections", self.portal.collections().query(&mine))
            .await
    }

    pub async fn create_collection(&self, mut collection: NewCollection) -> Outcome<String> {
        collection.teacher_id = self.id().to_string();
        self.portal
            .run("teacher.create_collection", self.portal.collections().create(collection))
            .await
    }

    pub async fn update_collection(&self, collection_id: &str, changes: CollectionPatch) -> Outcome<()> {
        self.portal
            .run("teacher.update_collection", async {
                self.owned_collection(collection_id).await?;
                self.portal.collections().update(collection_id, changes).await
            })
            .await
    }

    pub async fn delete_collection(&self, collection_id: &str) -> Outcome<()> {
        self.portal
            .run("teacher.delete_collection", async {
                self.owned_collection(collection_id).await?;
                self.portal.collections().delete(collection_id).await
            })
            .await
    }

    pub async fn add_file(&self, collection_id: &str, file: FileRef) -> Outcome<()> {
        self.portal
            .run("teacher.add_file", async {
                self.owned_collection(collection_id).await?;
                self.portal.collections().add_file(collection_id, &file).await
            })
            .await
    }

    pub async fn remove_file(&self, collection_id: &str, file: FileRef) -> Outcome<()> {
        self.portal
            .run("teacher.remove_file", async {
                self.owned_collection(collection_id).await?;
                self.portal.collections().remove_file(collection_id, &file).await
            })
            .await
    }

    pub async fn replace_file(&self, collection_id: &str, old: FileRef, new: FileRef) -> Outcome<()> {
        self.portal
            .run("teacher.replace_file", async {
                self.owned_collection(collection_id).await?;
                self.portal.collections().replace_file(collection_id, &old, &new).await
            })
            .await
    }

    pub async fn reply(&self, lesson_id: &str, comment_id: &str, content: &str) -> Outcome<Reply> {
        let reply = NewReply {
            author_id: self.id().to_string(),
            author_role: Role::Teacher,
            content: content.to_string(),
        };
        self.portal
            .run("teacher.reply", self.portal.comments().reply(lesson_id, comment_id, reply))
            .await
    }

    pub async fn delete_comment(&self, lesson_id: &str, comment_id: &str) -> Outcome<()> {
        self.portal
            .run(
                "teacher.delete_comment",
                self.portal.comments().delete(lesson_id, comment_id, &self.actor),
            )
            .await
    }
}

/// What a student in one group sees.
pub struct StudentView<'a, S, B> {
    portal: &'a Portal<S, B>,
    actor: Actor,
    group_id: String,
}

impl<'a, S, B> StudentView<'a, S, B>
where
    S: DocumentStore + Clone,
    B: BlobStore,
{
    pub(super) fn new(portal: &'a Portal<S, B>, student_id: &str, group_id: &str) -> Self {
        Self {
            portal,
            actor: Actor::new(student_id, Role::Student),
            group_id: group_id.to_string(),
        }
    }

    fn scope(&self) -> ResourceFilter {
        ResourceFilter::group(self.group_id.as_str())
    }

    pub async fn lessons(&self, subject: &str) -> Outcome<Vec<Lesson>> {
        let filter = LessonFilter {
            subject: Some(subject.to_string()),
            ..LessonFilter::default()
        };
        self.portal
            .run("student.lessons", self.portal.lessons().query(&filter))
            .await
    }

    /// Counts a view, then returns the lesson as it stands after the view.
    pub async fn open_lesson(&self, lesson_id: &str) -> Outcome<Lesson> {
        self.portal
            .run("student.open_lesson", async {
                self.portal.lessons().record_view(lesson_id).await?;
                self.portal.lessons().get(lesson_id).await
            })
            .await
    }

    pub async fn resources(&self) -> Outcome<Vec<Resource>> {
        self.portal
            .run("student.resources", self.portal.resources().for_group(&self.group_id))
            .await
    }

    pub async fn teachers(&self) -> Outcome<Vec<LabeledValue>> {
        let scope = self.scope();
        self.portal
            .run("student.teachers", self.portal.resources().teachers(&scope))
            .await
    }

    pub async fn subjects(&self) -> Outcome<Vec<LabeledValue>> {
        let scope = self.scope();
        self.portal
            .run("student.subjects", self.portal.resources().subjects(&scope))
            .await
    }

    /// Collections for a subject scoped to this group or to every group.
    pub async fn collections(&self, subject_id: &str) -> Outcome<Vec<ResourceCollection>> {
        self.portal
            .run(
                "student.collections",
                self.portal.collections().visible_to(subject_id, &self.group_id),
            )
            .await
    }

    pub async fn comments(&self, lesson_id: &str) -> Outcome<Vec<Comment>> {
        self.portal
            .run("student.comments", self.portal.comments().list(lesson_id))
            .await
    }

    pub async fn comment(&self, lesson_id: &str, content: &str) -> Outcome<String> {
        let comment = NewComment {
            author_id: self.actor.id.clone(),
            author_role: Role::Student,
            content: content.to_string(),
        };
        self.portal
            .run("student.comment", self.portal.comments().add(lesson_id, comment))
            .await
    }

    pub async fn reply(&self, lesson_id: &str, comment_id: &str, content: &str) -> Outcome<Reply> {
        let reply = NewReply {
            author_id: self.actor.id.clone(),
            author_role: Role::Student,
            content: content.to_string(),
        };
        self.portal
            .run("student.reply", self.portal.comments().reply(lesson_id, comment_id, reply))
            .await
    }

    pub async fn delete_comment(&self, lesson_id: &str, comment_id: &str) -> Outcome<()> {
        self.portal
            .run(
                "student.delete_comment",
                self.portal.comments().delete(lesson_id, comment_id, &self.actor),
            )
            .await
    }
}
