//! Portal - the four repositories over one store, with audience views.
//!
//! Views return [`Outcome`]s. Every failed operation is reported to
//! [`Signals`] before the outcome is handed back.
//!
//! ## Example
//!
//! ```ignore
//! let portal = Portal::new(store, blobs, PortalConfig::default());
//! portal.signals().on_access_denied(|signal| show_banner(&signal.notice));
//!
//! let visible = portal.student("s1", "G1").collections("physics").await;
//! if let Some(notice) = visible.notice() { /* ... */ }
//! ```

mod views;

use std::future::Future;

use crate::blob::BlobStore;
use crate::config::PortalConfig;
use crate::counter::CounterMaintainer;
use crate::repository::{
    CollectionRepository, CommentRepository, LessonRepository, Outcome, RepositoryError, ResourceRepository,
};
use crate::signals::Signals;
use crate::store::DocumentStore;

pub use views::{AdminView, StudentView, TeacherView};

pub struct Portal<S, B> {
    lessons: LessonRepository<S>,
    comments: CommentRepository<S>,
    resources: ResourceRepository<S, B>,
    collections: CollectionRepository<S>,
    signals: Signals,
    config: PortalConfig,
}

impl<S, B> Portal<S, B>
where
    S: DocumentStore + Clone,
    B: BlobStore,
{
    pub fn new(store: S, blobs: B, config: PortalConfig) -> Self {
        let signals = Signals::new();
        let counters = CounterMaintainer::new(store.clone())
            .with_strategies(config.counter_strategy, config.replace_strategy);

        tracing::info!(
            counter_strategy = ?config.counter_strategy,
            replace_strategy = ?config.replace_strategy,
            cascade_comments = config.cascade_comments,
            "portal ready"
        );

        Self {
            lessons: LessonRepository::new(store.clone(), counters.clone()).with_cascade(config.cascade_comments),
            comments: CommentRepository::new(store.clone(), counters.clone()),
            resources: ResourceRepository::new(store.clone(), blobs)
                .with_signals(signals.clone())
                .with_domain(config.blobs.resources.clone()),
            collections: CollectionRepository::new(store, counters),
            signals,
            config,
        }
    }

    pub fn lessons(&self) -> &LessonRepository<S> {
        &self.lessons
    }

    pub fn comments(&self) -> &CommentRepository<S> {
        &self.comments
    }

    pub fn resources(&self) -> &ResourceRepository<S, B> {
        &self.resources
    }

    pub fn collections(&self) -> &CollectionRepository<S> {
        &self.collections
    }

    /// Listener registration point. Clones share listeners.
    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Awaits `work` and converts its result, reporting any failure.
    pub async fn run<T, F>(&self, operation: &str, work: F) -> Outcome<T>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        match work.await {
            Ok(data) => Outcome::ok(data),
            Err(err) => {
                self.signals.report(operation, &err);
                Outcome::failed(&err)
            }
        }
    }

    pub fn admin(&self, admin_id: &str) -> AdminView<'_, S, B> {
        AdminView::new(self, admin_id)
    }

    pub fn teacher(&self, teacher_id: &str) -> TeacherView<'_, S, B> {
        TeacherView::new(self, teacher_id)
    }

    pub fn student(&self, student_id: &str, group_id: &str) -> StudentView<'_, S, B> {
        StudentView::new(self, student_id, group_id)
    }
}
