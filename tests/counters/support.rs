#![allow(dead_code)]

use std::sync::Once;

use edu_portal::{
    CommentRepository, CounterMaintainer, CounterStrategy, InMemoryDocumentStore, LessonRepository, NewComment,
    NewLesson, ReplaceStrategy, Role,
};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub struct Classroom {
    pub store: InMemoryDocumentStore,
    pub lessons: LessonRepository<InMemoryDocumentStore>,
    pub comments: CommentRepository<InMemoryDocumentStore>,
}

impl Classroom {
    pub fn new(store: InMemoryDocumentStore, strategy: CounterStrategy) -> Self {
        init_tracing();
        let counters = CounterMaintainer::new(store.clone()).with_strategies(strategy, ReplaceStrategy::Atomic);
        Self {
            lessons: LessonRepository::new(store.clone(), counters.clone()),
            comments: CommentRepository::new(store.clone(), counters),
            store,
        }
    }

    pub async fn lesson(&self) -> String {
        self.lessons
            .create(NewLesson {
                teacher_id: "teacher-1".into(),
                subject: "chemistry".into(),
                title: "Titration".into(),
                ..NewLesson::default()
            })
            .await
            .unwrap()
    }

    pub async fn comment(&self, lesson_id: &str, author: &str) -> String {
        self.comments
            .add(
                lesson_id,
                NewComment {
                    author_id: author.into(),
                    author_role: Role::Student,
                    content: format!("question from {}", author),
                },
            )
            .await
            .unwrap()
    }

    pub async fn comments_count(&self, lesson_id: &str) -> u64 {
        self.lessons.get(lesson_id).await.unwrap().comments_count
    }

    pub async fn views_count(&self, lesson_id: &str) -> u64 {
        self.lessons.get(lesson_id).await.unwrap().views_count
    }
}
