#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver};
use std::sync::{Mutex, Once};
use std::time::Duration;

use edu_portal::{
    InMemoryBlobStore, InMemoryDocumentStore, LessonType, NewLesson, Portal, PortalConfig, ResourceDraft,
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

pub type TestPortal = Portal<InMemoryDocumentStore, InMemoryBlobStore>;

pub struct Harness {
    pub store: InMemoryDocumentStore,
    pub blobs: InMemoryBlobStore,
    pub portal: TestPortal,
}

pub fn harness() -> Harness {
    harness_with(PortalConfig::default())
}

pub fn harness_with(config: PortalConfig) -> Harness {
    init_tracing();
    let store = InMemoryDocumentStore::new();
    let blobs = InMemoryBlobStore::new();
    let portal = Portal::new(store.clone(), blobs.clone(), config);
    Harness { store, blobs, portal }
}

/// Funnels signals from emitter threads back to the test.
pub fn channel<T: Send + 'static>() -> (impl Fn(T) + Send + Sync + 'static, Receiver<T>) {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let listener = move |signal: T| {
        if let Ok(tx) = tx.lock() {
            let _ = tx.send(signal);
        }
    };
    (listener, rx)
}

pub fn received<T>(rx: &Receiver<T>) -> T {
    rx.recv_timeout(Duration::from_secs(2))
        .expect("signal was not delivered")
}

pub fn lesson(title: &str) -> NewLesson {
    NewLesson {
        subject: "biology".into(),
        title: title.into(),
        ..NewLesson::default()
    }
}

pub fn draft(group: &str) -> ResourceDraft {
    ResourceDraft {
        group_id: group.into(),
        subject_id: "biology".into(),
        teacher_id: String::new(),
        title: "Cell diagram".into(),
        lesson_type: LessonType::Practice,
        description: None,
        teacher_name: Some("Dr. Green".into()),
        subject_name: Some("Biology".into()),
        group_name: Some(group.into()),
    }
}
