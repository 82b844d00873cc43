//! Education-portal data layer over a schemaless document store.
//!
//! Typed repositories for lessons, comments, resources and resource
//! collections; logical queries the store cannot express natively, merged and
//! ordered client-side; and maintenance of the denormalized counters and
//! member arrays that summarize child documents on their parents.

extern crate self as edu_portal;

pub mod blob;
pub mod classify;
pub mod config;
pub mod counter;
pub mod document;
pub mod entities;
pub mod portal;
pub mod query;
pub mod repository;
pub mod signals;
pub mod store;

pub use blob::{blob_path, BlobStore, InMemoryBlobStore, UploadProgress};
pub use classify::{classify, ErrorCode, ACCESS_DENIED_NOTICE};
pub use config::PortalConfig;
pub use counter::{CounterMaintainer, CounterStrategy, Reconciled, ReplaceStrategy};
pub use document::{count, timestamp, Document, Timestamp};
pub use entities::{
    Actor, CollectionPatch, Comment, FileRef, Lesson, LessonPatch, LessonType, NewCollection, NewComment, NewLesson,
    NewReply, NewResource, Reply, Resource, ResourceCollection, ResourceDraft, ResourcePatch, Role,
};
pub use portal::Portal;
pub use query::{union_by_identity, Direction, OrderBy, Query, QueryRouter};
pub use repository::{
    CollectionFilter, CollectionRepository, CommentRepository, LessonFilter, LessonRepository, Notice, Outcome,
    RepositoryError, ResourceFilter, ResourceRepository,
};
pub use signals::Signals;
pub use store::{
    CollectionPath, DocPath, DocumentStore, FieldOp, Filter, InMemoryDocumentStore, Patch, Snapshot, StoreError,
    StoreOp,
};

// Derive macro for `Document`
pub use edu_portal_macros::Document;
