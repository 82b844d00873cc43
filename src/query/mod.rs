//! Query routing - logical queries the store cannot express natively.
//!
//! The store only answers conjunctive equality queries within one collection.
//! A logical predicate such as `subjectId == S AND (groupId == G OR groupId == null)`
//! is lowered into one native query per alternative, the native queries run
//! concurrently, and the results are merged client-side: deduplicated by
//! document identity, then ordered.
//!
//! ## Example
//!
//! ```ignore
//! use edu_portal::query::{Direction, OrderBy, Query, QueryRouter};
//!
//! let query = Query::new(CollectionPath::root("resourceCollections"))
//!     .eq("subjectId", "S1")
//!     .any_of("groupId", [json!("G1"), Value::Null])
//!     .order_by(OrderBy::CreatedAt(Direction::Descending));
//!
//! let visible: Vec<ResourceCollection> = QueryRouter::new(store).run(&query).await?;
//! ```

mod distinct;
mod merge;
mod router;

pub use distinct::{distinct_labeled, distinct_values, LabeledValue};
pub use merge::{order, sort_by_timestamp, union_by_identity, Direction, OrderBy};
pub use router::{decode_all, Query, QueryRouter};
