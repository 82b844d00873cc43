use futures::future::try_join_all;
use serde_json::Value;

use super::merge::{order, union_by_identity, OrderBy};
use crate::document::{from_snapshot, Document};
use crate::repository::RepositoryError;
use crate::store::{CollectionPath, DocumentStore, Filter, Snapshot};

/// A logical query: fixed equality filters, zero or more disjunctions, and a
/// client-side ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: CollectionPath,
    fixed: Vec<Filter>,
    alternatives: Vec<(String, Vec<Value>)>,
    order_by: OrderBy,
}

impl Query {
    pub fn new(collection: CollectionPath) -> Self {
        Self {
            collection,
            fixed: Vec::new(),
            alternatives: Vec::new(),
            order_by: OrderBy::default(),
        }
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fixed.push(Filter::eq(field, value));
        self
    }

    /// Adds every filter of a list to the fixed part.
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.fixed.extend(filters);
        self
    }

    /// `field` equals any one of `values`. An empty list matches nothing.
    pub fn any_of<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.alternatives
            .push((field.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// The native equality queries this query lowers to: the fixed filters
    /// combined with every element of the cartesian product of alternatives.
    pub fn native_queries(&self) -> Vec<Vec<Filter>> {
        let mut plans = vec![self.fixed.clone()];

        for (field, values) in &self.alternatives {
            plans = plans
                .iter()
                .flat_map(|plan| {
                    values.iter().map(move |value| {
                        let mut next = plan.clone();
                        next.push(Filter::eq(field.clone(), value.clone()));
                        next
                    })
                })
                .collect();
        }

        plans
    }
}

/// Runs logical queries against a store.
#[derive(Debug, Clone)]
pub struct QueryRouter<S> {
    store: S,
}

impl<S: DocumentStore> QueryRouter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Issues every native query concurrently, then merges and orders.
    ///
    /// Any native failure fails the whole query; partial results are never
    /// returned.
    pub async fn run<T: Document>(&self, query: &Query) -> Result<Vec<T>, RepositoryError> {
        let plans = query.native_queries();
        tracing::debug!(
            collection = %query.collection,
            native_queries = plans.len(),
            "routing query"
        );

        let batches = try_join_all(
            plans
                .iter()
                .map(|filters| self.fetch::<T>(&query.collection, filters)),
        )
        .await?;

        let mut merged = union_by_identity(batches);
        order(&mut merged, query.order_by);
        Ok(merged)
    }

    async fn fetch<T: Document>(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> Result<Vec<T>, RepositoryError> {
        let snapshots = self.store.query(collection, filters).await?;
        Ok(decode_all(collection, snapshots))
    }
}

/// Decodes snapshots, skipping (and logging) any that do not fit `T`.
pub fn decode_all<T: Document>(collection: &CollectionPath, snapshots: Vec<Snapshot>) -> Vec<T> {
    snapshots
        .into_iter()
        .filter_map(|snapshot| {
            let id = snapshot.id.clone();
            match from_snapshot::<T>(snapshot) {
                Ok(doc) => Some(doc),
                Err(error) => {
                    tracing::warn!(%collection, id = %id, %error, "skipping malformed document");
                    None
                }
            }
        })
        .collect()
}
