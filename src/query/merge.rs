use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::timestamp::sort_key;
use crate::document::{Document, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    #[default]
    Descending,
}

/// Client-side ordering applied after a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    CreatedAt(Direction),
    UpdatedAt(Direction),
    /// Keep the merged arrival order.
    Arrival,
}

impl Default for OrderBy {
    fn default() -> Self {
        OrderBy::CreatedAt(Direction::Descending)
    }
}

/// Concatenates result batches in order and keeps the first occurrence of
/// every document id.
pub fn union_by_identity<T, I>(batches: I) -> Vec<T>
where
    T: Document,
    I: IntoIterator<Item = Vec<T>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for batch in batches {
        for item in batch {
            if seen.insert(item.id().to_string()) {
                merged.push(item);
            }
        }
    }

    merged
}

/// Stable sort on an optional timestamp. Absent timestamps compare as the
/// oldest possible instant, so they land last when descending.
pub fn sort_by_timestamp<T, F>(items: &mut [T], direction: Direction, key: F)
where
    F: Fn(&T) -> Option<Timestamp>,
{
    items.sort_by(|a, b| {
        let (a, b) = (sort_key(key(a)), sort_key(key(b)));
        match direction {
            Direction::Ascending => a.cmp(&b),
            Direction::Descending => b.cmp(&a),
        }
    });
}

pub fn order<T: Document>(items: &mut [T], order_by: OrderBy) {
    match order_by {
        OrderBy::CreatedAt(direction) => sort_by_timestamp(items, direction, T::created_at),
        OrderBy::UpdatedAt(direction) => sort_by_timestamp(items, direction, T::updated_at),
        OrderBy::Arrival => {}
    }
}
