//! Field-level write operations applied by the store.

use serde_json::{Map, Value};

use crate::document::Timestamp;

/// A single field transform. Everything except `Set`/`Delete` is evaluated
/// against the current stored value inside the store, not on the client.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Set(Value),
    Delete,
    /// Add `by` to the numeric field (missing or non-numeric counts as 0).
    /// When `floor` is set the result never drops below it.
    Increment { by: i64, floor: Option<i64> },
    /// Append each value not already present (deep equality).
    ArrayUnion(Vec<Value>),
    /// Drop every element deep-equal to one of the values.
    ArrayRemove(Vec<Value>),
    /// Swap `old` for `new` in one write. `new` takes the position of the first
    /// `old`; if `new` is already present the `old` entries are just dropped.
    ArrayReplace { old: Value, new: Value },
    ServerTimestamp,
}

/// An ordered list of field operations for one document update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    ops: Vec<(String, FieldOp)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(mut self, field: impl Into<String>, op: FieldOp) -> Self {
        self.ops.push((field.into(), op));
        self
    }

    pub fn set(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.op(field, FieldOp::Set(value.into()))
    }

    pub fn delete(self, field: impl Into<String>) -> Self {
        self.op(field, FieldOp::Delete)
    }

    pub fn increment(self, field: impl Into<String>, by: i64) -> Self {
        self.op(field, FieldOp::Increment { by, floor: None })
    }

    pub fn increment_floored(self, field: impl Into<String>, by: i64, floor: i64) -> Self {
        self.op(
            field,
            FieldOp::Increment {
                by,
                floor: Some(floor),
            },
        )
    }

    pub fn array_union(self, field: impl Into<String>, value: Value) -> Self {
        self.op(field, FieldOp::ArrayUnion(vec![value]))
    }

    pub fn array_remove(self, field: impl Into<String>, value: Value) -> Self {
        self.op(field, FieldOp::ArrayRemove(vec![value]))
    }

    pub fn array_replace(self, field: impl Into<String>, old: Value, new: Value) -> Self {
        self.op(field, FieldOp::ArrayReplace { old, new })
    }

    pub fn server_timestamp(self, field: impl Into<String>) -> Self {
        self.op(field, FieldOp::ServerTimestamp)
    }

    /// Appends every `Set` from a field map.
    pub fn set_all(mut self, fields: Map<String, Value>) -> Self {
        for (field, value) in fields {
            self.ops.push((field, FieldOp::Set(value)));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[(String, FieldOp)] {
        &self.ops
    }

    /// Applies every operation to `document` in order.
    pub fn apply_to(&self, document: &mut Map<String, Value>, now: Timestamp) {
        for (field, op) in &self.ops {
            apply_op(document, field, op, now);
        }
    }
}

fn apply_op(document: &mut Map<String, Value>, field: &str, op: &FieldOp, now: Timestamp) {
    match op {
        FieldOp::Set(value) => {
            document.insert(field.to_string(), value.clone());
        }
        FieldOp::Delete => {
            document.remove(field);
        }
        FieldOp::Increment { by, floor } => {
            let current = document.get(field).and_then(Value::as_i64).unwrap_or(0);
            let mut next = current.saturating_add(*by);
            if let Some(floor) = floor {
                next = next.max(*floor);
            }
            document.insert(field.to_string(), Value::from(next));
        }
        FieldOp::ArrayUnion(values) => with_array(document, field, |items| {
            for value in values {
                if !items.contains(value) {
                    items.push(value.clone());
                }
            }
        }),
        FieldOp::ArrayRemove(values) => with_array(document, field, |items| {
            items.retain(|item| !values.contains(item));
        }),
        FieldOp::ArrayReplace { old, new } => with_array(document, field, |items| {
            if old == new {
                return;
            }
            let new_present = items.contains(new);
            match items.iter().position(|item| item == old) {
                Some(index) if !new_present => {
                    items[index] = new.clone();
                    items.retain(|item| item != old);
                }
                _ => {
                    items.retain(|item| item != old);
                    if !new_present {
                        items.push(new.clone());
                    }
                }
            }
        }),
        FieldOp::ServerTimestamp => {
            document.insert(field.to_string(), now.to_value());
        }
    }
}

/// Runs `f` over the field as an array. Missing or non-array values start empty.
fn with_array(document: &mut Map<String, Value>, field: &str, f: impl FnOnce(&mut Vec<Value>)) {
    let mut items = match document.remove(field) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    f(&mut items);
    document.insert(field.to_string(), Value::Array(items));
}
