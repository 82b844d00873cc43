use std::collections::HashSet;

use serde::Serialize;

/// A distinct field value with the display label of the first entity that
/// carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledValue {
    pub value: String,
    pub label: String,
}

/// Distinct non-empty values of a field, in first-seen order.
pub fn distinct_values<'a, T, F>(items: &'a [T], value: F) -> Vec<String>
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(value)
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Distinct non-empty values of a field, each labeled from the first entity
/// carrying it. Falls back to the value itself when that entity has no label.
pub fn distinct_labeled<'a, T, V, L>(items: &'a [T], value: V, label: L) -> Vec<LabeledValue>
where
    V: Fn(&'a T) -> Option<&'a str>,
    L: Fn(&'a T) -> Option<&'a str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for item in items {
        let Some(v) = value(item).filter(|v| !v.is_empty()) else {
            continue;
        };
        if !seen.insert(v) {
            continue;
        }
        let label = label(item).filter(|l| !l.trim().is_empty()).unwrap_or(v);
        out.push(LabeledValue {
            value: v.to_string(),
            label: label.to_string(),
        });
    }

    out
}
