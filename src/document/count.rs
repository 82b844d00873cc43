//! Denormalized counter fields read leniently.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `#[serde(deserialize_with = "count::lenient")]` for `u64` counters.
/// Negative or fractional values are clamped to whole non-negative numbers,
/// and anything that is not a number reads as zero.
pub fn lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(clamp).unwrap_or(0))
}

fn clamp(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    if value.as_i64().is_some() {
        return 0;
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f > 0.0)
        .map(|f| f.min(u64::MAX as f64) as u64)
        .unwrap_or(0)
}
