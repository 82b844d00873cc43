//! Store-native timestamps and their normalization to epoch milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

/// A point in time as stored by the document store: whole seconds plus nanoseconds.
///
/// Written as `{"seconds": .., "nanoseconds": ..}`. Reads also accept epoch
/// milliseconds and RFC 3339 strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    seconds: i64,
    nanos: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self {
            seconds: millis.div_euclid(1000),
            nanos: (millis.rem_euclid(1000) * 1_000_000) as u32,
        }
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    pub fn as_millis(&self) -> i64 {
        self.seconds
            .saturating_mul(1000)
            .saturating_add(i64::from(self.nanos / 1_000_000))
    }

    pub fn to_value(&self) -> Value {
        json!({ "seconds": self.seconds, "nanoseconds": self.nanos })
    }

    /// Interprets any of the accepted timestamp shapes. Returns `None` for
    /// anything malformed rather than failing.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(fields) => {
                let seconds = fields
                    .get("seconds")
                    .or_else(|| fields.get("_seconds"))
                    .and_then(whole_number)?;
                let nanos = match fields
                    .get("nanoseconds")
                    .or_else(|| fields.get("_nanoseconds"))
                    .or_else(|| fields.get("nanos"))
                {
                    Some(n) => whole_number(n)?,
                    None => 0,
                };
                if !(0..1_000_000_000).contains(&nanos) {
                    return None;
                }
                Some(Self {
                    seconds,
                    nanos: nanos as u32,
                })
            }
            Value::Number(_) => whole_number(value).map(Self::from_millis),
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| Self::from_datetime(dt.with_timezone(&Utc))),
            _ => None,
        }
    }
}

fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Comparison key for client-side ordering: epoch milliseconds, with absent
/// timestamps treated as the oldest possible value.
pub fn sort_key(timestamp: Option<Timestamp>) -> i64 {
    timestamp.map(|t| t.as_millis()).unwrap_or(i64::MIN)
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Timestamp::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("malformed timestamp: {}", value)))
    }
}

/// `#[serde(with = "lenient")]` for `Option<Timestamp>` fields: malformed input
/// reads as `None` instead of failing the whole document.
pub mod lenient {
    use super::Timestamp;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(
        timestamp: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        timestamp.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(Timestamp::from_value))
    }
}
