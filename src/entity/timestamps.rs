//! Timestamp coercion for entity layers.
//!
//! `createdAt` and `updatedAt` are always resolvable to some valid timestamp:
//! a value that is absent or fails coercion silently resolves to the current
//! time. This is a deliberate policy difference from the rest of validation —
//! identity failures are fatal to the construction, timestamp failures never
//! are.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::schema::parse_date;

/// Coerces a raw timestamp value; `None` when absent or unparsable.
pub(crate) fn coerce_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value.and_then(parse_date)
}

/// Renders a timestamp into its field representation.
pub(crate) fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339())
}
