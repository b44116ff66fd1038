// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log record handed to output adapters

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Severity;

/// One emitted log call
///
/// Built fresh for every call that passes filtering and shared by reference
/// with every output adapter. `meta` is a copy of the registry's global
/// context taken when the record was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub level: Severity,
    pub time: DateTime<Utc>,
    pub namespace: String,
    pub context_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl LogRecord {
    /// Create a record stamped with the current time
    ///
    /// An empty message and a null `data` are dropped.
    pub fn new(
        level: Severity,
        namespace: &str,
        context_id: String,
        message: &str,
        data: Option<Value>,
        meta: Map<String, Value>,
    ) -> Self {
        Self {
            level,
            time: Utc::now(),
            namespace: namespace.to_string(),
            context_id,
            message: (!message.is_empty()).then(|| message.to_string()),
            data: data.filter(|d| !d.is_null()),
            meta,
        }
    }

    /// Record time as ISO-8601 with millisecond precision (`...T12:00:00.000Z`)
    pub fn time_iso(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Convert any serializable value into record data
///
/// Serialization failures become a descriptive string instead of an error,
/// so a log call never fails because of its payload.
pub fn to_data<T: Serialize + ?Sized>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(err) => Some(Value::String(format!("[unserializable data: {}]", err))),
    }
}
