//! Response payload encoding.
//!
//! Handlers return a [`Payload`] tree instead of raw JSON so two shapes JSON
//! has no native spelling for are rendered consistently: timezone-aware
//! timestamps (ISO-8601 with offset) and structured model values (their field
//! mapping, recursively).

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// A structured model value, rendered as its field mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    fields: BTreeMap<String, Payload>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Payload>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Payload> {
        self.fields.get(name)
    }
}

/// A response payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Rendered as ISO-8601 with its UTC offset.
    Timestamp(DateTime<FixedOffset>),
    Array(Vec<Payload>),
    /// Rendered as the model's field mapping.
    Model(Model),
    Object(BTreeMap<String, Payload>),
}

impl Payload {
    /// Render to plain JSON. Field order is deterministic, so encoding the
    /// same payload twice yields byte-identical output.
    pub fn to_value(&self) -> Value {
        match self {
            Payload::Null => Value::Null,
            Payload::Bool(b) => Value::Bool(*b),
            Payload::Number(n) => Value::Number(n.clone()),
            Payload::String(s) => Value::String(s.clone()),
            Payload::Timestamp(ts) => Value::String(ts.to_rfc3339()),
            Payload::Array(items) => Value::Array(items.iter().map(Payload::to_value).collect()),
            Payload::Model(model) => Value::Object(
                model
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Payload::Object(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_value())).collect(),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Payload::Null)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => Payload::Number(n),
            Value::String(s) => Payload::String(s),
            Value::Array(items) => Payload::Array(items.into_iter().map(Payload::from).collect()),
            Value::Object(map) => Payload::Object(
                map.into_iter().map(|(k, v)| (k, Payload::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::String(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::String(s)
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Bool(b)
    }
}

impl From<i64> for Payload {
    fn from(n: i64) -> Self {
        Payload::Number(n.into())
    }
}

impl From<DateTime<FixedOffset>> for Payload {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Payload::Timestamp(ts)
    }
}

impl From<DateTime<Utc>> for Payload {
    fn from(ts: DateTime<Utc>) -> Self {
        Payload::Timestamp(ts.fixed_offset())
    }
}

impl From<Model> for Payload {
    fn from(model: Model) -> Self {
        Payload::Model(model)
    }
}

impl<T: Into<Payload>> From<Vec<T>> for Payload {
    fn from(items: Vec<T>) -> Self {
        Payload::Array(items.into_iter().map(Into::into).collect())
    }
}
