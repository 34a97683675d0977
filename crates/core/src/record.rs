//! The normalized lookup result.
//!
//! Merge rules for [`Record::extend`]:
//! 1. Empty incoming values never overwrite anything.
//! 2. Keys the record does not have yet (or has only an empty value for) are taken as-is.
//! 3. Lists are unioned, nested objects are merged recursively.
//! 4. Populated scalars are only replaced when the key is listed in `overwrite`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name → value mapping returned by every lookup. No fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; anything but an object becomes an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(is_empty_value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !is_empty_value(v))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Nested record stored under `key`, or an empty record.
    pub fn get_record(&self, key: &str) -> Record {
        self.get(key)
            .cloned()
            .map(Record::from_value)
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Insert only when `value` is `Some` and non-empty.
    pub fn insert_opt<V: Into<Value>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            let value = value.into();
            if !is_empty_value(&value) {
                self.0.insert(key.into(), value);
            }
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Merge `other` into `self` without clobbering populated keys, except
    /// the scalar keys named in `overwrite`.
    pub fn extend(&mut self, other: Record, overwrite: &[&str]) {
        extend_map(&mut self.0, other.0, overwrite);
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Null, `""`, `[]` and `{}` count as "not populated".
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.values().all(is_empty_value),
        _ => false,
    }
}

fn extend_map(target: &mut Map<String, Value>, incoming: Map<String, Value>, overwrite: &[&str]) {
    for (key, value) in incoming {
        if is_empty_value(&value) {
            continue;
        }
        let populated = target.get(&key).is_some_and(|v| !is_empty_value(v));
        if !populated {
            target.insert(key, value);
            continue;
        }
        let Some(current) = target.get_mut(&key) else {
            continue;
        };
        match (current, value) {
            (Value::Array(existing), Value::Array(new)) => {
                for item in new {
                    if !existing.contains(&item) {
                        existing.push(item);
                    }
                }
            }
            (Value::Object(existing), Value::Object(new)) => {
                extend_map(existing, new, overwrite);
            }
            // "A / B" strings are the front-end's list encoding
            (current, Value::Array(new)) if current.is_string() => {
                let mut items: Vec<Value> = current
                    .as_str()
                    .unwrap_or_default()
                    .split(" / ")
                    .map(|s| Value::String(s.to_string()))
                    .collect();
                for item in new {
                    if !items.contains(&item) {
                        items.push(item);
                    }
                }
                *current = Value::Array(items);
            }
            (current, value) => {
                if overwrite.contains(&key.as_str()) {
                    *current = value;
                }
            }
        }
    }
}
