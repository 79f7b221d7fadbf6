//! Product records produced by extraction
//!
//! A [`Record`] is a loose field-name → value mapping. Product pages and
//! variation payloads expose different field sets, so the schema is only
//! settled at export time as the union of every record's keys.

use serde_json::Value;
use std::collections::BTreeMap;

/// A single extracted field value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    #[default]
    Null,
}

impl FieldValue {
    /// Converts a JSON scalar into a text value; null, missing and compound values become `Null`
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(Value::Number(n)) => Self::Text(n.to_string()),
            Some(Value::Bool(b)) => Self::Text(b.to_string()),
            _ => Self::Null,
        }
    }

    /// Converts a JSON array into a list value; anything else becomes an empty list
    pub fn list_from_json(value: Option<&Value>) -> Self {
        let items = value
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self::List(items)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as a single cell, joining lists with `separator`
    pub fn render(&self, separator: &str) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(separator),
            Self::Null => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// One product or product variation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Returns the field as text, if it is a text value
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Copies every non-null field of `other` over this record
    pub fn merge_non_null(&mut self, other: Record) {
        for (key, value) in other.fields {
            if !value.is_null() {
                self.fields.insert(key, value);
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.set(key, value);
        }
        record
    }
}
