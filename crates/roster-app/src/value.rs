// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use time::Date;
use time::macros::format_description;

use crate::ids::RecordId;

pub const ID_FIELD: &str = "id";

/// A single scalar cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(Date),
}

impl Value {
    /// The text a search query is matched against. Only strings and numbers
    /// take part in matching.
    pub fn search_text(&self) -> Option<String> {
        match self {
            Self::Text(value) => Some(value.clone()),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) => Some(format_float(*value)),
            Self::Null | Self::Bool(_) | Self::Date(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(value) => serde_json::Value::Bool(*value),
            Self::Int(value) => serde_json::Value::from(*value),
            Self::Float(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(value) => serde_json::Value::String(value.clone()),
            Self::Date(value) => serde_json::Value::String(format_date(*value)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&format_float(*value)),
            Self::Text(value) => f.write_str(value),
            Self::Date(value) => f.write_str(&format_date(*value)),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Self::Int(value),
                None => number.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            serde_json::Value::String(value) => Self::Text(value),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => Self::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

fn format_float(value: f64) -> String {
    // f64 Display already prints 30.0 as "30", matching how numbers render
    // once they have been through JSON.
    value.to_string()
}

fn format_date(value: Date) -> String {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| value.to_string())
}

/// A loosely typed record as it arrives from a JSON collection endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field.to_owned(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn id(&self) -> Option<RecordId> {
        match self.fields.get(ID_FIELD) {
            Some(Value::Int(value)) => u64::try_from(*value).ok().map(RecordId::new),
            _ => None,
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, &value.to_json())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self {
            fields: raw
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect(),
        })
    }
}

/// Reads named fields out of a row type. The list pipeline is generic over
/// this so the same search/sort code serves every collection.
pub trait FieldAccess<T> {
    fn value(&self, row: &T, field: &str) -> Option<Value>;
}

/// Field access for dynamic [`Row`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowFields;

impl FieldAccess<Row> for RowFields {
    fn value(&self, row: &Row, field: &str) -> Option<Value> {
        row.get(field).cloned()
    }
}

/// A named accessor map for typed rows.
pub struct Accessors<T> {
    fields: BTreeMap<&'static str, fn(&T) -> Value>,
}

impl<T> Accessors<T> {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    pub fn field(mut self, name: &'static str, accessor: fn(&T) -> Value) -> Self {
        self.fields.insert(name, accessor);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }
}

impl<T> Default for Accessors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Accessors<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<T> fmt::Debug for Accessors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessors")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> FieldAccess<T> for Accessors<T> {
    fn value(&self, row: &T, field: &str) -> Option<Value> {
        self.fields.get(field).map(|accessor| accessor(row))
    }
}

#[cfg(test)]
mod tests {
    use super::{Accessors, FieldAccess, Row, RowFields, Value};
    use crate::RecordId;
    use anyhow::Result;
    use time::{Date, Month};

    #[test]
    fn row_decodes_json_scalars() -> Result<()> {
        let row: Row = serde_json::from_str(
            r#"{"id":3,"name":"Artisan Dark Chocolate","price":12.5,"isActive":true,"tags":["a"],"note":null}"#,
        )?;
        assert_eq!(row.id(), Some(RecordId::new(3)));
        assert_eq!(row.get("name"), Some(&Value::from("Artisan Dark Chocolate")));
        assert_eq!(row.get("price"), Some(&Value::Float(12.5)));
        assert_eq!(row.get("isActive"), Some(&Value::Bool(true)));
        assert_eq!(row.get("tags"), Some(&Value::Null));
        assert_eq!(row.get("note"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn row_rejects_non_object_payloads() {
        assert!(serde_json::from_str::<Row>("[1,2,3]").is_err());
    }

    #[test]
    fn numbers_render_like_json() {
        assert_eq!(Value::Float(30.0).search_text().as_deref(), Some("30"));
        assert_eq!(Value::Float(149.99).search_text().as_deref(), Some("149.99"));
        assert_eq!(Value::Int(-4).search_text().as_deref(), Some("-4"));
        assert_eq!(Value::Bool(true).search_text(), None);
    }

    #[test]
    fn dates_serialize_as_iso_strings() -> Result<()> {
        let date = Date::from_calendar_date(2024, Month::January, 15)?;
        let row = Row::new().with("startDate", date);
        let json = serde_json::to_string(&row)?;
        assert_eq!(json, r#"{"startDate":"2024-01-15"}"#);
        Ok(())
    }

    #[test]
    fn accessors_resolve_named_fields() {
        struct Trip {
            driver: String,
            fare: f64,
        }

        let access = Accessors::<Trip>::new()
            .field("driver", |trip| Value::from(trip.driver.as_str()))
            .field("fare", |trip| Value::from(trip.fare));
        let trip = Trip {
            driver: "Alice Johnson".to_owned(),
            fare: 18.5,
        };

        assert_eq!(access.value(&trip, "fare"), Some(Value::Float(18.5)));
        assert_eq!(access.value(&trip, "missing"), None);
        assert_eq!(access.names().collect::<Vec<_>>(), vec!["driver", "fare"]);
    }

    #[test]
    fn row_fields_reads_dynamic_rows() {
        let row = Row::new().with("name", "Jane");
        assert_eq!(RowFields.value(&row, "name"), Some(Value::from("Jane")));
        assert_eq!(RowFields.value(&row, "email"), None);
    }
}
