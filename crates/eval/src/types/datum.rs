//! Runtime values produced by expression nodes.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::DataType;
use crate::error::EvalError;

// ──────────────────────────────────────────────
// Datum
// ──────────────────────────────────────────────

/// Native representation of every value flowing through the engine.
/// All numbers are `rust_decimal::Decimal` -- never `f64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datum {
    Text(String),
    Bool(bool),
    Number(Decimal),
    List(Vec<Datum>),
    Map(BTreeMap<String, Datum>),
    Record(Record),
    Json(serde_json::Value),
}

/// A structured object: a named type with named fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub type_name: String,
    pub fields: BTreeMap<String, Datum>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Record {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Datum>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Datum> {
        self.fields.get(field)
    }
}

impl Datum {
    /// The data type this datum natively represents.
    pub fn data_type(&self) -> DataType {
        match self {
            Datum::Text(_) => DataType::Text,
            Datum::Bool(_) => DataType::Boolean,
            Datum::Number(_) => DataType::Number,
            Datum::List(_) => DataType::Collection,
            Datum::Map(_) => DataType::Mapping,
            Datum::Record(_) => DataType::StructuredObject,
            Datum::Json(_) => DataType::RawObject,
        }
    }

    /// Numeric view of this datum. JSON numbers are coerced.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Datum::Number(d) => Some(*d),
            Datum::Json(serde_json::Value::Number(n)) => json_number_to_decimal(n).ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            Datum::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Convert caller-supplied JSON into a datum.
    ///
    /// Objects become `Map`, arrays become `List`, numbers become `Number`.
    /// `null` has no native counterpart and is kept as `Json(Null)`.
    pub fn from_json(v: &serde_json::Value) -> Result<Datum, EvalError> {
        Ok(match v {
            serde_json::Value::Null => Datum::Json(serde_json::Value::Null),
            serde_json::Value::Bool(b) => Datum::Bool(*b),
            serde_json::Value::Number(n) => Datum::Number(json_number_to_decimal(n)?),
            serde_json::Value::String(s) => Datum::Text(s.clone()),
            serde_json::Value::Array(items) => Datum::List(
                items
                    .iter()
                    .map(Datum::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(obj) => {
                let mut map = BTreeMap::new();
                for (k, v) in obj {
                    map.insert(k.clone(), Datum::from_json(v)?);
                }
                Datum::Map(map)
            }
        })
    }

    /// Convert a JSON object into a `Record` of the given type name.
    pub fn record_from_json(
        type_name: &str,
        v: &serde_json::Value,
    ) -> Result<Datum, EvalError> {
        let obj = v.as_object().ok_or_else(|| EvalError::TypeError {
            message: format!("{} must be a JSON object", type_name),
        })?;
        let mut record = Record::new(type_name);
        for (k, v) in obj {
            record.fields.insert(k.clone(), Datum::from_json(v)?);
        }
        Ok(Datum::Record(record))
    }

    /// Render as plain JSON for output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Datum::Text(s) => serde_json::Value::String(s.clone()),
            Datum::Bool(b) => serde_json::Value::Bool(*b),
            Datum::Number(d) => decimal_to_json(*d),
            Datum::List(items) => {
                serde_json::Value::Array(items.iter().map(Datum::to_json).collect())
            }
            Datum::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Datum::Record(record) => serde_json::Value::Object(
                record
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Datum::Json(v) => v.clone(),
        }
    }
}

fn json_number_to_decimal(n: &serde_json::Number) -> Result<Decimal, EvalError> {
    if let Some(i) = n.as_i64() {
        return Ok(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Decimal::from(u));
    }
    let s = n.to_string();
    s.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&s))
        .map_err(|e| EvalError::TypeError {
            message: format!("number {} is not representable as Decimal: {}", s, e),
        })
}

fn decimal_to_json(d: Decimal) -> serde_json::Value {
    if d.fract().is_zero() {
        if let Some(i) = d.to_i64() {
            return serde_json::Value::from(i);
        }
    }
    d.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(d.to_string()))
}

impl Hash for Datum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Datum::Text(s) => s.hash(state),
            Datum::Bool(b) => b.hash(state),
            // 18 and 18.0 compare equal, so they must hash alike.
            Datum::Number(d) => d.normalize().hash(state),
            Datum::List(items) => items.hash(state),
            Datum::Map(map) => map.hash(state),
            Datum::Record(record) => record.hash(state),
            Datum::Json(v) => hash_json(v, state),
        }
    }
}

/// Hash a JSON value consistently with `serde_json::Value` equality.
fn hash_json<H: Hasher>(v: &serde_json::Value, state: &mut H) {
    std::mem::discriminant(v).hash(state);
    match v {
        serde_json::Value::Null => {}
        serde_json::Value::Bool(b) => b.hash(state),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                0u8.hash(state);
                u.hash(state);
            } else if let Some(i) = n.as_i64() {
                1u8.hash(state);
                i.hash(state);
            } else if let Some(f) = n.as_f64() {
                2u8.hash(state);
                // -0.0 == 0.0
                let f = if f == 0.0 { 0.0 } else { f };
                f.to_bits().hash(state);
            }
        }
        serde_json::Value::String(s) => s.hash(state),
        serde_json::Value::Array(items) => {
            items.len().hash(state);
            items.iter().for_each(|item| hash_json(item, state));
        }
        serde_json::Value::Object(obj) => {
            let mut entries: Vec<_> = obj.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            entries.len().hash(state);
            for (k, v) in entries {
                k.hash(state);
                hash_json(v, state);
            }
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Text(s) => write!(f, "{:?}", s),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Number(d) => write!(f, "{}", d),
            Datum::Record(r) => write!(f, "{} {}", r.type_name, self.to_json()),
            _ => write!(f, "{}", self.to_json()),
        }
    }
}

// ──────────────────────────────────────────────
// Conversions
// ──────────────────────────────────────────────

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

impl From<i32> for Datum {
    fn from(i: i32) -> Self {
        Datum::Number(Decimal::from(i))
    }
}

impl From<i64> for Datum {
    fn from(i: i64) -> Self {
        Datum::Number(Decimal::from(i))
    }
}

impl From<Decimal> for Datum {
    fn from(d: Decimal) -> Self {
        Datum::Number(d)
    }
}

impl From<Vec<Datum>> for Datum {
    fn from(items: Vec<Datum>) -> Self {
        Datum::List(items)
    }
}

impl From<BTreeMap<String, Datum>> for Datum {
    fn from(map: BTreeMap<String, Datum>) -> Self {
        Datum::Map(map)
    }
}

impl From<Record> for Datum {
    fn from(record: Record) -> Self {
        Datum::Record(record)
    }
}
