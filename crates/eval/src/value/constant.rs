//! Constant nodes.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;

use crate::error::EvalError;
use crate::types::{DataType, Datum, Record};

/// A fixed literal tagged with a data type.
///
/// Equality and hashing are structural over `(data_type, value)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constant {
    data_type: DataType,
    value: Datum,
}

impl Constant {
    /// Build a constant, failing if the literal does not fit `data_type`.
    pub fn new(data_type: DataType, value: impl Into<Datum>) -> Result<Self, EvalError> {
        let value = value.into();
        if !data_type.is_assignable(&value) {
            return Err(EvalError::ConstantType {
                expected: data_type,
                got: value.data_type(),
            });
        }
        Ok(Constant { data_type, value })
    }

    pub fn text(value: impl Into<String>) -> Self {
        Constant {
            data_type: DataType::Text,
            value: Datum::Text(value.into()),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Constant {
            data_type: DataType::Boolean,
            value: Datum::Bool(value),
        }
    }

    pub fn number(value: impl Into<Decimal>) -> Self {
        Constant {
            data_type: DataType::Number,
            value: Datum::Number(value.into()),
        }
    }

    pub fn collection(items: Vec<Datum>) -> Self {
        Constant {
            data_type: DataType::Collection,
            value: Datum::List(items),
        }
    }

    pub fn mapping(entries: BTreeMap<String, Datum>) -> Self {
        Constant {
            data_type: DataType::Mapping,
            value: Datum::Map(entries),
        }
    }

    pub fn record(record: Record) -> Self {
        Constant {
            data_type: DataType::StructuredObject,
            value: Datum::Record(record),
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Constant {
            data_type: DataType::RawObject,
            value: Datum::Json(value),
        }
    }

    /// An open-typed constant holding any datum.
    pub fn object(value: impl Into<Datum>) -> Self {
        Constant {
            data_type: DataType::GenericObject,
            value: value.into(),
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn value(&self) -> &Datum {
        &self.value
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.data_type, self.value)
    }
}
