//! The data type catalog and its assignability rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::datum::Datum;

/// Abstract kind of value a node can produce.
///
/// Every variant except `GenericObject` is bound to exactly one [`Datum`]
/// variant. `GenericObject` is the open slot and accepts any datum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Text,
    Boolean,
    Number,
    Collection,
    StructuredObject,
    RawObject,
    Mapping,
    GenericObject,
}

impl DataType {
    pub const ALL: [DataType; 8] = [
        DataType::Text,
        DataType::Boolean,
        DataType::Number,
        DataType::Collection,
        DataType::StructuredObject,
        DataType::RawObject,
        DataType::Mapping,
        DataType::GenericObject,
    ];

    /// Whether a runtime datum may be bound to a slot declared as `self`.
    pub fn is_assignable(self, datum: &Datum) -> bool {
        self.accepts(datum.data_type())
    }

    /// Whether a value statically typed as `other` may be bound to a slot
    /// declared as `self`.
    pub fn accepts(self, other: DataType) -> bool {
        self == DataType::GenericObject || self == other
    }

    fn as_str(self) -> &'static str {
        match self {
            DataType::Text => "Text",
            DataType::Boolean => "Boolean",
            DataType::Number => "Number",
            DataType::Collection => "Collection",
            DataType::StructuredObject => "StructuredObject",
            DataType::RawObject => "RawObject",
            DataType::Mapping => "Mapping",
            DataType::GenericObject => "GenericObject",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|dt| dt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown data type: {}", s))
    }
}
