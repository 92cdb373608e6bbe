//! Parameter graphs: the argument structures handed to functions.
//!
//! A parameter graph may embed expression nodes at any depth. Two
//! traversals walk it:
//!
//! - [`ParamNode::collect_references`] is pure and reports every context
//!   reference the graph depends on, ahead of evaluation.
//! - [`ParamNode::materialize`] evaluates every embedded node against a
//!   context and yields a plain [`Datum`] for the function to consume.
//!
//! Both traversals cover the same shapes (mappings, sequences, records),
//! so whatever a function depends on is exactly what gets resolved for it.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::EvalError;
use crate::types::{Context, DataType, Datum, Record};
use crate::value::{Constant, Element, Value, Variable};

// ──────────────────────────────────────────────
// Graph shape
// ──────────────────────────────────────────────

/// One node of a parameter graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamNode {
    /// A plain value with no sub-expressions.
    Scalar(Datum),
    /// An expression node, evaluated before the function runs.
    Value(Box<Value>),
    Mapping(BTreeMap<String, ParamNode>),
    Sequence(Vec<ParamNode>),
    Record(ParamRecord),
}

/// A structured record whose fields are enumerated explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamRecord {
    pub type_name: String,
    pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordField {
    pub name: String,
    pub slot: Slot,
    pub node: ParamNode,
}

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Untyped: anything, including sub-expressions of any result type.
    Open,
    /// The field's resolved value must be assignable to this type.
    Typed(DataType),
}

impl Slot {
    fn accepts(self, other: DataType) -> bool {
        match self {
            Slot::Open => true,
            Slot::Typed(dt) => dt.accepts(other),
        }
    }
}

/// Implemented by caller-defined parameter types that opt into automatic
/// resolution by enumerating their fields.
pub trait AutoResolve {
    fn to_param_record(&self) -> ParamRecord;
}

impl AutoResolve for ParamRecord {
    fn to_param_record(&self) -> ParamRecord {
        self.clone()
    }
}

impl ParamRecord {
    pub fn new(type_name: impl Into<String>) -> Self {
        ParamRecord {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn open_field(mut self, name: impl Into<String>, node: impl Into<ParamNode>) -> Self {
        self.fields.push(RecordField {
            name: name.into(),
            slot: Slot::Open,
            node: node.into(),
        });
        self
    }

    pub fn typed_field(
        mut self,
        name: impl Into<String>,
        data_type: DataType,
        node: impl Into<ParamNode>,
    ) -> Self {
        self.fields.push(RecordField {
            name: name.into(),
            slot: Slot::Typed(data_type),
            node: node.into(),
        });
        self
    }
}

impl ParamNode {
    /// A mapping from `(key, node)` pairs.
    pub fn mapping<K, N>(entries: impl IntoIterator<Item = (K, N)>) -> Self
    where
        K: Into<String>,
        N: Into<ParamNode>,
    {
        ParamNode::Mapping(
            entries
                .into_iter()
                .map(|(k, n)| (k.into(), n.into()))
                .collect(),
        )
    }

    pub fn sequence<N: Into<ParamNode>>(items: impl IntoIterator<Item = N>) -> Self {
        ParamNode::Sequence(items.into_iter().map(Into::into).collect())
    }

    pub fn record(source: &impl AutoResolve) -> Self {
        ParamNode::Record(source.to_param_record())
    }

    /// An empty mapping, for functions that take no meaningful input.
    pub fn empty() -> Self {
        ParamNode::Mapping(BTreeMap::new())
    }

    /// The data type this node is known to produce before evaluation.
    pub fn static_type(&self) -> DataType {
        match self {
            ParamNode::Scalar(d) => d.data_type(),
            ParamNode::Value(v) => v.result_type(),
            ParamNode::Mapping(_) => DataType::Mapping,
            ParamNode::Sequence(_) => DataType::Collection,
            ParamNode::Record(_) => DataType::StructuredObject,
        }
    }

    // ──────────────────────────────────────────────
    // Construction-time validation
    // ──────────────────────────────────────────────

    /// Check every typed record slot in the graph.
    ///
    /// A slot whose content can never fit is an error. A slot holding a
    /// sub-expression that only promises `GenericObject` cannot be proven
    /// either way: it is accepted with a warning and checked on evaluation.
    pub fn validate(&self) -> Result<(), EvalError> {
        match self {
            ParamNode::Scalar(_) | ParamNode::Value(_) => Ok(()),
            ParamNode::Mapping(map) => map.values().try_for_each(ParamNode::validate),
            ParamNode::Sequence(items) => items.iter().try_for_each(ParamNode::validate),
            ParamNode::Record(record) => {
                for field in &record.fields {
                    field.node.validate()?;
                    let got = field.node.static_type();
                    if field.slot.accepts(got) {
                        continue;
                    }
                    let Slot::Typed(expected) = field.slot else {
                        continue;
                    };
                    if got == DataType::GenericObject && matches!(field.node, ParamNode::Value(_)) {
                        tracing::warn!(
                            record = %record.type_name,
                            field = %field.name,
                            slot = %expected,
                            "sub-expression result type is open; slot will be checked at evaluation"
                        );
                        continue;
                    }
                    return Err(EvalError::FieldType {
                        record: record.type_name.clone(),
                        field: field.name.clone(),
                        expected,
                        got,
                    });
                }
                Ok(())
            }
        }
    }

    // ──────────────────────────────────────────────
    // Structural traversal
    // ──────────────────────────────────────────────

    /// Every context reference reachable from this node.
    ///
    /// Mapping keys are plain strings and contribute nothing.
    pub fn collect_references(&self) -> BTreeSet<Element> {
        let mut out = BTreeSet::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut BTreeSet<Element>) {
        match self {
            ParamNode::Scalar(_) => {}
            ParamNode::Value(v) => out.extend(v.collect_references()),
            ParamNode::Mapping(map) => map.values().for_each(|n| n.collect_into(out)),
            ParamNode::Sequence(items) => items.iter().for_each(|n| n.collect_into(out)),
            ParamNode::Record(record) => record
                .fields
                .iter()
                .for_each(|f| f.node.collect_into(out)),
        }
    }

    // ──────────────────────────────────────────────
    // Materializing traversal
    // ──────────────────────────────────────────────

    /// Resolve every embedded expression against `ctx`, depth-first and
    /// in field order.
    pub fn materialize(&self, ctx: &Context) -> Result<Datum, EvalError> {
        match self {
            ParamNode::Scalar(d) => Ok(d.clone()),
            ParamNode::Value(v) => v.evaluate(ctx),
            ParamNode::Mapping(map) => {
                let mut out = BTreeMap::new();
                for (k, n) in map {
                    out.insert(k.clone(), n.materialize(ctx)?);
                }
                Ok(Datum::Map(out))
            }
            ParamNode::Sequence(items) => items
                .iter()
                .map(|n| n.materialize(ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(Datum::List),
            ParamNode::Record(record) => {
                let mut out = Record::new(record.type_name.clone());
                for field in &record.fields {
                    let resolved = field.node.materialize(ctx)?;
                    if let Slot::Typed(expected) = field.slot {
                        if !expected.is_assignable(&resolved) {
                            return Err(EvalError::FieldMismatch {
                                record: record.type_name.clone(),
                                field: field.name.clone(),
                                expected,
                                got: resolved.data_type(),
                            });
                        }
                    }
                    tracing::trace!(
                        record = %record.type_name,
                        field = %field.name,
                        "materialized field"
                    );
                    out.fields.insert(field.name.clone(), resolved);
                }
                Ok(Datum::Record(out))
            }
        }
    }
}

// ──────────────────────────────────────────────
// Conversions
// ──────────────────────────────────────────────

impl From<Datum> for ParamNode {
    fn from(d: Datum) -> Self {
        ParamNode::Scalar(d)
    }
}

impl From<&str> for ParamNode {
    fn from(s: &str) -> Self {
        ParamNode::Scalar(Datum::from(s))
    }
}

impl From<i32> for ParamNode {
    fn from(i: i32) -> Self {
        ParamNode::Scalar(Datum::from(i))
    }
}

impl From<bool> for ParamNode {
    fn from(b: bool) -> Self {
        ParamNode::Scalar(Datum::from(b))
    }
}

impl From<Value> for ParamNode {
    fn from(v: Value) -> Self {
        ParamNode::Value(Box::new(v))
    }
}

impl From<Constant> for ParamNode {
    fn from(c: Constant) -> Self {
        ParamNode::from(Value::from(c))
    }
}

impl From<Element> for ParamNode {
    fn from(e: Element) -> Self {
        ParamNode::from(Value::from(e))
    }
}

impl From<Variable> for ParamNode {
    fn from(v: Variable) -> Self {
        ParamNode::from(Value::from(v))
    }
}

impl From<ParamRecord> for ParamNode {
    fn from(r: ParamRecord) -> Self {
        ParamNode::Record(r)
    }
}

impl From<Vec<ParamNode>> for ParamNode {
    fn from(items: Vec<ParamNode>) -> Self {
        ParamNode::Sequence(items)
    }
}

impl From<BTreeMap<String, ParamNode>> for ParamNode {
    fn from(map: BTreeMap<String, ParamNode>) -> Self {
        ParamNode::Mapping(map)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
