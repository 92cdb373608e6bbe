//! Expression tree nodes.
//!
//! A [`Value`] is one of three node kinds:
//!
//! - [`Constant`]: a fixed, type-checked literal
//! - [`Element`]: a reference to a context entry by code
//! - [`Variable`]: the result of a registered function applied to a
//!   parameter graph that may embed further nodes
//!
//! Nodes are immutable once built. To change one, build a new one.

pub mod constant;
pub mod element;
pub mod variable;

use std::collections::BTreeSet;
use std::fmt;

pub use constant::Constant;
pub use element::Element;
pub use variable::Variable;

use crate::error::EvalError;
use crate::types::{Context, DataType, Datum};

/// Weight of the cheapest nodes (constants).
pub const HIGH: i32 = 0;
/// Weight of context lookups.
pub const MID: i32 = 1;
/// Weight of computed nodes, which may trigger external work.
pub const LOW: i32 = 2;

/// An expression tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Constant(Constant),
    Element(Element),
    Variable(Variable),
}

impl Value {
    /// Compute this node's value against a context.
    pub fn evaluate(&self, ctx: &Context) -> Result<Datum, EvalError> {
        match self {
            Value::Constant(c) => Ok(c.value().clone()),
            Value::Element(e) => e.evaluate(ctx),
            Value::Variable(v) => v.evaluate(ctx),
        }
    }

    /// The data type this node is declared to produce.
    pub fn result_type(&self) -> DataType {
        match self {
            Value::Constant(c) => c.data_type(),
            Value::Element(e) => e.data_type(),
            Value::Variable(v) => v.result_type(),
        }
    }

    /// Every context reference this node transitively depends on.
    pub fn collect_references(&self) -> BTreeSet<Element> {
        match self {
            Value::Constant(_) => BTreeSet::new(),
            Value::Element(e) => BTreeSet::from([e.clone()]),
            Value::Variable(v) => v.collect_references(),
        }
    }

    /// Evaluation priority; smaller is cheaper and goes first.
    pub fn weight(&self) -> i32 {
        match self {
            Value::Constant(_) => HIGH,
            Value::Element(_) => MID,
            Value::Variable(_) => LOW,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Constant(c) => write!(f, "{}", c),
            Value::Element(e) => write!(f, "{}", e),
            Value::Variable(v) => write!(f, "{}", v),
        }
    }
}

impl From<Constant> for Value {
    fn from(c: Constant) -> Self {
        Value::Constant(c)
    }
}

impl From<Element> for Value {
    fn from(e: Element) -> Self {
        Value::Element(e)
    }
}

impl From<Variable> for Value {
    fn from(v: Variable) -> Self {
        Value::Variable(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::builtin::GET_PROPERTY;
    use crate::function::FunctionRegistry;
    use crate::param::ParamNode;

    #[test]
    fn weights_order_constant_element_variable() {
        let c = Value::from(Constant::number(1));
        let e = Value::from(Element::number("age").unwrap());
        let registry = FunctionRegistry::with_builtins();
        let v = Value::from(Variable::new(&registry, GET_PROPERTY, ParamNode::empty()).unwrap());
        assert_eq!(c.weight(), HIGH);
        assert_eq!(e.weight(), MID);
        assert_eq!(v.weight(), LOW);
        assert!(HIGH < MID && MID < LOW);
    }

    #[test]
    fn constant_ignores_context() {
        let c = Value::from(Constant::text("hi"));
        assert_eq!(c.evaluate(&Context::new()).unwrap(), Datum::from("hi"));
        assert!(c.collect_references().is_empty());
    }

    #[test]
    fn element_references_itself() {
        let e = Element::number("age").unwrap();
        let refs = Value::from(e.clone()).collect_references();
        assert_eq!(refs, BTreeSet::from([e]));
    }
}
