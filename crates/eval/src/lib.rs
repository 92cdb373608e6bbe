//! Typed expression evaluation and weighted rule resolution.
//!
//! Rules are built from three kinds of expression node: constants,
//! context references ([`Element`]) and function calls ([`Variable`]).
//! Nodes are type-checked when they are built, against the
//! [`FunctionRegistry`] owned by an [`Engine`], and evaluated later against
//! a caller-supplied [`Context`].
//!
//! Several rules may share an id. [`Engine::execute`] tries them cheapest
//! first and returns the action of the first one whose condition holds,
//! falling back to the unconditional rule when none do.

pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod function;
pub mod numeric;
pub mod param;
pub mod rules;
pub mod types;
pub mod value;

pub use condition::{Condition, Symbol};
pub use config::{EngineConfig, HttpFunctionConfig};
pub use engine::{Engine, Outcome};
pub use error::{EvalError, FunctionError};
pub use function::{Function, FunctionDef, FunctionRegistry, Parameter};
pub use param::{AutoResolve, ParamNode, ParamRecord, Slot};
pub use rules::{Rule, RuleSet};
pub use types::{Context, DataType, Datum, Record};
pub use value::{Constant, Element, Value, Variable};
