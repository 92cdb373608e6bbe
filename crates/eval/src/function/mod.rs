//! Function contract and the per-engine function registry.
//!
//! Two levels:
//! - [`Function`]: one named unit of work with declared parameter and
//!   result types
//! - [`FunctionRegistry`]: the name-keyed catalog a [`Variable`] resolves
//!   its function from, once, at construction time
//!
//! [`Variable`]: crate::value::Variable

pub mod builtin;
#[cfg(feature = "http")]
pub mod http;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{EvalError, FunctionError};
use crate::types::{DataType, Datum};

// ──────────────────────────────────────────────
// Function trait
// ──────────────────────────────────────────────

/// Descriptive metadata for one logical input of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub data_type: DataType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Parameter {
            name: name.into(),
            data_type,
        }
    }
}

/// A named, registered unit of computation.
///
/// Implementations may block (for example on network I/O); the engine
/// calls them synchronously and imposes no timeout of its own.
pub trait Function: Send + Sync {
    fn name(&self) -> &str;

    /// Declared type of the single parameter `execute` receives.
    fn parameter_type(&self) -> DataType;

    /// Declared type of every value `execute` returns.
    fn result_type(&self) -> DataType;

    /// Introspection metadata describing the parameter's shape.
    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    /// Run the function over a fully materialized parameter.
    fn execute(&self, parameter: Datum) -> Result<Datum, FunctionError>;
}

type Body = dyn Fn(Datum) -> Result<Datum, FunctionError> + Send + Sync;

/// A [`Function`] backed by a closure.
pub struct FunctionDef {
    name: String,
    parameter_type: DataType,
    result_type: DataType,
    parameters: Vec<Parameter>,
    body: Box<Body>,
}

impl FunctionDef {
    pub fn new(
        name: impl Into<String>,
        parameter_type: DataType,
        result_type: DataType,
        body: impl Fn(Datum) -> Result<Datum, FunctionError> + Send + Sync + 'static,
    ) -> Self {
        FunctionDef {
            name: name.into(),
            parameter_type,
            result_type,
            parameters: Vec::new(),
            body: Box::new(body),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.parameters.push(Parameter::new(name, data_type));
        self
    }
}

impl Function for FunctionDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_type(&self) -> DataType {
        self.parameter_type
    }

    fn result_type(&self) -> DataType {
        self.result_type
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.parameters.clone()
    }

    fn execute(&self, parameter: Datum) -> Result<Datum, FunctionError> {
        (self.body)(parameter)
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("parameter_type", &self.parameter_type)
            .field("result_type", &self.result_type)
            .finish_non_exhaustive()
    }
}

// ──────────────────────────────────────────────
// FunctionRegistry
// ──────────────────────────────────────────────

/// Append-only catalog of functions keyed by unique name.
///
/// Populated at bootstrap, read during evaluation. Cloning is cheap: the
/// functions themselves are shared.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in functions.
    pub fn with_builtins() -> Self {
        FunctionRegistry {
            functions: builtin::all()
                .into_iter()
                .map(|f| (f.name().to_string(), f))
                .collect(),
        }
    }

    /// Register a function. Fails if the name is already taken.
    pub fn register(&mut self, function: impl Function + 'static) -> Result<(), EvalError> {
        self.register_shared(Arc::new(function))
    }

    pub fn register_shared(&mut self, function: Arc<dyn Function>) -> Result<(), EvalError> {
        let name = function.name().to_string();
        if self.functions.contains_key(&name) {
            return Err(EvalError::DuplicateFunction { name });
        }
        tracing::debug!(
            function = %name,
            parameter = %function.parameter_type(),
            result = %function.result_type(),
            "registered function"
        );
        self.functions.insert(name, function);
        Ok(())
    }

    /// Look up a function by name. Absence is a configuration error.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Function>, EvalError> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownFunction {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
