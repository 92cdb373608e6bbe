//! Computed nodes backed by a registered function.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::EvalError;
use crate::function::{Function, FunctionRegistry};
use crate::param::ParamNode;
use crate::types::{Context, DataType, Datum};

use super::Element;

/// A node whose value is a function applied to a parameter graph.
///
/// The function is looked up and type-checked once, at construction.
/// Evaluation materializes the parameter, invokes the function, and checks
/// the result against the declared types.
#[derive(Clone)]
pub struct Variable {
    function: Arc<dyn Function>,
    parameter: ParamNode,
    expected: Option<DataType>,
}

impl Variable {
    pub fn new(
        registry: &FunctionRegistry,
        function_name: &str,
        parameter: impl Into<ParamNode>,
    ) -> Result<Self, EvalError> {
        let function = registry.get(function_name)?;
        let parameter = parameter.into();
        parameter.validate()?;

        let declared = function.parameter_type();
        let got = parameter.static_type();
        if !declared.accepts(got) {
            tracing::warn!(
                function = %function_name,
                expected = %declared,
                got = %got,
                "parameter not assignable"
            );
            return Err(EvalError::ParameterType {
                function: function_name.to_string(),
                expected: declared,
                got,
            });
        }

        Ok(Variable {
            function,
            parameter,
            expected: None,
        })
    }

    /// Narrow the result type this node promises. The function's declared
    /// result type must be compatible; every result is checked at evaluation.
    pub fn expecting(mut self, data_type: DataType) -> Result<Self, EvalError> {
        let produced = self.function.result_type();
        if !produced.accepts(data_type) && !data_type.accepts(produced) {
            return Err(EvalError::ResultType {
                function: self.function_name().to_string(),
                expected: data_type,
                got: produced,
            });
        }
        self.expected = Some(data_type);
        Ok(self)
    }

    pub fn function_name(&self) -> &str {
        self.function.name()
    }

    pub fn parameter(&self) -> &ParamNode {
        &self.parameter
    }

    pub fn result_type(&self) -> DataType {
        self.expected.unwrap_or_else(|| self.function.result_type())
    }

    pub fn collect_references(&self) -> BTreeSet<Element> {
        self.parameter.collect_references()
    }

    pub fn evaluate(&self, ctx: &Context) -> Result<Datum, EvalError> {
        let name = self.function_name();
        let parameter = self.parameter.materialize(ctx)?;

        let parameter_type = self.function.parameter_type();
        if !parameter_type.is_assignable(&parameter) {
            return Err(EvalError::ParameterMismatch {
                function: name.to_string(),
                expected: parameter_type,
                got: parameter.data_type(),
            });
        }

        let result = self
            .function
            .execute(parameter)
            .map_err(|source| EvalError::Function {
                name: name.to_string(),
                source,
            })?;

        for expected in [Some(self.function.result_type()), self.expected]
            .into_iter()
            .flatten()
        {
            if !expected.is_assignable(&result) {
                return Err(EvalError::ResultMismatch {
                    function: name.to_string(),
                    expected,
                    got: result.data_type(),
                });
            }
        }
        tracing::trace!(function = %name, result = %result, "variable evaluated");
        Ok(result)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.function_name() == other.function_name()
            && self.expected == other.expected
            && self.parameter == other.parameter
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.function_name().hash(state);
        self.expected.hash(state);
        self.parameter.hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("function", &self.function_name())
            .field("parameter", &self.parameter)
            .field("expected", &self.expected)
            .finish()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}(..)", self.result_type(), self.function_name())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
