//! Error types for rule construction and evaluation.
//!
//! Failures fall into two classes. Configuration errors are raised while
//! building nodes, registering functions or rules, and are never retried.
//! Execution errors are raised while evaluating against a [`Context`] and
//! are surfaced unchanged to the caller of [`Engine::execute`].
//!
//! Neither class overlaps with [`Outcome::NoMatch`], which is a legitimate
//! result rather than a failure.
//!
//! [`Context`]: crate::Context
//! [`Engine::execute`]: crate::Engine::execute
//! [`Outcome::NoMatch`]: crate::Outcome::NoMatch

use crate::types::DataType;

/// Error returned by a [`Function`](crate::Function) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FunctionError {
    /// The parameter was well-typed but its content is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The function's own work failed (network, computation, ...).
    #[error("{0}")]
    Failed(String),
}

/// All errors produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    // ── configuration ──────────────────────────
    /// A Variable named a function that is not registered.
    #[error("function not registered: {name}")]
    UnknownFunction { name: String },

    /// A function with this name is already registered.
    #[error("function already registered: {name}")]
    DuplicateFunction { name: String },

    /// A Variable's parameter cannot bind to the function's parameter type.
    #[error("function '{function}' parameter {got} is not assignable to {expected}")]
    ParameterType {
        function: String,
        expected: DataType,
        got: DataType,
    },

    /// A constant literal does not fit its declared data type.
    #[error("constant {got} is not assignable to {expected}")]
    ConstantType { expected: DataType, got: DataType },

    /// A record field's content can never fit its typed slot.
    #[error("field '{record}.{field}' holds {got}, slot is {expected}")]
    FieldType {
        record: String,
        field: String,
        expected: DataType,
        got: DataType,
    },

    /// A Variable's narrowed result type is incompatible with its function.
    #[error("function '{function}' returns {got}, which can never produce {expected}")]
    ResultType {
        function: String,
        expected: DataType,
        got: DataType,
    },

    /// An Element was built with an unusable code.
    #[error("invalid element: {message}")]
    InvalidElement { message: String },

    /// `execute` was called with an id that has no registered rules.
    #[error("unknown rule: {id}")]
    UnknownRule { id: String },

    /// A second unconditional rule was registered for the same id.
    #[error("rule '{id}' already has an unconditional fallback")]
    DuplicateFallback { id: String },

    /// Engine configuration could not be loaded.
    #[error("configuration error: {message}")]
    Config { message: String },

    // ── execution ──────────────────────────────
    /// A referenced context key is absent.
    #[error("missing context value: {code}")]
    MissingReference { code: String },

    /// A context value does not match the referencing Element's data type.
    #[error("type mismatch for '{code}': expected {expected}, got {got}")]
    TypeMismatch {
        code: String,
        expected: DataType,
        got: DataType,
    },

    /// An operator was applied to operands it does not support.
    #[error("type error: {message}")]
    TypeError { message: String },

    /// A registered function signalled failure.
    #[error("function '{name}' failed: {source}")]
    Function {
        name: String,
        #[source]
        source: FunctionError,
    },

    /// A function returned a value outside its declared result type.
    #[error("function '{function}' returned {got}, expected {expected}")]
    ResultMismatch {
        function: String,
        expected: DataType,
        got: DataType,
    },

    /// A materialized parameter does not fit the function's parameter type.
    #[error("function '{function}' received {got}, expected {expected}")]
    ParameterMismatch {
        function: String,
        expected: DataType,
        got: DataType,
    },

    /// A materialized record field does not fit its typed slot.
    #[error("field '{record}.{field}' resolved to {got}, expected {expected}")]
    FieldMismatch {
        record: String,
        field: String,
        expected: DataType,
        got: DataType,
    },
}

impl EvalError {
    /// True for failures raised while building or registering, false for
    /// failures raised while evaluating against a context.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EvalError::UnknownFunction { .. }
                | EvalError::DuplicateFunction { .. }
                | EvalError::ParameterType { .. }
                | EvalError::ConstantType { .. }
                | EvalError::FieldType { .. }
                | EvalError::ResultType { .. }
                | EvalError::InvalidElement { .. }
                | EvalError::UnknownRule { .. }
                | EvalError::DuplicateFallback { .. }
                | EvalError::Config { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classes() {
        assert!(EvalError::UnknownRule { id: "r".into() }.is_configuration());
        assert!(!EvalError::MissingReference { code: "age".into() }.is_configuration());
        let wrapped = EvalError::Function {
            name: "fetch".into(),
            source: FunctionError::Failed("connection refused".into()),
        };
        assert!(!wrapped.is_configuration());
        assert_eq!(
            wrapped.to_string(),
            "function 'fetch' failed: connection refused"
        );
    }

    #[test]
    fn type_mismatch_display() {
        let err = EvalError::TypeMismatch {
            code: "age".into(),
            expected: DataType::Number,
            got: DataType::Text,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch for 'age': expected Number, got Text"
        );
    }
}
