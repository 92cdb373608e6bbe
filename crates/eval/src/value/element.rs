//! Context reference nodes.

use std::fmt;

use crate::error::EvalError;
use crate::types::{Context, DataType, Datum};

/// A reference to the context entry stored under `code`.
///
/// Identity is `(code, data_type)` only: the referenced value is unknown
/// until evaluation. The same code under a different data type is a
/// distinct dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element {
    code: String,
    data_type: DataType,
}

impl Element {
    pub fn new(data_type: DataType, code: impl Into<String>) -> Result<Self, EvalError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(EvalError::InvalidElement {
                message: "element code must not be blank".to_string(),
            });
        }
        Ok(Element { code, data_type })
    }

    pub fn text(code: impl Into<String>) -> Result<Self, EvalError> {
        Self::new(DataType::Text, code)
    }

    pub fn boolean(code: impl Into<String>) -> Result<Self, EvalError> {
        Self::new(DataType::Boolean, code)
    }

    pub fn number(code: impl Into<String>) -> Result<Self, EvalError> {
        Self::new(DataType::Number, code)
    }

    pub fn collection(code: impl Into<String>) -> Result<Self, EvalError> {
        Self::new(DataType::Collection, code)
    }

    pub fn mapping(code: impl Into<String>) -> Result<Self, EvalError> {
        Self::new(DataType::Mapping, code)
    }

    pub fn record(code: impl Into<String>) -> Result<Self, EvalError> {
        Self::new(DataType::StructuredObject, code)
    }

    pub fn json(code: impl Into<String>) -> Result<Self, EvalError> {
        Self::new(DataType::RawObject, code)
    }

    pub fn object(code: impl Into<String>) -> Result<Self, EvalError> {
        Self::new(DataType::GenericObject, code)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Look the code up in the context and check it against the declared type.
    pub fn evaluate(&self, ctx: &Context) -> Result<Datum, EvalError> {
        let value = ctx
            .get(&self.code)
            .ok_or_else(|| EvalError::MissingReference {
                code: self.code.clone(),
            })?;
        if !self.data_type.is_assignable(value) {
            return Err(EvalError::TypeMismatch {
                code: self.code.clone(),
                expected: self.data_type,
                got: value.data_type(),
            });
        }
        Ok(value.clone())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : ${}", self.data_type, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(e: &Element) -> u64 {
        let mut h = DefaultHasher::new();
        e.hash(&mut h);
        h.finish()
    }

    #[test]
    fn identity_is_code_and_type() {
        let a = Element::number("age").unwrap();
        let b = Element::new(DataType::Number, "age").unwrap();
        let c = Element::text("age").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn blank_code_rejected() {
        assert!(Element::number("  ").unwrap_err().is_configuration());
    }

    #[test]
    fn evaluate_reads_context() {
        let mut ctx = Context::new();
        ctx.put("age", 20);
        let e = Element::number("age").unwrap();
        assert_eq!(e.evaluate(&ctx).unwrap(), Datum::from(20));
    }

    #[test]
    fn evaluate_missing_key() {
        let e = Element::number("age").unwrap();
        assert_eq!(
            e.evaluate(&Context::new()).unwrap_err(),
            EvalError::MissingReference { code: "age".into() }
        );
    }

    #[test]
    fn evaluate_type_mismatch() {
        let mut ctx = Context::new();
        ctx.put("age", "twenty");
        let err = Element::number("age").unwrap().evaluate(&ctx).unwrap_err();
        assert_eq!(
            err,
            EvalError::TypeMismatch {
                code: "age".into(),
                expected: DataType::Number,
                got: DataType::Text,
            }
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn record_and_json_elements_check_their_variant() {
        let mut ctx = Context::new();
        ctx.put("person", Record::new("Person").with_field("age", 18));
        ctx.put("raw", Datum::Json(serde_json::json!({"age": 18})));
        assert!(Element::record("person").unwrap().evaluate(&ctx).is_ok());
        assert!(Element::json("raw").unwrap().evaluate(&ctx).is_ok());
        assert_eq!(
            Element::record("raw").unwrap().evaluate(&ctx).unwrap_err(),
            EvalError::TypeMismatch {
                code: "raw".into(),
                expected: DataType::StructuredObject,
                got: DataType::RawObject,
            }
        );
    }

    #[test]
    fn generic_element_accepts_anything() {
        let mut ctx = Context::new();
        ctx.put("x", true);
        assert!(Element::object("x").unwrap().evaluate(&ctx).is_ok());
    }
}
