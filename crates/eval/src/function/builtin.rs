//! Functions every engine can register without deployment-specific code.

use std::sync::Arc;

use crate::error::{EvalError, FunctionError};
use crate::types::{DataType, Datum};

use super::{Function, FunctionRegistry, Parameter};

pub const GET_PROPERTY: &str = "get_property";

/// Every built-in function.
pub fn all() -> Vec<Arc<dyn Function>> {
    vec![Arc::new(GetProperty)]
}

/// Register every built-in function whose name is still free. A function
/// the caller already registered under a built-in name is kept.
pub fn register_all(registry: &mut FunctionRegistry) -> Result<(), EvalError> {
    for function in all() {
        if !registry.contains(function.name()) {
            registry.register_shared(function)?;
        }
    }
    Ok(())
}

/// Reads one field out of an object.
///
/// Parameter: a Mapping `{ "object": <Record | Mapping | RawObject>,
/// "field": <Text> }`. A missing field is an error rather than a default.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetProperty;

impl Function for GetProperty {
    fn name(&self) -> &str {
        GET_PROPERTY
    }

    fn parameter_type(&self) -> DataType {
        DataType::Mapping
    }

    fn result_type(&self) -> DataType {
        DataType::GenericObject
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::new("object", DataType::GenericObject),
            Parameter::new("field", DataType::Text),
        ]
    }

    fn execute(&self, parameter: Datum) -> Result<Datum, FunctionError> {
        let mut args = match parameter {
            Datum::Map(args) => args,
            other => {
                return Err(FunctionError::InvalidArgument(format!(
                    "expected Mapping, got {}",
                    other.data_type()
                )))
            }
        };
        let field = args
            .get("field")
            .and_then(Datum::as_text)
            .map(str::to_string)
            .ok_or_else(|| FunctionError::InvalidArgument("missing text 'field'".into()))?;
        let object = args
            .remove("object")
            .ok_or_else(|| FunctionError::InvalidArgument("missing 'object'".into()))?;

        let found = match object {
            Datum::Record(mut record) => record.fields.remove(&field),
            Datum::Map(mut map) => map.remove(&field),
            Datum::Json(serde_json::Value::Object(mut obj)) => obj
                .remove(&field)
                .map(|v| Datum::from_json(&v))
                .transpose()
                .map_err(|e| FunctionError::Failed(e.to_string()))?,
            other => {
                return Err(FunctionError::InvalidArgument(format!(
                    "cannot read field '{}' from {}",
                    field,
                    other.data_type()
                )))
            }
        };
        found.ok_or_else(|| FunctionError::Failed(format!("no field '{}'", field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use std::collections::BTreeMap;

    fn args(object: Datum, field: &str) -> Datum {
        let mut map = BTreeMap::new();
        map.insert("object".to_string(), object);
        map.insert("field".to_string(), Datum::from(field));
        Datum::Map(map)
    }

    #[test]
    fn register_all_keeps_caller_functions() {
        let mut registry = FunctionRegistry::new();
        registry
            .register(crate::function::FunctionDef::new(
                GET_PROPERTY,
                DataType::Mapping,
                DataType::Text,
                |_| Ok(Datum::from("custom")),
            ))
            .unwrap();
        register_all(&mut registry).unwrap();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(GET_PROPERTY).unwrap().result_type(),
            DataType::Text
        );
    }

    #[test]
    fn reads_record_field() {
        let person = Record::new("Person").with_field("age", 18);
        let out = GetProperty.execute(args(person.into(), "age")).unwrap();
        assert_eq!(out, Datum::from(18));
    }

    #[test]
    fn reads_json_field() {
        let obj = Datum::Json(serde_json::json!({"age": 30, "name": "Ann"}));
        assert_eq!(
            GetProperty.execute(args(obj, "name")).unwrap(),
            Datum::from("Ann")
        );
    }

    #[test]
    fn missing_field_fails() {
        let person = Record::new("Person");
        let err = GetProperty.execute(args(person.into(), "age")).unwrap_err();
        assert_eq!(err, FunctionError::Failed("no field 'age'".into()));
    }

    #[test]
    fn scalar_object_rejected() {
        let err = GetProperty.execute(args(Datum::from(1), "age")).unwrap_err();
        assert!(matches!(err, FunctionError::InvalidArgument(_)));
    }
}
