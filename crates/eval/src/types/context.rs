//! Per-evaluation key/value environment.

use std::collections::BTreeMap;

use super::Datum;
use crate::error::EvalError;

/// Values keyed by reference code, supplied by the caller for one evaluation.
///
/// The engine only reads from a context. A context should not be shared
/// between concurrent evaluations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context(BTreeMap<String, Datum>);

impl Context {
    pub fn new() -> Self {
        Context(BTreeMap::new())
    }

    /// Build a context from a JSON object, one entry per key.
    pub fn from_json(v: &serde_json::Value) -> Result<Self, EvalError> {
        let obj = v.as_object().ok_or_else(|| EvalError::TypeError {
            message: "context must be a JSON object".to_string(),
        })?;
        let mut ctx = Context::new();
        for (k, v) in obj {
            ctx.put(k.clone(), Datum::from_json(v)?);
        }
        Ok(ctx)
    }

    pub fn get(&self, code: &str) -> Option<&Datum> {
        self.0.get(code)
    }

    pub fn put(&mut self, code: impl Into<String>, value: impl Into<Datum>) {
        self.0.insert(code.into(), value.into());
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Datum>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (k, v) in iter {
            ctx.put(k, v);
        }
        ctx
    }
}
