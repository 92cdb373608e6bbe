//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! builtins = true
//!
//! [[http]]
//! name = "person"
//! url = "https://api.example.com/person"
//! result_type = "structured_object"
//! record_type = "Person"
//! timeout_ms = 2000
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::EvalError;
use crate::types::DataType;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Register the built-in functions.
    #[serde(default = "default_true")]
    pub builtins: bool,

    /// HTTP fetch functions to register.
    #[serde(default)]
    pub http: Vec<HttpFunctionConfig>,
}

/// One HTTP fetch function.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpFunctionConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_result_type")]
    pub result_type: DataType,
    /// Type name given to decoded records. Defaults to the function name.
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_result_type() -> DataType {
    DataType::GenericObject
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            builtins: true,
            http: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, EvalError> {
        toml::from_str(s).map_err(|e| EvalError::Config {
            message: e.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EvalError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EvalError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }
}
