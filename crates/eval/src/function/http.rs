//! HTTP fetch function: retrieves an external record via GET.
//!
//! Uses `ureq` (sync). The call blocks the evaluating thread; the optional
//! timeout from configuration is the only bound on how long it can take.

use std::time::Duration;

use crate::config::HttpFunctionConfig;
use crate::error::FunctionError;
use crate::types::{DataType, Datum};

use super::{Function, Parameter};

/// Function that fetches JSON from a fixed URL.
///
/// - The Mapping parameter becomes query parameters.
/// - `auth_token` from config or `RULEDECK_FUNCTION_<NAME>_AUTH_TOKEN` env var.
/// - The JSON body is decoded into the configured result type.
#[derive(Debug, Clone)]
pub struct HttpFunction {
    name: String,
    url: String,
    result_type: DataType,
    record_type: String,
    timeout: Option<Duration>,
    auth_token: Option<String>,
}

impl HttpFunction {
    pub fn new(config: &HttpFunctionConfig) -> Self {
        let auth_token = config.auth_token.clone().or_else(|| {
            let env_key = format!(
                "RULEDECK_FUNCTION_{}_AUTH_TOKEN",
                config.name.to_uppercase()
            );
            std::env::var(&env_key).ok()
        });

        HttpFunction {
            name: config.name.clone(),
            url: config.url.clone(),
            result_type: config.result_type,
            record_type: config
                .record_type
                .clone()
                .unwrap_or_else(|| config.name.clone()),
            timeout: config.timeout_ms.map(Duration::from_millis),
            auth_token,
        }
    }

    /// Render a Mapping parameter as query pairs.
    pub fn query_pairs(parameter: &Datum) -> Result<Vec<(String, String)>, FunctionError> {
        let Datum::Map(map) = parameter else {
            return Err(FunctionError::InvalidArgument(format!(
                "expected Mapping, got {}",
                parameter.data_type()
            )));
        };
        Ok(map
            .iter()
            .map(|(k, v)| {
                let rendered = match v {
                    Datum::Text(s) => s.clone(),
                    Datum::Number(d) => d.to_string(),
                    Datum::Bool(b) => b.to_string(),
                    other => other.to_json().to_string(),
                };
                (k.clone(), rendered)
            })
            .collect())
    }

    /// Decode a response body into this function's result type.
    pub fn decode(&self, body: serde_json::Value) -> Result<Datum, FunctionError> {
        let decoded = match self.result_type {
            DataType::RawObject => Datum::Json(body),
            DataType::StructuredObject => Datum::record_from_json(&self.record_type, &body)
                .map_err(|e| FunctionError::Failed(e.to_string()))?,
            _ => Datum::from_json(&body).map_err(|e| FunctionError::Failed(e.to_string()))?,
        };
        if !self.result_type.is_assignable(&decoded) {
            return Err(FunctionError::Failed(format!(
                "response decoded to {}, expected {}",
                decoded.data_type(),
                self.result_type
            )));
        }
        Ok(decoded)
    }
}

impl Function for HttpFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_type(&self) -> DataType {
        DataType::Mapping
    }

    fn result_type(&self) -> DataType {
        self.result_type
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![Parameter::new("query", DataType::Mapping)]
    }

    fn execute(&self, parameter: Datum) -> Result<Datum, FunctionError> {
        let query = Self::query_pairs(&parameter)?;

        let config = ureq::Agent::config_builder()
            .timeout_global(self.timeout)
            .build();
        let agent: ureq::Agent = config.into();
        let mut request = agent.get(&self.url);
        for (k, v) in &query {
            request = request.query(k, v);
        }
        if let Some(ref token) = self.auth_token {
            request = request.header("Authorization", &format!("Bearer {}", token));
        }

        tracing::debug!(function = %self.name, url = %self.url, "http fetch");
        let response = request.call().map_err(|e| {
            tracing::warn!(function = %self.name, error = %e, "http fetch failed");
            FunctionError::Failed(e.to_string())
        })?;

        let body: serde_json::Value = response.into_body().read_json().map_err(|e| {
            FunctionError::Failed(format!("failed to parse response as JSON: {}", e))
        })?;

        self.decode(body)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
