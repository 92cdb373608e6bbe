//! The rule engine: function registry plus rules grouped by id.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::EvalError;
use crate::function::{builtin, Function, FunctionRegistry};
use crate::rules::{Rule, RuleSet};
use crate::types::{Context, Datum};
use crate::value::Element;

/// Result of executing a rule id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The first satisfied candidate's action value.
    Matched(Datum),
    /// Every guard was false and there is no fallback. Not an error.
    NoMatch,
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::Matched(_))
    }

    pub fn value(&self) -> Option<&Datum> {
        match self {
            Outcome::Matched(d) => Some(d),
            Outcome::NoMatch => None,
        }
    }

    pub fn into_value(self) -> Option<Datum> {
        match self {
            Outcome::Matched(d) => Some(d),
            Outcome::NoMatch => None,
        }
    }
}

/// Registered rules and the functions their nodes were built against.
///
/// Build once, then share: `execute` takes `&self`, so concurrent calls are
/// safe as long as each supplies its own [`Context`].
#[derive(Debug)]
pub struct Engine {
    registry: FunctionRegistry,
    rules: HashMap<String, RuleSet>,
    next_sequence: u64,
}

impl Engine {
    /// An engine with the built-in functions registered.
    pub fn new() -> Self {
        Self::with_registry(FunctionRegistry::with_builtins())
    }

    pub fn with_registry(registry: FunctionRegistry) -> Self {
        Engine {
            registry,
            rules: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Build an engine from configuration, registering the configured
    /// functions.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EvalError> {
        let mut registry = FunctionRegistry::new();
        if config.builtins {
            builtin::register_all(&mut registry)?;
        }
        for http in &config.http {
            #[cfg(feature = "http")]
            registry.register(crate::function::http::HttpFunction::new(http))?;
            #[cfg(not(feature = "http"))]
            return Err(EvalError::Config {
                message: format!(
                    "http function '{}' configured but http support is disabled",
                    http.name
                ),
            });
        }
        Ok(Self::with_registry(registry))
    }

    // ──────────────────────────────────────────────
    // Functions
    // ──────────────────────────────────────────────

    pub fn register_function(&mut self, function: impl Function + 'static) -> Result<(), EvalError> {
        self.registry.register(function)
    }

    pub fn function(&self, name: &str) -> Result<Arc<dyn Function>, EvalError> {
        self.registry.get(name)
    }

    /// The registry nodes for this engine should be built against.
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    // ──────────────────────────────────────────────
    // Rules
    // ──────────────────────────────────────────────

    /// Append a candidate under `rule.id()`.
    pub fn add_rule(&mut self, rule: Rule) -> Result<(), EvalError> {
        let sequence = self.next_sequence;
        let id = rule.id().to_string();
        tracing::debug!(
            rule = %id,
            weight = rule.weight(),
            fallback = rule.is_fallback(),
            "adding rule"
        );
        self.rules.entry(id).or_default().insert(sequence, rule)?;
        self.next_sequence += 1;
        Ok(())
    }

    /// Resolve `id` against `ctx`.
    ///
    /// Unknown ids are a configuration error. When no candidate matches
    /// the result is [`Outcome::NoMatch`].
    pub fn execute(&self, id: &str, ctx: &Context) -> Result<Outcome, EvalError> {
        let set = self.rule_set(id)?;
        let outcome = match set.resolve(ctx)? {
            Some(value) => Outcome::Matched(value),
            None => Outcome::NoMatch,
        };
        tracing::debug!(rule = %id, matched = outcome.is_match(), "rule executed");
        Ok(outcome)
    }

    /// Every context reference any candidate under `id` depends on.
    pub fn dependencies(&self, id: &str) -> Result<BTreeSet<Element>, EvalError> {
        Ok(self.rule_set(id)?.collect_references())
    }

    /// References under `id` whose codes the context does not supply.
    /// Empty means the context can at least feed every candidate.
    pub fn missing_references(&self, id: &str, ctx: &Context) -> Result<Vec<Element>, EvalError> {
        Ok(self
            .dependencies(id)?
            .into_iter()
            .filter(|e| !ctx.contains(e.code()))
            .collect())
    }

    /// Candidates under `id`, in resolution order.
    pub fn candidates(&self, id: &str) -> Result<Vec<&Rule>, EvalError> {
        Ok(self.rule_set(id)?.iter().collect())
    }

    /// Registered rule ids, sorted.
    pub fn rule_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    fn rule_set(&self, id: &str) -> Result<&RuleSet, EvalError> {
        self.rules
            .get(id)
            .ok_or_else(|| EvalError::UnknownRule { id: id.to_string() })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
