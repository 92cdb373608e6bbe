//! Rules and weighted candidate resolution.
//!
//! Several rules may share one id. They are tried in ascending weight; the
//! first whose condition holds (or which has none) supplies the result.
//! Equal weights resolve in registration order, and the unconditional
//! fallback is always tried last.

use std::collections::BTreeSet;

use crate::condition::Condition;
use crate::error::EvalError;
use crate::types::{Context, Datum};
use crate::value::{Element, Value};

/// Weight of an unconditional rule.
pub const FALLBACK_WEIGHT: i32 = i32::MAX;

/// A guarded action under a rule id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    id: String,
    condition: Option<Condition>,
    action: Value,
    weight: i32,
}

impl Rule {
    /// A conditioned rule. The weight is chosen by the caller.
    pub fn new(
        id: impl Into<String>,
        condition: Condition,
        action: impl Into<Value>,
        weight: i32,
    ) -> Self {
        Rule {
            id: id.into(),
            condition: Some(condition),
            action: action.into(),
            weight,
        }
    }

    /// The unconditional default for an id.
    pub fn fallback(id: impl Into<String>, action: impl Into<Value>) -> Self {
        Rule {
            id: id.into(),
            condition: None,
            action: action.into(),
            weight: FALLBACK_WEIGHT,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn action(&self) -> &Value {
        &self.action
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn is_fallback(&self) -> bool {
        self.condition.is_none()
    }

    /// References of the guard and the action together.
    pub fn collect_references(&self) -> BTreeSet<Element> {
        let mut refs = self
            .condition
            .as_ref()
            .map(Condition::collect_references)
            .unwrap_or_default();
        refs.extend(self.action.collect_references());
        refs
    }

    /// Evaluate the guard; if it holds, evaluate and return the action.
    pub fn apply(&self, ctx: &Context) -> Result<Option<Datum>, EvalError> {
        if let Some(condition) = &self.condition {
            if !condition.evaluate(ctx)? {
                return Ok(None);
            }
        }
        self.action.evaluate(ctx).map(Some)
    }
}

// ──────────────────────────────────────────────
// Candidate list
// ──────────────────────────────────────────────

/// All rules registered under one id, kept in resolution order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    // (sequence, rule), sorted by (weight, is_fallback, sequence)
    candidates: Vec<(u64, Rule)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping resolution order. A second fallback is rejected.
    pub fn insert(&mut self, sequence: u64, rule: Rule) -> Result<(), EvalError> {
        if rule.is_fallback() && self.has_fallback() {
            return Err(EvalError::DuplicateFallback {
                id: rule.id.clone(),
            });
        }
        let key = (rule.weight, rule.is_fallback(), sequence);
        let pos = self
            .candidates
            .partition_point(|(seq, r)| (r.weight, r.is_fallback(), *seq) <= key);
        self.candidates.insert(pos, (sequence, rule));
        Ok(())
    }

    /// Rules in the order they will be tried.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.candidates.iter().map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn has_fallback(&self) -> bool {
        self.iter().any(Rule::is_fallback)
    }

    /// Try candidates in order; the first match wins. `None` means no
    /// candidate matched.
    pub fn resolve(&self, ctx: &Context) -> Result<Option<Datum>, EvalError> {
        for (position, rule) in self.iter().enumerate() {
            let result = rule.apply(ctx)?;
            tracing::debug!(
                rule = %rule.id,
                position,
                weight = rule.weight,
                matched = result.is_some(),
                "candidate evaluated"
            );
            if result.is_some() {
                return Ok(result);
            }
        }
        Ok(None)
    }

    pub fn collect_references(&self) -> BTreeSet<Element> {
        self.iter().flat_map(Rule::collect_references).collect()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
