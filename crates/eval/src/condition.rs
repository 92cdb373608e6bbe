//! Binary predicates over two expression nodes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::numeric;
use crate::types::{Context, Datum};
use crate::value::{Element, Value};

// ──────────────────────────────────────────────
// Symbol
// ──────────────────────────────────────────────

/// Comparison operators.
///
/// Ordering symbols require both operands to be numeric. Equality is
/// defined for every data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not_contains")]
    NotContains,
    #[serde(rename = "starts_with")]
    StartsWith,
    #[serde(rename = "ends_with")]
    EndsWith,
}

impl Symbol {
    pub const ALL: [Symbol; 10] = [
        Symbol::Eq,
        Symbol::Ne,
        Symbol::Lt,
        Symbol::Le,
        Symbol::Gt,
        Symbol::Ge,
        Symbol::Contains,
        Symbol::NotContains,
        Symbol::StartsWith,
        Symbol::EndsWith,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::Eq => "=",
            Symbol::Ne => "!=",
            Symbol::Lt => "<",
            Symbol::Le => "<=",
            Symbol::Gt => ">",
            Symbol::Ge => ">=",
            Symbol::Contains => "contains",
            Symbol::NotContains => "not_contains",
            Symbol::StartsWith => "starts_with",
            Symbol::EndsWith => "ends_with",
        }
    }

    /// Apply this operator to two resolved operands.
    pub fn apply(self, left: &Datum, right: &Datum) -> Result<bool, EvalError> {
        match self {
            Symbol::Eq => Ok(equals(left, right)),
            Symbol::Ne => Ok(!equals(left, right)),
            Symbol::Lt | Symbol::Le | Symbol::Gt | Symbol::Ge => {
                numeric::compare_numbers(left, right, self)
            }
            Symbol::Contains => contains(left, right, self),
            Symbol::NotContains => contains(left, right, self).map(|b| !b),
            Symbol::StartsWith | Symbol::EndsWith => {
                let (Some(l), Some(r)) = (left.as_text(), right.as_text()) else {
                    return Err(EvalError::TypeError {
                        message: format!(
                            "operator '{}' requires text, got {} and {}",
                            self,
                            left.data_type(),
                            right.data_type()
                        ),
                    });
                };
                Ok(if self == Symbol::StartsWith {
                    l.starts_with(r)
                } else {
                    l.ends_with(r)
                })
            }
        }
    }
}

/// Operator equality.
///
/// JSON numbers and strings coerce exactly as they do for ordering and
/// prefix operators: numbers compare by decimal value, text by content.
/// Any other pairing that involves a `RawObject` compares JSON renderings;
/// everything else compares natively.
fn equals(left: &Datum, right: &Datum) -> bool {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return l == r;
    }
    if let (Some(l), Some(r)) = (left.as_text(), right.as_text()) {
        return l == r;
    }
    match (left, right) {
        (Datum::Json(_), _) | (_, Datum::Json(_)) => left.to_json() == right.to_json(),
        _ => left == right,
    }
}

fn contains(haystack: &Datum, needle: &Datum, symbol: Symbol) -> Result<bool, EvalError> {
    match haystack {
        Datum::List(items) => Ok(items.iter().any(|item| equals(item, needle))),
        Datum::Map(map) => Ok(needle.as_text().is_some_and(|k| map.contains_key(k))),
        Datum::Record(record) => Ok(needle.as_text().is_some_and(|k| record.fields.contains_key(k))),
        Datum::Text(s) | Datum::Json(serde_json::Value::String(s)) => {
            Ok(needle.as_text().is_some_and(|n| s.contains(n)))
        }
        Datum::Json(serde_json::Value::Array(items)) => Ok(items
            .iter()
            .any(|item| equals(&Datum::Json(item.clone()), needle))),
        Datum::Json(serde_json::Value::Object(obj)) => {
            Ok(needle.as_text().is_some_and(|k| obj.contains_key(k)))
        }
        other => Err(EvalError::TypeError {
            message: format!("operator '{}' not defined for {}", symbol, other.data_type()),
        }),
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::ALL
            .into_iter()
            .find(|sym| sym.as_str() == s)
            .ok_or_else(|| EvalError::Config {
                message: format!("unknown operator: {}", s),
            })
    }
}

// ──────────────────────────────────────────────
// Condition
// ──────────────────────────────────────────────

/// `left <symbol> right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    left: Value,
    symbol: Symbol,
    right: Value,
}

impl Condition {
    pub fn new(left: impl Into<Value>, symbol: Symbol, right: impl Into<Value>) -> Self {
        Condition {
            left: left.into(),
            symbol,
            right: right.into(),
        }
    }

    pub fn left(&self) -> &Value {
        &self.left
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn right(&self) -> &Value {
        &self.right
    }

    /// Evaluate both operands (left first, always both) and compare.
    pub fn evaluate(&self, ctx: &Context) -> Result<bool, EvalError> {
        let left = self.left.evaluate(ctx)?;
        let right = self.right.evaluate(ctx)?;
        self.symbol.apply(&left, &right)
    }

    pub fn collect_references(&self) -> BTreeSet<Element> {
        let mut refs = self.left.collect_references();
        refs.extend(self.right.collect_references());
        refs
    }

    /// Cost of the most expensive operand.
    pub fn weight(&self) -> i32 {
        self.left.weight().max(self.right.weight())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {} ({})", self.left, self.symbol, self.right)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use crate::value::{Constant, HIGH, MID};

    fn age_ctx(age: i32) -> Context {
        let mut ctx = Context::new();
        ctx.put("age", age);
        ctx
    }

    fn adult() -> Condition {
        Condition::new(Element::number("age").unwrap(), Symbol::Ge, Constant::number(18))
    }

    #[test]
    fn numeric_ordering() {
        assert!(adult().evaluate(&age_ctx(20)).unwrap());
        assert!(adult().evaluate(&age_ctx(18)).unwrap());
        assert!(!adult().evaluate(&age_ctx(11)).unwrap());
    }

    #[test]
    fn ordering_requires_numbers() {
        let c = Condition::new(Constant::text("a"), Symbol::Lt, Constant::number(1));
        let err = c.evaluate(&Context::new()).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn both_sides_always_evaluated() {
        // The right side's failure surfaces even though the left resolves.
        let c = Condition::new(
            Constant::number(1),
            Symbol::Eq,
            Element::number("missing").unwrap(),
        );
        assert_eq!(
            c.evaluate(&Context::new()).unwrap_err(),
            EvalError::MissingReference {
                code: "missing".into()
            }
        );
    }

    #[test]
    fn equality_for_all_types() {
        let ctx = Context::new();
        let text = Condition::new(Constant::text("a"), Symbol::Eq, Constant::text("a"));
        assert!(text.evaluate(&ctx).unwrap());
        let rec = Record::new("P").with_field("x", 1);
        let records = Condition::new(
            Constant::record(rec.clone()),
            Symbol::Ne,
            Constant::record(rec.with_field("y", 2)),
        );
        assert!(records.evaluate(&ctx).unwrap());
        let mixed = Condition::new(Constant::text("1"), Symbol::Eq, Constant::number(1));
        assert!(!mixed.evaluate(&ctx).unwrap());
    }

    #[test]
    fn contains_on_collections_and_text() {
        let list = Datum::List(vec![Datum::from(1), Datum::from("a")]);
        assert!(Symbol::Contains.apply(&list, &Datum::from("a")).unwrap());
        assert!(Symbol::NotContains.apply(&list, &Datum::from(2)).unwrap());
        assert!(Symbol::Contains
            .apply(&Datum::from("hello"), &Datum::from("ell"))
            .unwrap());
        assert!(Symbol::Contains.apply(&Datum::from(1), &Datum::from(1)).is_err());
    }

    #[test]
    fn raw_json_operands_coerce_like_native_ones() {
        let vip = Datum::Json(serde_json::json!("vip"));
        assert!(Symbol::Eq.apply(&vip, &Datum::from("vip")).unwrap());
        assert!(Symbol::StartsWith.apply(&vip, &Datum::from("vi")).unwrap());
        assert!(Symbol::Contains.apply(&vip, &Datum::from("ip")).unwrap());
        assert!(Symbol::NotContains.apply(&vip, &Datum::from("x")).unwrap());

        let ages = Datum::Json(serde_json::json!([18.0, 21]));
        assert!(Symbol::Contains.apply(&ages, &Datum::from(18)).unwrap());
        assert!(Symbol::Contains
            .apply(&ages, &Datum::Json(serde_json::json!(21.0)))
            .unwrap());
        assert!(!Symbol::Contains.apply(&ages, &Datum::from("18")).unwrap());

        let flag = Datum::Json(serde_json::json!(true));
        assert!(Symbol::Eq.apply(&flag, &Datum::from(true)).unwrap());
        assert!(Symbol::Ne.apply(&vip, &Datum::from(1)).unwrap());
        assert!(Symbol::Contains.apply(&flag, &Datum::from(true)).is_err());
    }

    #[test]
    fn prefix_and_suffix() {
        let s = Datum::from("rule-engine");
        assert!(Symbol::StartsWith.apply(&s, &Datum::from("rule")).unwrap());
        assert!(Symbol::EndsWith.apply(&s, &Datum::from("engine")).unwrap());
        assert!(Symbol::EndsWith.apply(&s, &Datum::from(1)).is_err());
    }

    #[test]
    fn symbol_round_trips_through_text() {
        for sym in Symbol::ALL {
            assert_eq!(sym.as_str().parse::<Symbol>().unwrap(), sym);
        }
        assert!("=>".parse::<Symbol>().is_err());
        let parsed: Symbol = serde_json::from_str("\">=\"").unwrap();
        assert_eq!(parsed, Symbol::Ge);
    }

    #[test]
    fn references_and_weight() {
        let c = adult();
        assert_eq!(
            c.collect_references(),
            BTreeSet::from([Element::number("age").unwrap()])
        );
        assert_eq!(c.weight(), MID);
        let constants = Condition::new(Constant::number(1), Symbol::Eq, Constant::number(1));
        assert_eq!(constants.weight(), HIGH);
    }
}
