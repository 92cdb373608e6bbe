//! Numeric coercion and ordering using `rust_decimal`.
//!
//! All numeric comparison goes through `Decimal`. No `f64` anywhere in the
//! evaluation path.

use rust_decimal::Decimal;

use crate::condition::Symbol;
use crate::error::EvalError;
use crate::types::Datum;

/// Coerce a datum to `Decimal`. `Number` and JSON numbers qualify.
pub fn coerce_to_decimal(val: &Datum, symbol: Symbol) -> Result<Decimal, EvalError> {
    val.as_number().ok_or_else(|| EvalError::TypeError {
        message: format!(
            "operator '{}' requires numbers, got {}",
            symbol,
            val.data_type()
        ),
    })
}

/// Compare two numeric datums with an ordering or equality symbol.
pub fn compare_numbers(left: &Datum, right: &Datum, symbol: Symbol) -> Result<bool, EvalError> {
    let l = coerce_to_decimal(left, symbol)?;
    let r = coerce_to_decimal(right, symbol)?;
    compare_decimals(l, r, symbol)
}

fn compare_decimals(l: Decimal, r: Decimal, symbol: Symbol) -> Result<bool, EvalError> {
    match symbol {
        Symbol::Eq => Ok(l == r),
        Symbol::Ne => Ok(l != r),
        Symbol::Lt => Ok(l < r),
        Symbol::Le => Ok(l <= r),
        Symbol::Gt => Ok(l > r),
        Symbol::Ge => Ok(l >= r),
        other => Err(EvalError::TypeError {
            message: format!("operator '{}' is not a numeric comparison", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ordering_on_numbers() {
        let a = Datum::from(18);
        let b = Datum::Number(Decimal::from_str("18.5").unwrap());
        assert!(compare_numbers(&a, &b, Symbol::Lt).unwrap());
        assert!(compare_numbers(&b, &a, Symbol::Ge).unwrap());
        assert!(!compare_numbers(&a, &b, Symbol::Eq).unwrap());
    }

    #[test]
    fn json_numbers_are_coerced() {
        let a = Datum::Json(serde_json::json!(20));
        assert!(compare_numbers(&a, &Datum::from(18), Symbol::Gt).unwrap());
    }

    #[test]
    fn non_numeric_operand_is_type_error() {
        let err = compare_numbers(&Datum::from("18"), &Datum::from(18), Symbol::Ge).unwrap_err();
        assert_eq!(
            err,
            EvalError::TypeError {
                message: "operator '>=' requires numbers, got Text".into()
            }
        );
    }

    #[test]
    fn non_numeric_symbol_rejected() {
        assert!(compare_numbers(&Datum::from(1), &Datum::from(1), Symbol::Contains).is_err());
    }
}
