//! Response evaluator.
//!
//! Maps an actual response body, an expected value and a check mode to a
//! pass/fail verdict. Internal failures are classified as [`EvalError`] and
//! collapse to `false` at the [`evaluate`] boundary, so ambiguous input never
//! counts as passing.

use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::debug;

use crate::types::CheckType;

/// Reasons an evaluation could not produce a verdict.
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    /// Check mode is missing or not recognized
    #[error("unsupported check type: {0}")]
    UnknownMode(String),

    /// A value had a shape the mode cannot work with
    #[error("type mismatch: {0}")]
    TypeMismatch(&'static str),

    /// A `range` bound has no `max` value
    #[error("range bound for `{0}` has no max value")]
    MissingBound(String),
}

/// Evaluate `actual` against `expected` using `check_type`.
///
/// Never fails: any [`EvalError`] yields `false`.
pub fn evaluate(actual: &Value, expected: &Value, check_type: Option<&CheckType>) -> bool {
    match try_evaluate(actual, expected, check_type) {
        Ok(passed) => passed,
        Err(err) => {
            debug!(error = %err, "Evaluation could not complete, counting as failure");
            false
        }
    }
}

/// Evaluate, surfacing the reason when no verdict can be produced.
pub fn try_evaluate(
    actual: &Value,
    expected: &Value,
    check_type: Option<&CheckType>,
) -> Result<bool, EvalError> {
    match check_type {
        Some(CheckType::Exact) => Ok(json_eq(actual, expected)),
        Some(CheckType::Contains) => check_contains(actual, expected),
        Some(CheckType::Range) => check_range(actual, expected),
        Some(CheckType::RangeContains) => check_range_contains(actual, expected),
        Some(CheckType::Unknown(mode)) => Err(EvalError::UnknownMode(mode.clone())),
        None => Err(EvalError::UnknownMode("<none>".to_string())),
    }
}

/// Deep JSON equality where numbers compare by value (`1 == 1.0`).
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_eq(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Integers compare exactly; `f64` is used only when either side is a float.
fn number_eq(x: &Number, y: &Number) -> bool {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return x == y;
    }
    if x.is_f64() || y.is_f64() {
        return match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        };
    }
    // one negative i64 and one u64 above i64::MAX
    false
}

fn check_contains(actual: &Value, expected: &Value) -> Result<bool, EvalError> {
    if let Value::Object(expected) = expected {
        let actual = as_object(actual)?;
        return Ok(expected
            .iter()
            .all(|(k, v)| actual.get(k).is_some_and(|a| json_eq(a, v))));
    }

    match actual {
        Value::String(haystack) => match expected {
            Value::String(needle) => Ok(haystack.contains(needle.as_str())),
            _ => Err(EvalError::TypeMismatch("non-string needle in string")),
        },
        Value::Array(items) => Ok(items.iter().any(|item| json_eq(item, expected))),
        Value::Object(map) => match expected {
            Value::String(key) => Ok(map.contains_key(key)),
            Value::Array(_) => Err(EvalError::TypeMismatch("array used as object key")),
            _ => Ok(false),
        },
        _ => Err(EvalError::TypeMismatch("contains on scalar response")),
    }
}

fn check_range(actual: &Value, expected: &Value) -> Result<bool, EvalError> {
    for (key, bound) in as_object(expected)? {
        let bound = bound
            .as_object()
            .ok_or(EvalError::TypeMismatch("range bound is not an object"))?;
        let max = bound
            .get("max")
            .ok_or_else(|| EvalError::MissingBound(key.clone()))?;
        if !within_max(actual, key, max)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn check_range_contains(actual: &Value, expected: &Value) -> Result<bool, EvalError> {
    for (key, bound) in as_object(expected)? {
        match bound {
            Value::Object(bounds) if bounds.contains_key("max") => {
                if !within_max(actual, key, &bounds["max"])? {
                    return Ok(false);
                }
            }
            Value::Array(allowed) => {
                let value = as_object(actual)?.get(key).unwrap_or(&Value::Null);
                if !allowed.iter().any(|a| json_eq(a, value)) {
                    return Ok(false);
                }
            }
            _ => {}
        }
    }
    Ok(true)
}

/// `actual[key]` (0 when absent) must not exceed `max`.
fn within_max(actual: &Value, key: &str, max: &Value) -> Result<bool, EvalError> {
    let max = max
        .as_f64()
        .ok_or(EvalError::TypeMismatch("max bound is not a number"))?;
    let value = match as_object(actual)?.get(key) {
        None => 0.0,
        Some(v) => v
            .as_f64()
            .ok_or(EvalError::TypeMismatch("ranged value is not a number"))?,
    };
    Ok(value <= max)
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, EvalError> {
    value
        .as_object()
        .ok_or(EvalError::TypeMismatch("expected a JSON object"))
}
