//! Arithmetic operations: `+ - * /`, n-ary with identity elements 0
//! and 1 where applicable, plus the unary/binary numeric procedures
//! required as core builtins rather than prelude functions (`abs`,
//! `sqrt`, `remainder`, `modulo`, `floor`, `ceiling`, `truncate`,
//! `round`).
//!
//! Grounded on the teacher's `builtins/arithmetic.rs` variadic-loop
//! shape; reworked to the Pair-based `Value` and the new `EvalError`
//! taxonomy (`type_error`/`arity_error`/`runtime_error` instead of the
//! teacher's unit-variant `TypeError`/`ArityMismatch`).

use std::rc::Rc;

use crate::env::Environment;
use crate::error::{EvalError, ARITY_AT_LEAST_ONE, ARITY_ONE, ARITY_TWO};
use crate::value::Value;

fn as_number(function: &str, v: &Value, position: usize) -> Result<f64, EvalError> {
    match v {
        Value::Number(n) => Ok(*n),
        other => Err(EvalError::type_error(function, "number", other, position)),
    }
}

/// Returns the sum of all arguments. `(+)` is `0`.
pub fn add(args: &[Value]) -> Result<Value, EvalError> {
    let mut sum = 0.0;
    for (i, arg) in args.iter().enumerate() {
        sum += as_number("+", arg, i)?;
    }
    Ok(Value::Number(sum))
}

/// Subtracts subsequent arguments from the first. One argument
/// negates it.
pub fn sub(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("-", ARITY_AT_LEAST_ONE, 0));
    }
    let first = as_number("-", &args[0], 0)?;
    if args.len() == 1 {
        return Ok(Value::Number(-first));
    }
    let mut result = first;
    for (i, arg) in args[1..].iter().enumerate() {
        result -= as_number("-", arg, i + 1)?;
    }
    Ok(Value::Number(result))
}

/// Returns the product of all arguments. `(*)` is `1`.
pub fn mul(args: &[Value]) -> Result<Value, EvalError> {
    let mut product = 1.0;
    for (i, arg) in args.iter().enumerate() {
        product *= as_number("*", arg, i)?;
    }
    Ok(Value::Number(product))
}

/// Divides the first argument by subsequent arguments. One argument
/// returns its reciprocal.
pub fn div(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("/", ARITY_AT_LEAST_ONE, 0));
    }
    let first = as_number("/", &args[0], 0)?;
    if args.len() == 1 {
        if first == 0.0 {
            return Err(EvalError::runtime_error("/", "division by zero"));
        }
        return Ok(Value::Number(1.0 / first));
    }
    let mut result = first;
    for (i, arg) in args[1..].iter().enumerate() {
        let n = as_number("/", arg, i + 1)?;
        if n == 0.0 {
            return Err(EvalError::runtime_error("/", "division by zero"));
        }
        result /= n;
    }
    Ok(Value::Number(result))
}

/// Absolute value. Exactly one argument.
pub fn abs(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("abs", ARITY_ONE, args.len()));
    }
    Ok(Value::Number(as_number("abs", &args[0], 0)?.abs()))
}

/// Square root. Exactly one argument.
pub fn sqrt(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("sqrt", ARITY_ONE, args.len()));
    }
    Ok(Value::Number(as_number("sqrt", &args[0], 0)?.sqrt()))
}

/// Remainder on division, carrying the sign of the dividend.
pub fn remainder(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("remainder", ARITY_TWO, args.len()));
    }
    let a = as_number("remainder", &args[0], 0)?;
    let b = as_number("remainder", &args[1], 1)?;
    if b == 0.0 {
        return Err(EvalError::runtime_error("remainder", "division by zero"));
    }
    Ok(Value::Number(a - b * (a / b).trunc()))
}

/// Modulo on division, carrying the sign of the divisor.
pub fn modulo(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("modulo", ARITY_TWO, args.len()));
    }
    let a = as_number("modulo", &args[0], 0)?;
    let b = as_number("modulo", &args[1], 1)?;
    if b == 0.0 {
        return Err(EvalError::runtime_error("modulo", "division by zero"));
    }
    Ok(Value::Number(a - b * (a / b).floor()))
}

/// Largest integer not greater than the argument.
pub fn floor(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("floor", ARITY_ONE, args.len()));
    }
    Ok(Value::Number(as_number("floor", &args[0], 0)?.floor()))
}

/// Smallest integer not less than the argument.
pub fn ceiling(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("ceiling", ARITY_ONE, args.len()));
    }
    Ok(Value::Number(as_number("ceiling", &args[0], 0)?.ceil()))
}

/// Integer part of the argument, toward zero.
pub fn truncate(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("truncate", ARITY_ONE, args.len()));
    }
    Ok(Value::Number(as_number("truncate", &args[0], 0)?.trunc()))
}

/// Nearest integer, ties to even (matches `f64::round_ties_even`).
pub fn round(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("round", ARITY_ONE, args.len()));
    }
    Ok(Value::Number(as_number("round", &args[0], 0)?.round_ties_even()))
}

pub fn register(env: &Rc<Environment>) {
    env.define("+".to_string(), Value::Builtin("+", add));
    env.define("-".to_string(), Value::Builtin("-", sub));
    env.define("*".to_string(), Value::Builtin("*", mul));
    env.define("/".to_string(), Value::Builtin("/", div));
    env.define("abs".to_string(), Value::Builtin("abs", abs));
    env.define("sqrt".to_string(), Value::Builtin("sqrt", sqrt));
    env.define("remainder".to_string(), Value::Builtin("remainder", remainder));
    env.define("modulo".to_string(), Value::Builtin("modulo", modulo));
    env.define("floor".to_string(), Value::Builtin("floor", floor));
    env.define("ceiling".to_string(), Value::Builtin("ceiling", ceiling));
    env.define("truncate".to_string(), Value::Builtin("truncate", truncate));
    env.define("round".to_string(), Value::Builtin("round", round));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_variadic_and_identity() {
        assert!(matches!(add(&[]).unwrap(), Value::Number(n) if n == 0.0));
        let sum = add(&[Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]).unwrap();
        assert!(matches!(sum, Value::Number(n) if n == 6.0));
    }

    #[test]
    fn test_sub_negation_and_chain() {
        assert!(matches!(sub(&[Value::Number(5.0)]).unwrap(), Value::Number(n) if n == -5.0));
        let r = sub(&[Value::Number(10.0), Value::Number(3.0), Value::Number(2.0)]).unwrap();
        assert!(matches!(r, Value::Number(n) if n == 5.0));
    }

    #[test]
    fn test_mul_identity() {
        assert!(matches!(mul(&[]).unwrap(), Value::Number(n) if n == 1.0));
    }

    #[test]
    fn test_div_reciprocal_and_chain() {
        assert!(matches!(div(&[Value::Number(4.0)]).unwrap(), Value::Number(n) if n == 0.25));
        let r = div(&[Value::Number(20.0), Value::Number(4.0), Value::Number(2.0)]).unwrap();
        assert!(matches!(r, Value::Number(n) if n == 2.5));
    }

    #[test]
    fn test_div_by_zero_is_runtime_error() {
        assert!(div(&[Value::Number(1.0), Value::Number(0.0)]).is_err());
    }

    #[test]
    fn test_type_mismatch_reports_position() {
        let err = add(&[Value::Number(1.0), Value::string("x")]).unwrap_err();
        assert!(err.to_string().contains("argument 1"));
    }

    #[test]
    fn test_abs_and_sqrt() {
        assert!(matches!(abs(&[Value::Number(-3.0)]).unwrap(), Value::Number(n) if n == 3.0));
        assert!(matches!(sqrt(&[Value::Number(9.0)]).unwrap(), Value::Number(n) if n == 3.0));
    }

    #[test]
    fn test_remainder_keeps_dividend_sign() {
        let r = remainder(&[Value::Number(-7.0), Value::Number(3.0)]).unwrap();
        assert!(matches!(r, Value::Number(n) if n == -1.0));
    }

    #[test]
    fn test_modulo_keeps_divisor_sign() {
        let r = modulo(&[Value::Number(-7.0), Value::Number(3.0)]).unwrap();
        assert!(matches!(r, Value::Number(n) if n == 2.0));
    }

    #[test]
    fn test_floor_ceiling_truncate_round() {
        assert!(matches!(floor(&[Value::Number(1.7)]).unwrap(), Value::Number(n) if n == 1.0));
        assert!(matches!(ceiling(&[Value::Number(1.2)]).unwrap(), Value::Number(n) if n == 2.0));
        assert!(matches!(truncate(&[Value::Number(-1.7)]).unwrap(), Value::Number(n) if n == -1.0));
        assert!(matches!(round(&[Value::Number(2.5)]).unwrap(), Value::Number(n) if n == 2.0));
    }
}
