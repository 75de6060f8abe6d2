//! Comparison operations: `< >` as n-ary chains (true iff every
//! adjacent pair satisfies the relation).
//!
//! Grounded on the teacher's `builtins/comparison.rs`, reworked from
//! its fixed two-argument form to an n-ary chain. `=`, `<=`, `>=` are
//! not native builtins in this dialect; they're supplied by the
//! prelude in terms of these two and `eq?`.

use std::rc::Rc;

use crate::env::Environment;
use crate::error::{EvalError, ARITY_AT_LEAST_ONE};
use crate::value::Value;

fn chain(function: &str, args: &[Value], relation: fn(f64, f64) -> bool) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error(function, ARITY_AT_LEAST_ONE, 0));
    }
    let mut numbers = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        match arg {
            Value::Number(n) => numbers.push(*n),
            other => return Err(EvalError::type_error(function, "number", other, i)),
        }
    }
    let ok = numbers.windows(2).all(|pair| relation(pair[0], pair[1]));
    Ok(Value::Bool(ok))
}

pub fn lt(args: &[Value]) -> Result<Value, EvalError> {
    chain("<", args, |a, b| a < b)
}

pub fn gt(args: &[Value]) -> Result<Value, EvalError> {
    chain(">", args, |a, b| a > b)
}

pub fn register(env: &Rc<Environment>) {
    env.define("<".to_string(), Value::Builtin("<", lt));
    env.define(">".to_string(), Value::Builtin(">", gt));
}
