//! Equality: `eq?` and `eqv?`.
//!
//! Structural equality for numbers, booleans, nil, and symbols (by
//! name); identity for Pairs and procedures. Both predicates share one
//! implementation — this dialect does not distinguish `eq?` from
//! `eqv?` the way a numeric-tower Scheme would (no exactness to tell
//! apart), per the resolved Open Question on raw float comparison.

use std::rc::Rc;

use crate::env::Environment;
use crate::error::{EvalError, ARITY_TWO};
use crate::value::Value;

fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::String(x), Value::String(y)) => std::ptr::eq(x.as_str(), y.as_str()),
        (Value::Nil, Value::Nil) => true,
        (Value::Pair(x), Value::Pair(y)) => Rc::ptr_eq(x, y),
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(xn, _), Value::Builtin(yn, _)) => xn == yn,
        _ => false,
    }
}

pub fn eq_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("eq?", ARITY_TWO, args.len()));
    }
    Ok(Value::Bool(same(&args[0], &args[1])))
}

pub fn eqv_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("eqv?", ARITY_TWO, args.len()));
    }
    Ok(Value::Bool(same(&args[0], &args[1])))
}

pub fn register(env: &Rc<Environment>) {
    env.define("eq?".to_string(), Value::Builtin("eq?", eq_p));
    env.define("eqv?".to_string(), Value::Builtin("eqv?", eqv_p));
}
