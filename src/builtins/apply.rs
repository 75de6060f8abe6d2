//! `apply proc arg… list` — calls `proc` with the intermediate
//! arguments followed by the elements of the final list.
//!
//! Grounded on the application dispatch already implemented for
//! ordinary calls in `analyzer.rs` (`invoke_closure` for the Closure
//! case); `apply` is itself a builtin, so its Closure branch runs the
//! callee to completion locally rather than returning a tail thunk —
//! there is no tail position to propagate through a native function.

use std::rc::Rc;

use crate::analyzer::invoke_closure;
use crate::env::Environment;
use crate::error::{EvalError, ARITY_AT_LEAST_TWO};
use crate::value::Value;

pub fn apply(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity_error("apply", ARITY_AT_LEAST_TWO, args.len()));
    }
    let proc = &args[0];
    let last = &args[args.len() - 1];
    let spread = last
        .list_to_vec()
        .ok_or_else(|| EvalError::runtime_error("apply", "last argument must be a list"))?;

    let mut call_args = args[1..args.len() - 1].to_vec();
    call_args.extend(spread);

    match proc {
        Value::Builtin(_, f) => f(&call_args),
        Value::Closure(c) => invoke_closure(c, &call_args),
        other => Err(EvalError::NotCallable(other.to_string())),
    }
}

pub fn register(env: &Rc<Environment>) {
    env.define("apply".to_string(), Value::Builtin("apply", apply));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::arithmetic;

    #[test]
    fn test_apply_spreads_trailing_list_over_builtin() {
        let args = vec![
            Value::Builtin("+", arithmetic::add),
            Value::Number(1.0),
            Value::list(vec![Value::Number(2.0), Value::Number(3.0)]),
        ];
        let result = apply(&args).unwrap();
        assert!(matches!(result, Value::Number(n) if n == 6.0));
    }

    #[test]
    fn test_apply_rejects_improper_trailing_argument() {
        let args = vec![
            Value::Builtin("+", arithmetic::add),
            Value::Number(1.0),
        ];
        assert!(apply(&args).is_err());
    }

    #[test]
    fn test_apply_rejects_non_callable() {
        let args = vec![Value::Number(1.0), Value::Nil];
        assert!(apply(&args).is_err());
    }
}
