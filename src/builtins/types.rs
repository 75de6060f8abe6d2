//! Type predicates: `symbol? procedure?`.
//!
//! Grounded on the teacher's `builtins/types.rs` predicate shape,
//! trimmed to the two predicates this dialect's required built-in set
//! names beyond `pair?`/`list?` (moved to `lists.rs`).

use std::rc::Rc;

use crate::env::Environment;
use crate::error::{EvalError, ARITY_ONE};
use crate::value::Value;

pub fn symbol_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("symbol?", ARITY_ONE, args.len()));
    }
    Ok(Value::Bool(matches!(args[0], Value::Symbol(_))))
}

pub fn procedure_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("procedure?", ARITY_ONE, args.len()));
    }
    Ok(Value::Bool(matches!(
        args[0],
        Value::Builtin(..) | Value::Closure(_)
    )))
}

pub fn register(env: &Rc<Environment>) {
    env.define("symbol?".to_string(), Value::Builtin("symbol?", symbol_p));
    env.define("procedure?".to_string(), Value::Builtin("procedure?", procedure_p));
}
