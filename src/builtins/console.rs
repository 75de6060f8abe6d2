//! Console output: `log`.
//!
//! Grounded on the teacher's `builtins/console.rs` `print`/`println`
//! pair, collapsed to the single `log` builtin named in the required
//! interface: formats each argument (strings raw, everything else
//! via the value printer) space-separated, and emits one line.

use std::rc::Rc;

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;

pub fn log(args: &[Value]) -> Result<Value, EvalError> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::String(s) => parts.push(s.clone()),
            other => parts.push(other.to_string()),
        }
    }
    println!("{}", parts.join(" "));
    Ok(Value::Nil)
}

pub fn register(env: &Rc<Environment>) {
    env.define("log".to_string(), Value::Builtin("log", log));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_returns_nil() {
        let result = log(&[Value::string("hello"), Value::Number(1.0)]).unwrap();
        assert!(matches!(result, Value::Nil));
    }
}
