//! Whole-tree macro rewrite, iterated to a fixed point.
//!
//! Grounded on the teacher's `eval.rs::expand_macros` recursive
//! car/cdr walk and its `quote`/`quasiquote` stop rule, restructured
//! as a standalone pass run to convergence (the teacher's version is
//! a single recursive pass, not iterated) plus a pass-count cap as a
//! safety net against non-terminating macros.

use crate::analyzer::invoke_closure;
use crate::error::EvalError;
use crate::macros::MacroTable;
use crate::value::Value;

/// Safety cap on whole-tree expansion passes. Legitimate macro usage
/// converges in a handful of passes; this only guards against a
/// macro whose output keeps containing itself.
const MAX_EXPANSION_PASSES: usize = 10_000;

/// Rewrites `expr` until no subtree has a macro-table symbol at its
/// head.
pub fn expand(expr: &Value, macros: &MacroTable) -> Result<Value, EvalError> {
    let mut current = expr.clone();
    for _ in 0..MAX_EXPANSION_PASSES {
        let (next, changed) = expand_once(&current, macros)?;
        if !changed {
            return Ok(next);
        }
        current = next;
    }
    Err(EvalError::MacroExpansionLimit(expr.to_string()))
}

fn expand_once(expr: &Value, macros: &MacroTable) -> Result<(Value, bool), EvalError> {
    let Value::Pair(p) = expr else {
        return Ok((expr.clone(), false));
    };

    if let Value::Symbol(head) = &p.car {
        if head == "quote" || head == "quasiquote" {
            return Ok((expr.clone(), false));
        }
        if let Some(transformer) = macros.get(head) {
            let args = p
                .cdr
                .list_to_vec()
                .ok_or_else(|| EvalError::runtime_error(head, "macro arguments must be a proper list"))?;
            let result = invoke_closure(&transformer, &args)?;
            return Ok((result, true));
        }
    }

    let (car2, car_changed) = expand_once(&p.car, macros)?;
    let (cdr2, cdr_changed) = expand_once(&p.cdr, macros)?;
    if car_changed || cdr_changed {
        Ok((Value::cons(car2, cdr2), true))
    } else {
        Ok((expr.clone(), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::env::Environment;
    use crate::parser::parse_all;
    use crate::trampoline::run_trampoline;

    fn eval_with_macro_def(src: &str) -> Value {
        let env = Environment::new();
        crate::builtins::register_builtins(&env);
        let macros = MacroTable::new();
        let forms = parse_all(src).unwrap();
        let mut result = Value::Nil;
        for form in forms {
            let expanded = expand(&form, &macros).unwrap();
            let compiled = analyze(&expanded, false, &macros).unwrap();
            result = run_trampoline(compiled(&env)).unwrap();
        }
        result
    }

    #[test]
    fn test_double_macro_expands_to_addition() {
        let v = eval_with_macro_def(
            "(define-macro (double x) (cons '+ (cons x (cons x '())))) (double 5)",
        );
        assert!(matches!(v, Value::Number(n) if n == 10.0));
    }

    #[test]
    fn test_quote_and_quasiquote_are_not_expanded() {
        let macros = MacroTable::new();
        let closure_body = crate::value::Closure {
            params: vec!["x".to_string()],
            rest: None,
            body: std::rc::Rc::new(|_env| crate::trampoline::Trampoline::done(Value::Number(0.0))),
            captured_env: Environment::new(),
            name: Some("m".to_string()),
        };
        macros.define("m".to_string(), std::rc::Rc::new(closure_body));

        let quoted = parse_all("'(m 1)").unwrap().remove(0);
        let (expanded, changed) = expand_once(&quoted, &macros).unwrap();
        assert!(!changed);
        assert_eq!(expanded.to_string(), quoted.to_string());
    }

    #[test]
    fn test_non_macro_tree_is_unchanged() {
        let macros = MacroTable::new();
        let forms = parse_all("(+ 1 2)").unwrap();
        let (expanded, changed) = expand_once(&forms[0], &macros).unwrap();
        assert!(!changed);
        assert_eq!(expanded.to_string(), forms[0].to_string());
    }
}
