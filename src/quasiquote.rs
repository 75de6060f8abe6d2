//! Quasiquote template compilation: a one-level walk that
//! copies literal structure and evaluates `unquote`/`unquote-splicing`
//! holes. Compiled once per `quasiquote` form, re-evaluated on every
//! visit to the enclosing body — the same compile-once philosophy as
//! the rest of the analyzer.
//!
//! Nested quasiquotes are not given special level-tracking treatment:
//! a nested backtick is walked as an ordinary pair whose head happens
//! to be the symbol `quasiquote`, per the accepted Open Question.

use std::rc::Rc;

use crate::analyzer::{analyze, Analyzed};
use crate::env::Environment;
use crate::error::EvalError;
use crate::macros::MacroTable;
use crate::value::Value;

enum Template {
    Literal(Value),
    Unquote(Analyzed),
    List { spine: Vec<SpineItem>, tail: Box<Template> },
}

enum SpineItem {
    Normal(Template),
    Splice(Analyzed),
}

/// Matches `(keyword arg)` exactly, returning `arg`.
fn match_unary_form(value: &Value, keyword: &str) -> Option<Value> {
    let Value::Pair(p) = value else { return None };
    let Value::Symbol(s) = &p.car else { return None };
    if s != keyword {
        return None;
    }
    let Value::Pair(rest) = &p.cdr else { return None };
    if !rest.cdr.is_nil() {
        return None;
    }
    Some(rest.car.clone())
}

pub fn compile(template: &Value, macros: &MacroTable) -> Result<Template, EvalError> {
    if let Some(arg) = match_unary_form(template, "unquote") {
        let expanded = crate::expander::expand(&arg, macros)?;
        return Ok(Template::Unquote(analyze(&expanded, false, macros)?));
    }
    if match_unary_form(template, "unquote-splicing").is_some() {
        return Err(EvalError::runtime_error(
            "unquote-splicing",
            "not valid outside of a list template",
        ));
    }
    match template {
        Value::Pair(_) => compile_spine(template, macros),
        other => Ok(Template::Literal(other.clone())),
    }
}

fn compile_spine(template: &Value, macros: &MacroTable) -> Result<Template, EvalError> {
    let mut spine = Vec::new();
    let mut cur: &Value = template;
    let tail = loop {
        match cur {
            Value::Pair(pp) => {
                if let Some(arg) = match_unary_form(&pp.car, "unquote-splicing") {
                    let expanded = crate::expander::expand(&arg, macros)?;
                    spine.push(SpineItem::Splice(analyze(&expanded, false, macros)?));
                } else {
                    spine.push(SpineItem::Normal(compile(&pp.car, macros)?));
                }
                cur = &pp.cdr;
            }
            Value::Nil => break Template::Literal(Value::Nil),
            other => break compile(other, macros)?,
        }
    };
    Ok(Template::List {
        spine,
        tail: Box::new(tail),
    })
}

pub fn eval(template: &Template, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match template {
        Template::Literal(v) => Ok(v.clone()),
        Template::Unquote(a) => a(env)?.force(),
        Template::List { spine, tail } => {
            let mut items = Vec::with_capacity(spine.len());
            for item in spine {
                match item {
                    SpineItem::Normal(sub) => items.push(eval(sub, env)?),
                    SpineItem::Splice(a) => {
                        let v = a(env)?.force()?;
                        let spliced = v
                            .list_to_vec()
                            .ok_or_else(|| EvalError::runtime_error("unquote-splicing", "expected a list"))?;
                        items.extend(spliced);
                    }
                }
            }
            let tail_v = eval(tail, env)?;
            Ok(items.into_iter().rev().fold(tail_v, |acc, v| Value::cons(v, acc)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze as analyze_expr;
    use crate::parser::parse_all;
    use crate::trampoline::run_trampoline;

    fn run(src: &str) -> Value {
        let env = Environment::new();
        crate::builtins::register_builtins(&env);
        let macros = MacroTable::new();
        let forms = parse_all(src).unwrap();
        let mut result = Value::Nil;
        for form in forms {
            let expanded = crate::expander::expand(&form, &macros).unwrap();
            let compiled = analyze_expr(&expanded, false, &macros).unwrap();
            result = run_trampoline(compiled(&env)).unwrap();
        }
        result
    }

    #[test]
    fn test_quasiquote_literal_template() {
        assert_eq!(run("`(1 2 3)").to_string(), "(1 2 3)");
    }

    #[test]
    fn test_unquote_substitutes_value() {
        assert_eq!(run("(define x 5) `(a ,x b)").to_string(), "(a 5 b)");
    }

    #[test]
    fn test_unquote_splicing_flattens_list() {
        assert_eq!(run("(define xs '(1 2 3)) `(a ,@xs b)").to_string(), "(a 1 2 3 b)");
    }

    #[test]
    fn test_unquote_expands_macro_before_analyzing() {
        let v = run(
            "(define-macro (double x) (cons '+ (cons x (cons x '())))) \
             `(a ,(double 5) b)",
        );
        assert_eq!(v.to_string(), "(a 10 b)");
    }

    #[test]
    fn test_unquote_splicing_expands_macro_before_analyzing() {
        let v = run(
            "(define-macro (listify x) (cons 'quote (cons (cons x (cons x '())) '()))) \
             `(a ,@(listify 1) b)",
        );
        assert_eq!(v.to_string(), "(a 1 1 b)");
    }

    #[test]
    fn test_unquote_splicing_requires_list_value() {
        let env = Environment::new();
        let macros = MacroTable::new();
        let forms = parse_all("(define x 5) `(a ,@x b)").unwrap();
        let first_expanded = crate::expander::expand(&forms[0], &macros).unwrap();
        run_trampoline(analyze_expr(&first_expanded, false, &macros).unwrap()(&env)).unwrap();
        let second_expanded = crate::expander::expand(&forms[1], &macros).unwrap();
        let compiled = analyze_expr(&second_expanded, false, &macros).unwrap();
        assert!(run_trampoline(compiled(&env)).is_err());
    }
}
