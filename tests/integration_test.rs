//! End-to-end tests exercising the whole pipeline (parse -> expand ->
//! analyze -> evaluate) against the concrete scenarios.
//!
//! Grounded on the teacher's `tests/integration_test.rs` `setup()`/
//! stdlib-loading harness pattern, adapted to this crate's single
//! bundled prelude and `eval_source` facade.

use schemecore::macros::MacroTable;
use schemecore::value::Value;
use schemecore::{env::Environment, eval_source, new_global_environment, PRELUDE_SOURCE};
use std::rc::Rc;

/// A fresh environment with builtins and the prelude loaded.
fn setup() -> (Rc<Environment>, MacroTable) {
    let env = new_global_environment();
    let macros = MacroTable::new();
    eval_source(PRELUDE_SOURCE, &env, &macros).expect("prelude failed to load");
    (env, macros)
}

fn run(src: &str) -> Value {
    let (env, macros) = setup();
    eval_source(src, &env, &macros).expect("evaluation failed")
}

#[test]
fn test_arithmetic_n_ary() {
    assert!(matches!(run("(+ 1 2 3)"), Value::Number(n) if n == 6.0));
    assert!(matches!(run("(- 10 3 2)"), Value::Number(n) if n == 5.0));
    assert!(matches!(run("(/ 20 4 2)"), Value::Number(n) if n == 2.5));
}

#[test]
fn test_recursive_factorial() {
    let v = run("(define (fact n) (if (< n 2) 1 (* n (fact (- n 1))))) (fact 5)");
    assert!(matches!(v, Value::Number(n) if n == 120.0));
}

#[test]
fn test_tail_recursive_loop_handles_a_million_iterations() {
    let v = run("(define (loop n) (if (< n 1) (quote done) (loop (- n 1)))) (loop 1000000)");
    assert_eq!(v.to_string(), "done");
}

#[test]
fn test_set_bang_mutates_enclosing_frame() {
    let v = run("(define x 1) (define (modify) (set! x 99)) (modify) x");
    assert!(matches!(v, Value::Number(n) if n == 99.0));
}

#[test]
fn test_quasiquote_splicing_produces_proper_list() {
    let v = run("(define xs '(1 2 3)) `(a ,@xs b)");
    assert_eq!(v.to_string(), "(a 1 2 3 b)");
}

#[test]
fn test_define_macro_doubles_its_argument() {
    let v = run("(define-macro (double x) (cons '+ (cons x (cons x '())))) (double 5)");
    assert!(matches!(v, Value::Number(n) if n == 10.0));
}

#[test]
fn test_and_or_short_circuit_values() {
    assert!(matches!(run("(and 1 2 3)"), Value::Number(n) if n == 3.0));
    assert!(matches!(run("(and)"), Value::Bool(true)));
    let or_result = run("(or #f 42 #t)");
    assert!(matches!(or_result, Value::Number(n) if n == 42.0));
    assert!(matches!(run("(or)"), Value::Bool(false)));
}

#[test]
fn test_eq_identity_vs_structural() {
    assert!(matches!(run("(eq? 'a 'a)"), Value::Bool(true)));
    assert!(matches!(run("(eq? (cons 1 2) (cons 1 2))"), Value::Bool(false)));
}

#[test]
fn test_prelude_list_utilities() {
    assert_eq!(run("(map (lambda (x) (* x x)) (list 1 2 3))").to_string(), "(1 4 9)");
    assert_eq!(run("(filter (lambda (x) (> x 1)) (list 1 2 3))").to_string(), "(2 3)");
    assert!(matches!(run("(length (list 1 2 3 4))"), Value::Number(n) if n == 4.0));
    assert_eq!(run("(reverse (list 1 2 3))").to_string(), "(3 2 1)");
    assert_eq!(run("(append (list 1 2) (list 3 4))").to_string(), "(1 2 3 4)");
    assert!(matches!(run("(fold-left + 0 (list 1 2 3 4))"), Value::Number(n) if n == 10.0));
}

#[test]
fn test_prelude_numeric_comparisons() {
    assert!(matches!(run("(= 3 3)"), Value::Bool(true)));
    assert!(matches!(run("(<= 3 3)"), Value::Bool(true)));
    assert!(matches!(run("(>= 2 3)"), Value::Bool(false)));
    assert!(matches!(run("(not #f)"), Value::Bool(true)));
}

#[test]
fn test_apply_spreads_final_list_argument() {
    assert!(matches!(run("(apply + 1 2 (list 3 4))"), Value::Number(n) if n == 10.0));
}

#[test]
fn test_errors_abort_only_the_offending_form() {
    let (env, macros) = setup();
    eval_source("(define x 1)", &env, &macros).unwrap();
    assert!(eval_source("(undefined-name)", &env, &macros).is_err());
    // The earlier binding survives the error.
    let v = eval_source("x", &env, &macros).unwrap();
    assert!(matches!(v, Value::Number(n) if n == 1.0));
}

#[test]
fn test_no_prelude_environment_still_has_core_builtins() {
    let env = new_global_environment();
    let macros = MacroTable::new();
    let v = eval_source("(+ 1 2)", &env, &macros).unwrap();
    assert!(matches!(v, Value::Number(n) if n == 3.0));
    // Prelude-only names are absent without loading it.
    assert!(eval_source("(not #t)", &env, &macros).is_err());
}
