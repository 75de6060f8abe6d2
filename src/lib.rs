//! Library surface: value model, environment, reader, macro expander,
//! analyzer, trampoline, and builtin registry, exposed as a reusable
//! API. `main.rs` is a thin CLI/REPL front end built on this crate.

pub mod analyzer;
pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod expander;
pub mod highlighter;
pub mod macros;
pub mod parser;
pub mod quasiquote;
pub mod trampoline;
pub mod value;

use std::rc::Rc;

use env::Environment;
use error::EvalError;
use macros::MacroTable;
use value::Value;

/// Expand, analyze, and evaluate one already-parsed top-level form.
pub fn eval_form(form: &Value, env: &Rc<Environment>, macros: &MacroTable) -> Result<Value, EvalError> {
    let expanded = expander::expand(form, macros)?;
    let compiled = analyzer::analyze(&expanded, false, macros)?;
    trampoline::run_trampoline(compiled(env))
}

/// Parse, expand, analyze, and evaluate every top-level form in
/// `source` in order, returning the value of the last one (`Nil` if
/// `source` contains no forms). Bindings and macro definitions from
/// earlier forms are visible to later ones, as in the REPL.
pub fn eval_source(source: &str, env: &Rc<Environment>, macros: &MacroTable) -> Result<Value, EvalError> {
    let forms = parser::parse_all(source)?;
    let mut result = Value::Nil;
    for form in &forms {
        result = eval_form(form, env, macros)?;
    }
    Ok(result)
}

/// A fresh global frame with every required builtin registered.
pub fn new_global_environment() -> Rc<Environment> {
    let env = Environment::new();
    builtins::register_builtins(&env);
    env
}

/// The bundled prelude source, loaded unless `--no-prelude`.
pub const PRELUDE_SOURCE: &str = include_str!("prelude.lisp");
