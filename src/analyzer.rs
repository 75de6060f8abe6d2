//! The compiler: rewrites a parsed, already-macro-expanded `Value`
//! into an executable closure over an `Environment` frame. Compiling
//! once and running many times amortizes the dispatch-on-head-symbol
//! cost that a naive tree-walker pays on every evaluation of a body.
//!
//! Every analyzed expression is threaded with a *tail* flag; an
//! application analyzed with `tail = true` defers its call via the
//! trampoline instead of recursing directly, which is what makes
//! self- and mutually-tail-recursive procedures run in bounded stack
//! regardless of input size.

use std::rc::Rc;

use crate::env::Environment;
use crate::error::{self, EvalError};
use crate::macros::MacroTable;
use crate::trampoline::{run_trampoline, Trampoline};
use crate::value::{Closure, Pair, Value};

/// A compiled expression: given an activation frame, produce a
/// trampoline step. Shared via `Rc` because a single analyzed body
/// is invoked once per call to the procedure it belongs to.
pub type Analyzed = Rc<dyn Fn(&Rc<Environment>) -> Result<Trampoline, EvalError>>;

/// Analyze `expr` for evaluation in tail position iff `tail`.
pub fn analyze(expr: &Value, tail: bool, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    match expr {
        Value::Number(_) | Value::Bool(_) | Value::String(_) | Value::Nil => {
            let v = expr.clone();
            Ok(Rc::new(move |_env| Trampoline::done(v.clone())))
        }
        Value::Builtin(..) | Value::Closure(_) => {
            let v = expr.clone();
            Ok(Rc::new(move |_env| Trampoline::done(v.clone())))
        }
        Value::Symbol(name) => {
            let name = name.clone();
            Ok(Rc::new(move |env: &Rc<Environment>| match env.get(&name) {
                Some(v) => Trampoline::done(v),
                None => Err(EvalError::UnboundVariable(name.clone())),
            }))
        }
        Value::Pair(p) => analyze_pair(p, tail, macros),
    }
}

fn analyze_pair(p: &Rc<Pair>, tail: bool, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    if let Value::Symbol(head) = &p.car {
        match head.as_str() {
            "quote" => return analyze_quote(&p.cdr),
            "if" => return analyze_if(&p.cdr, tail, macros),
            "and" => return analyze_and(&p.cdr, tail, macros),
            "or" => return analyze_or(&p.cdr, tail, macros),
            "define" => return analyze_define(&p.cdr, macros),
            "set!" => return analyze_set(&p.cdr, macros),
            "lambda" => return analyze_lambda(&p.cdr, macros),
            "define-macro" => return analyze_define_macro(&p.cdr, macros),
            "quasiquote" => return analyze_quasiquote(&p.cdr, macros),
            "begin" => return analyze_begin(&p.cdr, tail, macros),
            "let" => return analyze_let(&p.cdr, tail, macros),
            _ => {}
        }
    }
    analyze_application(p, tail, macros)
}

// ---------------------------------------------------------------
// helpers
// ---------------------------------------------------------------

fn list_items(cdr: &Value, form: &str) -> Result<Vec<Value>, EvalError> {
    cdr.list_to_vec()
        .ok_or_else(|| EvalError::runtime_error(form, "arguments must be a proper list"))
}

/// Parses a lambda parameter spec: `(a b . r)`, `(a b)`, or a bare
/// symbol `r` (all arguments collected as the rest parameter).
fn parse_lambda_params(spec: &Value) -> Result<(Vec<String>, Option<String>), EvalError> {
    let mut params = Vec::new();
    let mut cur = spec;
    loop {
        match cur {
            Value::Nil => return Ok((params, None)),
            Value::Symbol(rest) => return Ok((params, Some(rest.clone()))),
            Value::Pair(p) => {
                match &p.car {
                    Value::Symbol(s) => params.push(s.clone()),
                    other => {
                        return Err(EvalError::runtime_error(
                            "lambda",
                            format!("parameter must be a symbol, got {}", other.type_name()),
                        ))
                    }
                }
                cur = &p.cdr;
            }
            other => {
                return Err(EvalError::runtime_error(
                    "lambda",
                    format!("invalid parameter list, got {}", other.type_name()),
                ))
            }
        }
    }
}

/// Parses the `(name params...)` head shared by `define`'s function
/// shorthand and `define-macro`.
fn parse_named_params(spec: &Value, form: &str) -> Result<(String, Vec<String>, Option<String>), EvalError> {
    match spec {
        Value::Pair(p) => {
            let name = match &p.car {
                Value::Symbol(s) => s.clone(),
                other => {
                    return Err(EvalError::runtime_error(
                        form,
                        format!("name must be a symbol, got {}", other.type_name()),
                    ))
                }
            };
            let (params, rest) = parse_lambda_params(&p.cdr)?;
            Ok((name, params, rest))
        }
        _ => Err(EvalError::runtime_error(form, "expected (name params...)")),
    }
}

/// Analyzes a sequence of body forms: all but the last run for
/// effect (non-tail), the last is analyzed with the caller's `tail`
/// flag and its trampoline result returned uninspected. An empty
/// body evaluates to `Nil` (unspecified).
fn analyze_body(forms: &[Value], tail: bool, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    if forms.is_empty() {
        return Ok(Rc::new(|_env| Trampoline::done(Value::Nil)));
    }
    let (last, init) = forms.split_last().unwrap();
    let init_analyzed: Vec<Analyzed> = init
        .iter()
        .map(|f| analyze(f, false, macros))
        .collect::<Result<_, _>>()?;
    let last_analyzed = analyze(last, tail, macros)?;
    Ok(Rc::new(move |env: &Rc<Environment>| {
        for a in &init_analyzed {
            a(env)?.force()?;
        }
        last_analyzed(env)
    }))
}

/// Builds the activation frame for a closure call: positional
/// parameters bind in order, a rest parameter (if any) collects the
/// remainder as a fresh proper list. Missing fixed arguments are left
/// unbound; extra arguments without a rest parameter are dropped —
/// both silently, per the minimal dialect's accepted arity behavior.
pub fn bind_args(c: &Rc<Closure>, args: &[Value]) -> Rc<Environment> {
    let frame = Environment::with_parent(c.captured_env.clone());
    for (i, name) in c.params.iter().enumerate() {
        if let Some(v) = args.get(i) {
            frame.define(name.clone(), v.clone());
        }
    }
    if let Some(rest_name) = &c.rest {
        let rest_vals = if args.len() > c.params.len() {
            args[c.params.len()..].to_vec()
        } else {
            Vec::new()
        };
        frame.define(rest_name.clone(), Value::list(rest_vals));
    }
    frame
}

/// Invokes a closure to completion, driving its own tail calls
/// through the trampoline. Used for non-tail calls discovered inside
/// `analyze_application`, and by the macro expander to run a
/// transformer against raw (unevaluated) arguments.
pub fn invoke_closure(c: &Rc<Closure>, args: &[Value]) -> Result<Value, EvalError> {
    let frame = bind_args(c, args);
    run_trampoline((c.body)(&frame))
}

// ---------------------------------------------------------------
// special forms
// ---------------------------------------------------------------

fn analyze_quote(cdr: &Value) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "quote")?;
    if items.len() != 1 {
        return Err(EvalError::arity_error("quote", error::ARITY_ONE, items.len()));
    }
    let v = items[0].clone();
    Ok(Rc::new(move |_env| Trampoline::done(v.clone())))
}

fn analyze_if(cdr: &Value, tail: bool, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "if")?;
    if items.len() < 2 {
        return Err(EvalError::runtime_error("if", "expected at least 2 arguments"));
    }
    let cond_a = analyze(&items[0], false, macros)?;
    let then_a = analyze(&items[1], tail, macros)?;
    let else_a = if items.len() > 2 {
        Some(analyze_body(&items[2..], tail, macros)?)
    } else {
        None
    };
    Ok(Rc::new(move |env: &Rc<Environment>| {
        let cond_v = cond_a(env)?.force()?;
        if cond_v.is_truthy() {
            then_a(env)
        } else {
            match &else_a {
                Some(a) => a(env),
                None => Trampoline::done(Value::Bool(false)),
            }
        }
    }))
}

fn analyze_and(cdr: &Value, tail: bool, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "and")?;
    if items.is_empty() {
        return Ok(Rc::new(|_env| Trampoline::done(Value::Bool(true))));
    }
    let (last, init) = items.split_last().unwrap();
    let init_a: Vec<Analyzed> = init
        .iter()
        .map(|f| analyze(f, false, macros))
        .collect::<Result<_, _>>()?;
    let last_a = analyze(last, tail, macros)?;
    Ok(Rc::new(move |env: &Rc<Environment>| {
        for a in &init_a {
            let v = a(env)?.force()?;
            if !v.is_truthy() {
                return Trampoline::done(v);
            }
        }
        last_a(env)
    }))
}

fn analyze_or(cdr: &Value, tail: bool, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "or")?;
    if items.is_empty() {
        return Ok(Rc::new(|_env| Trampoline::done(Value::Bool(false))));
    }
    let (last, init) = items.split_last().unwrap();
    let init_a: Vec<Analyzed> = init
        .iter()
        .map(|f| analyze(f, false, macros))
        .collect::<Result<_, _>>()?;
    let last_a = analyze(last, tail, macros)?;
    Ok(Rc::new(move |env: &Rc<Environment>| {
        for a in &init_a {
            let v = a(env)?.force()?;
            if v.is_truthy() {
                return Trampoline::done(v);
            }
        }
        last_a(env)
    }))
}

fn analyze_define(cdr: &Value, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "define")?;
    if items.len() < 2 {
        return Err(EvalError::runtime_error("define", "expected a target and at least one value form"));
    }
    match &items[0] {
        Value::Symbol(name) => {
            if items.len() != 2 {
                return Err(EvalError::runtime_error("define", "variable form takes exactly one value"));
            }
            let name = name.clone();
            let value_a = analyze(&items[1], false, macros)?;
            Ok(Rc::new(move |env: &Rc<Environment>| {
                let v = value_a(env)?.force()?;
                env.define(name.clone(), v);
                Trampoline::done(Value::Symbol(name.clone()))
            }))
        }
        Value::Pair(_) => {
            let (name, params, rest) = parse_named_params(&items[0], "define")?;
            let body_a = analyze_body(&items[1..], true, macros)?;
            Ok(Rc::new(move |env: &Rc<Environment>| {
                let closure = Rc::new(Closure {
                    params: params.clone(),
                    rest: rest.clone(),
                    body: body_a.clone(),
                    captured_env: env.clone(),
                    name: Some(name.clone()),
                });
                env.define(name.clone(), Value::Closure(closure));
                Trampoline::done(Value::Symbol(name.clone()))
            }))
        }
        other => Err(EvalError::runtime_error(
            "define",
            format!("invalid target, got {}", other.type_name()),
        )),
    }
}

fn analyze_set(cdr: &Value, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "set!")?;
    if items.len() != 2 {
        return Err(EvalError::runtime_error("set!", "expected exactly 2 arguments"));
    }
    let name = match &items[0] {
        Value::Symbol(s) => s.clone(),
        other => {
            return Err(EvalError::runtime_error(
                "set!",
                format!("target must be a symbol, got {}", other.type_name()),
            ))
        }
    };
    let value_a = analyze(&items[1], false, macros)?;
    Ok(Rc::new(move |env: &Rc<Environment>| {
        let v = value_a(env)?.force()?;
        env.set(&name, v)?;
        Trampoline::done(Value::Symbol(name.clone()))
    }))
}

fn analyze_lambda(cdr: &Value, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "lambda")?;
    if items.is_empty() {
        return Err(EvalError::runtime_error("lambda", "missing parameter list"));
    }
    let (params, rest) = parse_lambda_params(&items[0])?;
    let body_a = analyze_body(&items[1..], true, macros)?;
    Ok(Rc::new(move |env: &Rc<Environment>| {
        Trampoline::done(Value::Closure(Rc::new(Closure {
            params: params.clone(),
            rest: rest.clone(),
            body: body_a.clone(),
            captured_env: env.clone(),
            name: None,
        })))
    }))
}

fn analyze_define_macro(cdr: &Value, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "define-macro")?;
    if items.is_empty() {
        return Err(EvalError::runtime_error("define-macro", "missing name/parameter list"));
    }
    let (name, params, rest) = parse_named_params(&items[0], "define-macro")?;
    let body_a = analyze_body(&items[1..], true, macros)?;
    let table = macros.clone();
    Ok(Rc::new(move |env: &Rc<Environment>| {
        let closure = Rc::new(Closure {
            params: params.clone(),
            rest: rest.clone(),
            body: body_a.clone(),
            captured_env: env.clone(),
            name: Some(name.clone()),
        });
        table.define(name.clone(), closure);
        Trampoline::done(Value::Symbol(name.clone()))
    }))
}

fn analyze_begin(cdr: &Value, tail: bool, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "begin")?;
    analyze_body(&items, tail, macros)
}

fn analyze_let(cdr: &Value, tail: bool, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "let")?;
    if items.is_empty() {
        return Err(EvalError::runtime_error("let", "missing binding list"));
    }
    let bindings = list_items(&items[0], "let")?;
    let mut names = Vec::with_capacity(bindings.len());
    let mut value_exprs = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let pair = list_items(binding, "let")?;
        if pair.len() != 2 {
            return Err(EvalError::runtime_error("let", "each binding must be (name value)"));
        }
        let name = match &pair[0] {
            Value::Symbol(s) => s.clone(),
            other => {
                return Err(EvalError::runtime_error(
                    "let",
                    format!("binding name must be a symbol, got {}", other.type_name()),
                ))
            }
        };
        names.push(name);
        value_exprs.push(pair[1].clone());
    }
    let value_as: Vec<Analyzed> = value_exprs
        .iter()
        .map(|v| analyze(v, false, macros))
        .collect::<Result<_, _>>()?;
    let body_a = analyze_body(&items[1..], true, macros)?;
    Ok(Rc::new(move |env: &Rc<Environment>| {
        let frame = Environment::with_parent(env.clone());
        for (name, value_a) in names.iter().zip(value_as.iter()) {
            let v = value_a(env)?.force()?;
            frame.define(name.clone(), v);
        }
        if tail {
            let body_a = body_a.clone();
            Trampoline::pending(Rc::new(move || body_a(&frame)))
        } else {
            Trampoline::done(run_trampoline(body_a(&frame))?)
        }
    }))
}

fn analyze_application(p: &Rc<Pair>, tail: bool, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let op_a = analyze(&p.car, false, macros)?;
    let args = list_items(&p.cdr, "application")?;
    let arg_as: Vec<Analyzed> = args
        .iter()
        .map(|a| analyze(a, false, macros))
        .collect::<Result<_, _>>()?;
    Ok(Rc::new(move |env: &Rc<Environment>| {
        let op_v = op_a(env)?.force()?;
        let mut arg_vs = Vec::with_capacity(arg_as.len());
        for a in &arg_as {
            arg_vs.push(a(env)?.force()?);
        }
        match op_v {
            Value::Builtin(_, f) => Trampoline::done(f(&arg_vs)?),
            Value::Closure(c) => {
                let frame = bind_args(&c, &arg_vs);
                if tail {
                    let body = c.body.clone();
                    Trampoline::pending(Rc::new(move || body(&frame)))
                } else {
                    Trampoline::done(run_trampoline((c.body)(&frame))?)
                }
            }
            other => Err(EvalError::NotCallable(other.to_string())),
        }
    }))
}

// ---------------------------------------------------------------
// quasiquote (see quasiquote.rs for the template compiler)
// ---------------------------------------------------------------

fn analyze_quasiquote(cdr: &Value, macros: &MacroTable) -> Result<Analyzed, EvalError> {
    let items = list_items(cdr, "quasiquote")?;
    if items.len() != 1 {
        return Err(EvalError::arity_error("quasiquote", error::ARITY_ONE, items.len()));
    }
    let template = crate::quasiquote::compile(&items[0], macros)?;
    Ok(Rc::new(move |env: &Rc<Environment>| {
        Trampoline::done(crate::quasiquote::eval(&template, env)?)
    }))
}
