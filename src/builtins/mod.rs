//! Built-in procedures, one module per category, each exposing a
//! `register(&Rc<Environment>)` function, aggregated here by
//! `register_builtins` — the category-module-plus-aggregator layout
//! already present in the teacher codebase's `builtins/mod.rs`.

use std::rc::Rc;

use crate::env::Environment;

pub mod apply;
pub mod arithmetic;
pub mod comparison;
pub mod console;
pub mod equality;
pub mod lists;
pub mod types;

/// Register every required built-in procedure in `env`.
pub fn register_builtins(env: &Rc<Environment>) {
    arithmetic::register(env);
    comparison::register(env);
    lists::register(env);
    types::register(env);
    equality::register(env);
    apply::register(env);
    console::register(env);
}
