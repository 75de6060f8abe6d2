//! The two-state result type every analyzed expression returns, and
//! the driver loop that forces it to a final value.
//!
//! A tail-position application compiles to something that returns
//! `Pending` instead of recursing into the callee directly; the
//! outermost caller of an analyzed expression drives `Pending`
//! values with [`run_trampoline`], turning deep tail recursion into a
//! bounded-stack loop. Every other consumer of a `Trampoline` (an
//! `if` condition, an operand, a builtin argument) forces it locally
//! via [`Trampoline::force`] before inspecting the value — callers
//! besides the outermost driver never observe `Pending`.

use std::rc::Rc;

use crate::error::EvalError;
use crate::value::Value;

/// A deferred application: calling it performs exactly one more step
/// of evaluation, itself returning a `Trampoline`.
pub type PendingCall = Rc<dyn Fn() -> Result<Trampoline, EvalError>>;

pub enum Trampoline {
    /// The computation produced a final value.
    Done(Value),
    /// One more step is needed; force it to continue.
    Pending(PendingCall),
}

impl Trampoline {
    pub fn done(value: Value) -> Result<Trampoline, EvalError> {
        Ok(Trampoline::Done(value))
    }

    pub fn pending(thunk: PendingCall) -> Result<Trampoline, EvalError> {
        Ok(Trampoline::Pending(thunk))
    }

    /// Drive this trampoline to a `Value` immediately. Used by any
    /// non-tail consumer of an analyzed expression's result.
    pub fn force(self) -> Result<Value, EvalError> {
        run_trampoline(Ok(self))
    }
}

/// Repeatedly forces `Pending` thunks until a `Done` is produced.
/// This is the only place in the evaluator that grows the Rust call
/// stack by a bounded, constant amount per tail call rather than
/// linearly with recursion depth.
pub fn run_trampoline(mut step: Result<Trampoline, EvalError>) -> Result<Value, EvalError> {
    loop {
        match step? {
            Trampoline::Done(value) => return Ok(value),
            Trampoline::Pending(thunk) => step = thunk(),
        }
    }
}
