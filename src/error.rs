// ABOUTME: Error types for evaluation failures in the Lisp interpreter

use crate::value::Value;
use thiserror::Error;

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_THREE: &str = "3";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_AT_LEAST_TWO: &str = "at least 2";
pub const ARITY_ZERO_OR_ONE: &str = "0-1";
pub const ARITY_ONE_OR_TWO: &str = "1-2";
pub const ARITY_TWO_OR_THREE: &str = "2-3";

/// The error taxonomy for the whole pipeline: reader, expander,
/// analyzer, and builtins all raise one of these variants. Every
/// error aborts the current top-level form; the REPL and script
/// runner print `Display` and move on (REPL) or exit non-zero
/// (script mode).
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Reader/lexer failure: invalid numeric literal, unterminated
    /// string, unknown escape sequence, or unparseable syntax.
    #[error("parse error: {0}")]
    Parse(String),

    /// A symbol reference found no binding in the frame chain.
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),

    /// `set!` on a name with no existing binding in any reachable
    /// frame. `set!` never creates a binding.
    #[error("set!: Unbound variable: {0}")]
    SetUnboundVariable(String),

    /// Type mismatch error with function name, expected type, actual
    /// type, and argument position.
    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },

    /// Arity error with function name, expected count/range, and
    /// actual count.
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityError {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Catch-all runtime failure with function context, for errors
    /// that don't fit the type-mismatch/arity shape (zero division,
    /// "apply: last argument must be a list", "unquote-splicing:
    /// expected a list").
    #[error("{function}: {message}")]
    RuntimeError { function: String, message: String },

    /// The operator position of an application evaluated to
    /// something other than a builtin or closure.
    #[error("Not a function: {0}")]
    NotCallable(String),

    /// The macro expander exceeded its pass-count safety cap without
    /// converging; `name` identifies the offending macro invocation.
    #[error("macro expansion did not converge: {0}")]
    MacroExpansionLimit(String),
}

impl EvalError {
    /// Create a type mismatch error with full context.
    pub fn type_error(function: &str, expected: &str, actual: &Value, position: usize) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
            position,
        }
    }

    /// Create an arity error with expected and actual counts.
    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityError {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    /// Create a runtime error with function context.
    pub fn runtime_error(function: &str, message: impl Into<String>) -> Self {
        EvalError::RuntimeError {
            function: function.to_string(),
            message: message.into(),
        }
    }
}
