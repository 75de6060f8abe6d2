//! Syntax highlighter for the REPL, implementing `rustyline`'s
//! `Highlighter` trait. Colors parens, special-form keywords, and
//! literals while leaving the line's display width untouched.
//!
//! Grounded on the teacher's hand-rolled character-by-character
//! tokenizer, trimmed to the forms and builtins this dialect actually
//! defines (no filesystem/network/error/help builtins to highlight).

use rustyline::Helper;
use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use std::borrow::Cow;
use std::collections::HashSet;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_PARENS: &str = "\x1b[1;34m"; // Bold blue
const COLOR_SPECIAL_FORM: &str = "\x1b[1;35m"; // Bold magenta
const COLOR_BUILTIN: &str = "\x1b[36m"; // Cyan
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow
const COLOR_STRING: &str = "\x1b[32m"; // Green
const COLOR_BOOLEAN: &str = "\x1b[33m"; // Yellow
const COLOR_COMMENT: &str = "\x1b[90m"; // Bright black (gray)
const COLOR_QUOTE: &str = "\x1b[1;33m"; // Bold yellow

/// REPL helper providing syntax-aware color highlighting.
pub struct LispHelper;

impl LispHelper {
    pub fn new() -> Self {
        LispHelper
    }
}

impl Default for LispHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for LispHelper {}

impl Completer for LispHelper {
    type Candidate = String;
}

impl Hinter for LispHelper {
    type Hint = String;
}

impl Validator for LispHelper {}

impl Highlighter for LispHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let special_forms = special_forms();
        let builtins = builtins();
        let prelude = prelude_functions();

        let highlighted = highlight_line(line, &special_forms, &builtins, &prelude);

        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

/// Tokenize a line and apply syntax highlighting.
fn highlight_line(
    line: &str,
    special_forms: &HashSet<&'static str>,
    builtins: &HashSet<&'static str>,
    prelude: &HashSet<&'static str>,
) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ';' => {
                result.push_str(COLOR_COMMENT);
                while i < chars.len() && chars[i] != '\n' {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            '"' => {
                result.push_str(COLOR_STRING);
                result.push('"');
                i += 1;

                let mut found_close = false;
                while i < chars.len() {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        result.push(chars[i]);
                        result.push(chars[i + 1]);
                        i += 2;
                    } else if chars[i] == '"' {
                        result.push('"');
                        i += 1;
                        found_close = true;
                        break;
                    } else {
                        result.push(chars[i]);
                        i += 1;
                    }
                }

                result.push_str(COLOR_RESET);
                if !found_close {
                    while i < chars.len() && chars[i] != '\n' {
                        result.push(chars[i]);
                        i += 1;
                    }
                }
            }

            '0'..='9' | '.' => {
                let old_i = i;
                if chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                } else if chars[i].is_ascii_digit() {
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                    if i < chars.len() && chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                        i += 1;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                } else {
                    result.push(chars[i]);
                    i += 1;
                    continue;
                }

                let num_str: String = chars[old_i..i].iter().collect();
                result.push_str(COLOR_NUMBER);
                result.push_str(&num_str);
                result.push_str(COLOR_RESET);
            }

            '+' | '-' => {
                if i + 1 < chars.len()
                    && (chars[i + 1].is_ascii_digit()
                        || (chars[i + 1] == '.' && i + 2 < chars.len() && chars[i + 2].is_ascii_digit()))
                {
                    let old_i = i;
                    i += 1;
                    if chars[old_i + 1] == '.' {
                        i += 1;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    } else {
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                        if i < chars.len() && chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                            i += 1;
                            while i < chars.len() && chars[i].is_ascii_digit() {
                                i += 1;
                            }
                        }
                    }

                    let num_str: String = chars[old_i..i].iter().collect();
                    result.push_str(COLOR_NUMBER);
                    result.push_str(&num_str);
                    result.push_str(COLOR_RESET);
                } else {
                    let start = i;
                    while i < chars.len() && !is_delimiter(chars[i]) {
                        i += 1;
                    }
                    let symbol: String = chars[start..i].iter().collect();
                    push_symbol(&mut result, &symbol, special_forms, builtins, prelude);
                }
            }

            '#' => {
                if i + 1 < chars.len() && (chars[i + 1] == 't' || chars[i + 1] == 'f') {
                    let is_bare = i + 2 >= chars.len()
                        || !(chars[i + 2].is_alphanumeric() || chars[i + 2] == '_' || chars[i + 2] == '-');
                    result.push_str(if is_bare { COLOR_BOOLEAN } else { COLOR_BUILTIN });
                    result.push(chars[i]);
                    result.push(chars[i + 1]);
                    i += 2;
                    result.push_str(COLOR_RESET);
                } else {
                    result.push(chars[i]);
                    i += 1;
                }
            }

            '\'' | '`' => {
                result.push_str(COLOR_QUOTE);
                result.push(chars[i]);
                i += 1;
                result.push_str(COLOR_RESET);
            }

            ',' => {
                result.push_str(COLOR_QUOTE);
                result.push(',');
                i += 1;
                if i < chars.len() && chars[i] == '@' {
                    result.push('@');
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            '(' | ')' | '[' | ']' | '{' | '}' => {
                result.push_str(COLOR_PARENS);
                result.push(chars[i]);
                i += 1;
                result.push_str(COLOR_RESET);
            }

            ' ' | '\t' | '\n' | '\r' => {
                result.push(chars[i]);
                i += 1;
            }

            _ => {
                let start = i;
                while i < chars.len() && !is_delimiter(chars[i]) {
                    i += 1;
                }
                let symbol: String = chars[start..i].iter().collect();
                push_symbol(&mut result, &symbol, special_forms, builtins, prelude);
            }
        }
    }

    result
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';' | '\'' | '`' | ',')
}

fn push_symbol(
    result: &mut String,
    symbol: &str,
    special_forms: &HashSet<&'static str>,
    builtins: &HashSet<&'static str>,
    prelude: &HashSet<&'static str>,
) {
    if special_forms.contains(symbol) {
        result.push_str(COLOR_SPECIAL_FORM);
        result.push_str(symbol);
        result.push_str(COLOR_RESET);
    } else if builtins.contains(symbol) || prelude.contains(symbol) {
        result.push_str(COLOR_BUILTIN);
        result.push_str(symbol);
        result.push_str(COLOR_RESET);
    } else {
        result.push_str(symbol);
    }
}

/// Analyzer special forms: have their own evaluation rule, not an
/// ordinary application.
fn special_forms() -> HashSet<&'static str> {
    [
        "quote",
        "quasiquote",
        "unquote",
        "unquote-splicing",
        "if",
        "and",
        "or",
        "define",
        "set!",
        "lambda",
        "define-macro",
        "begin",
        "let",
    ]
    .iter()
    .copied()
    .collect()
}

/// Native builtins registered by `builtins::register_builtins`.
fn builtins() -> HashSet<&'static str> {
    [
        "+", "-", "*", "/",
        "abs", "sqrt", "remainder", "modulo", "floor", "ceiling", "truncate", "round",
        "<", ">",
        "cons", "car", "cdr", "null?", "pair?", "list?",
        "symbol?", "procedure?",
        "eq?", "eqv?",
        "apply",
        "log",
    ]
    .iter()
    .copied()
    .collect()
}

/// Supplemental functions loaded from the prelude library.
fn prelude_functions() -> HashSet<&'static str> {
    [
        "not", "=", "<=", ">=",
        "list", "length", "reverse", "append", "map", "filter",
        "fold-left", "fold-right", "for-each", "list-ref", "member",
    ]
    .iter()
    .copied()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_highlighting() {
        let highlighted = highlight_line("42", &special_forms(), &builtins(), &prelude_functions());
        assert!(highlighted.contains(COLOR_NUMBER));
    }

    #[test]
    fn test_string_highlighting() {
        let highlighted = highlight_line("\"hello\"", &special_forms(), &builtins(), &prelude_functions());
        assert!(highlighted.contains(COLOR_STRING));
    }

    #[test]
    fn test_comment_highlighting() {
        let highlighted = highlight_line("; a comment", &special_forms(), &builtins(), &prelude_functions());
        assert!(highlighted.contains(COLOR_COMMENT));
    }

    #[test]
    fn test_special_form_highlighting() {
        let highlighted = highlight_line("(define x 5)", &special_forms(), &builtins(), &prelude_functions());
        assert!(highlighted.contains(COLOR_SPECIAL_FORM));
        assert!(highlighted.contains(COLOR_PARENS));
    }

    #[test]
    fn test_builtin_function_highlighting() {
        let highlighted = highlight_line("(+ 1 2)", &special_forms(), &builtins(), &prelude_functions());
        assert!(highlighted.contains(COLOR_BUILTIN));
    }

    #[test]
    fn test_prelude_function_highlighting() {
        let highlighted = highlight_line("(map f xs)", &special_forms(), &builtins(), &prelude_functions());
        assert!(highlighted.contains(COLOR_BUILTIN));
    }

    #[test]
    fn test_boolean_highlighting() {
        let highlighted = highlight_line("#t #f", &special_forms(), &builtins(), &prelude_functions());
        assert!(highlighted.contains(COLOR_BOOLEAN));
    }

    #[test]
    fn test_quote_and_unquote_splicing_highlighting() {
        let highlighted = highlight_line("`(a ,@xs)", &special_forms(), &builtins(), &prelude_functions());
        assert!(highlighted.contains(COLOR_QUOTE));
        assert!(highlighted.matches(",@").count() >= 1);
    }
}
