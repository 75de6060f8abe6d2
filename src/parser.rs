// ABOUTME: Parser module for parsing Lisp expressions using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{map, not, opt, peek, recognize, value},
    multi::many0,
    IResult, Parser,
};

use crate::error::EvalError;
use crate::value::Value;

// ============================================================================
// Comment handling
// ============================================================================

/// Parses a comment: `;` to end of line.
fn parse_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

/// Skips whitespace and comments.
fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), parse_comment)))
        .map(|_| ())
        .parse(input)
}

// ============================================================================
// Atoms
// ============================================================================

/// Parses a number (integer or floating point).
/// Handles: 42, -42, 3.14, -3.14, .5, -.5, 42.
fn parse_number(input: &str) -> IResult<&str, Value> {
    map(
        recognize((
            opt(char('-')),
            alt((
                recognize((digit1, opt((char('.'), opt(digit1))))),
                recognize((char('.'), digit1)),
            )),
        )),
        |num_str: &str| Value::Number(num_str.parse().expect("validated by recognize")),
    )
    .parse(input)
}

/// Parses a boolean (#t or #f).
fn parse_bool(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), tag("#t")),
        value(Value::Bool(false), tag("#f")),
    ))
    .parse(input)
}

const SYMBOL_START: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+-*/%<>=!?_";
const SYMBOL_REST: [char; 13] = ['-', '_', '?', '!', '<', '>', '=', '+', '*', '/', '%', '.', '>'];

/// Parses a symbol: letters, digits, underscore, `+ - * / < > = ? .`,
/// and compositions like `->`. May not begin with a digit.
fn parse_symbol(input: &str) -> IResult<&str, Value> {
    let (input, first) = one_of(SYMBOL_START)(input)?;
    let (input, rest) = take_while1::<_, _, nom::error::Error<_>>(|c: char| {
        c.is_alphanumeric() || SYMBOL_REST.contains(&c)
    })(input)
    .unwrap_or((input, ""));

    let mut symbol = String::new();
    symbol.push(first);
    symbol.push_str(rest);
    Ok((input, Value::Symbol(symbol)))
}

/// Parses a string literal with escapes: `\" \\ \n \t`.
fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"')(input)?;

    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Value::String(String::new())));
    }

    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\nt"))(input)?;
    let (input, _) = char('"')(input)?;

    let mut result = String::new();
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    Ok((input, Value::String(result)))
}

// ============================================================================
// Reader abbreviations
// ============================================================================

fn parse_quote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, Value::list(vec![Value::symbol("quote"), expr])))
}

fn parse_quasiquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('`')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, Value::list(vec![Value::symbol("quasiquote"), expr])))
}

fn parse_unquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char(',')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('@')(input) {
        let (input, expr) = parse_expr(input)?;
        Ok((input, Value::list(vec![Value::symbol("unquote-splicing"), expr])))
    } else {
        let (input, expr) = parse_expr(input)?;
        Ok((input, Value::list(vec![Value::symbol("unquote"), expr])))
    }
}

// ============================================================================
// Lists (proper and dotted)
// ============================================================================

/// Recognizes a standalone `.` token: a dot not immediately followed
/// by a digit (that would be a number like `.5`) and not part of a
/// longer symbol.
fn parse_dot(input: &str) -> IResult<&str, ()> {
    let (input, _) = char('.')(input)?;
    let (input, _) = not(peek(one_of("0123456789"))).parse(input)?;
    let (input, _) = not(peek(one_of(SYMBOL_START))).parse(input)?;
    Ok((input, ()))
}

/// Parses a list: `(expr...)`, `(expr... . tail)`, or `()` (Nil).
fn parse_list(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('(')(input)?;
    let (mut remaining, _) = ws_and_comments(input)?;

    let mut items = Vec::new();
    let tail = loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(')')(remaining) {
            remaining = rest;
            break Value::Nil;
        }

        if let Ok((rest, _)) = parse_dot(remaining) {
            let (rest, _) = ws_and_comments(rest)?;
            let (rest, tail_expr) = parse_expr(rest)?;
            let (rest, _) = ws_and_comments(rest)?;
            let (rest, _) = char(')')(rest)?;
            remaining = rest;
            break tail_expr;
        }

        let (rest, expr) = parse_expr(remaining)?;
        items.push(expr);
        let (rest, _) = ws_and_comments(rest)?;
        remaining = rest;
    };

    let list = items.into_iter().rev().fold(tail, |acc, v| Value::cons(v, acc));
    Ok((remaining, list))
}

/// Main expression parser — tries all alternatives.
fn parse_expr(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws_and_comments(input)?;
    alt((
        parse_quote,
        parse_quasiquote,
        parse_unquote,
        parse_list,
        parse_bool,
        parse_number,
        parse_string,
        parse_symbol,
    ))
    .parse(input)
}

// ============================================================================
// Public entry points
// ============================================================================

/// Parses exactly one top-level expression, returning it along with
/// any unconsumed trailing input.
pub fn parse_one(input: &str) -> Result<(Value, &str), EvalError> {
    let (rest, _) = ws_and_comments(input).unwrap_or((input, ()));
    if rest.is_empty() {
        return Err(EvalError::Parse("unexpected end of input".to_string()));
    }
    match parse_expr(rest) {
        Ok((rest, value)) => Ok((value, rest)),
        Err(e) => Err(EvalError::Parse(format!("{:?}", e))),
    }
}

/// Parses every top-level expression in `input`.
pub fn parse_all(input: &str) -> Result<Vec<Value>, EvalError> {
    let mut forms = Vec::new();
    let mut remaining = input;
    loop {
        let (rest, _) = ws_and_comments(remaining).unwrap_or((remaining, ()));
        if rest.is_empty() {
            return Ok(forms);
        }
        let (value, rest) = parse_one(rest)?;
        forms.push(value);
        remaining = rest;
    }
}
