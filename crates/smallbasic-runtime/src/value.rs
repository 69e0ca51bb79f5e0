//! Loosely typed values passed across the scripting boundary.
//!
//! Scripts only ever hand the runtime numbers, strings and booleans. `Value`
//! is the tagged union of those three, and the `to_*` methods are the
//! explicit casts the runtime classes apply to their arguments.

use std::fmt;

use crate::error::{RuntimeError, RuntimeResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// Interprets a literal typed by a user.
    ///
    /// `true`/`false` (any case) become booleans, anything that parses as a
    /// floating-point number becomes a number, and everything else is text.
    pub fn parse_literal(literal: &str) -> Value {
        if literal.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if literal.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        match literal.trim().parse::<f64>() {
            Ok(n) if !literal.trim().is_empty() => Value::Number(n),
            _ => Value::Text(literal.to_string()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Bool(_) => "boolean",
        }
    }

    pub fn to_number(&self) -> RuntimeResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| RuntimeError::invalid_argument(format!("'{s}' is not a number"))),
        }
    }

    /// Converts to an integer, truncating toward zero.
    pub fn to_int(&self) -> RuntimeResult<i64> {
        let n = self.to_number()?;
        if !n.is_finite() {
            return Err(RuntimeError::invalid_argument(format!(
                "{n} is not a finite number"
            )));
        }
        Ok(n.trunc() as i64)
    }

    pub fn to_bool(&self) -> RuntimeResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(*n != 0.0),
            Value::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            Value::Text(s) => Err(RuntimeError::invalid_argument(format!(
                "'{s}' is not a boolean"
            ))),
        }
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
