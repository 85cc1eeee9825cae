use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::error::FilterError;
use super::types::{Condition, FilterOp};

/// `field` or `field[op]`. The operator must fill the whole bracket.
static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)(?:\[([A-Za-z]+)\])?$")
        .unwrap_or_else(|error| panic!("filter key pattern failed to compile: {error}"))
});

/// Numbers without leading zeros, so `02118` stays a string.
static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?$")
        .unwrap_or_else(|error| panic!("number pattern failed to compile: {error}"))
});

pub struct FilterWhere;

impl FilterWhere {
    /// Parses one non-reserved query pair into a condition.
    pub fn parse_pair(key: &str, raw: &str) -> Result<Condition, FilterError> {
        let captures = KEY_PATTERN
            .captures(key)
            .ok_or_else(|| FilterError::InvalidField(key.to_string()))?;
        let field = &captures[1];

        let op = match captures.get(2) {
            None => FilterOp::Eq,
            Some(token) => FilterOp::from_token(token.as_str())
                .ok_or_else(|| FilterError::UnsupportedOperator(token.as_str().to_string()))?,
        };

        let value = match op {
            FilterOp::In => Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(coerce_scalar)
                    .collect(),
            ),
            _ => coerce_scalar(raw),
        };

        Ok(Condition::new(field, op, value))
    }
}

/// Query values arrive as text; booleans and plain numbers become typed JSON.
pub fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if NUMBER_PATTERN.is_match(raw) {
        if let Ok(i) = raw.parse::<i64>() {
            return Value::from(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(raw.to_string())
}

pub fn validate_field(field: &str) -> Result<&str, FilterError> {
    let valid = !field.is_empty()
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && field.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid {
        Ok(field)
    } else {
        Err(FilterError::InvalidField(field.to_string()))
    }
}
