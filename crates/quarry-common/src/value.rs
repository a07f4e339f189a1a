//! Literal values carried by constant plan nodes
//!
//! A `Literal` keeps the text a number was written with instead of
//! converting it to a machine type, so `2019.12` stays `2019.12` and `1`
//! stays integral all the way through serialization.

use crate::error::{Error, Result};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::fmt;

/// A literal value as written in the query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Numeric literal, stored as its written (JSON-compatible) text
    Number(String),
    /// String literal, unquoted
    String(String),
}

impl Literal {
    /// Create a numeric literal from the digits the parser produced.
    ///
    /// Text that is already a valid JSON number is kept verbatim. Forms SQL
    /// allows but JSON does not (`.5`, `1.`, `007`, `+3`) get the missing
    /// digit added or the redundant one dropped.
    pub fn number(text: &str) -> Result<Self> {
        normalize_number(text)
            .map(Literal::Number)
            .ok_or_else(|| Error::UnsupportedExpression(format!("numeric literal {}", text)))
    }

    /// Create a string literal
    pub fn string(value: impl Into<String>) -> Self {
        Literal::String(value.into())
    }

    /// Negate a numeric literal by prefixing its written form.
    pub fn negate(self) -> Result<Self> {
        match self {
            Literal::Number(text) => match text.strip_prefix('-') {
                Some(rest) => Ok(Literal::Number(rest.to_string())),
                None => Ok(Literal::Number(format!("-{}", text))),
            },
            Literal::String(s) => Err(Error::UnsupportedExpression(format!("-'{}'", s))),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(text) => write!(f, "{}", text),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            // Emitted as a raw token so the written digits survive untouched
            Literal::Number(text) => {
                let raw = RawValue::from_string(text.clone()).map_err(S::Error::custom)?;
                raw.serialize(serializer)
            }
            Literal::String(s) => serializer.serialize_str(s),
        }
    }
}

fn normalize_number(text: &str) -> Option<String> {
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos..])),
        None => (unsigned, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (mantissa, None),
    };

    if !is_digits(int_part) || !frac_part.map_or(true, is_digits) {
        return None;
    }
    if int_part.is_empty() && frac_part.map_or(true, str::is_empty) {
        return None;
    }

    let mut out = String::with_capacity(text.len() + 2);
    out.push_str(sign);

    let int_trimmed = int_part.trim_start_matches('0');
    out.push_str(if int_trimmed.is_empty() { "0" } else { int_trimmed });

    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(if frac.is_empty() { "0" } else { frac });
    }

    if let Some(exp) = exponent {
        // exp still carries its 'e'/'E' marker
        let (marker, rest) = exp.split_at(1);
        let digits = rest.strip_prefix(['+', '-']).unwrap_or(rest);
        if digits.is_empty() || !is_digits(digits) {
            return None;
        }
        out.push_str(marker);
        out.push_str(rest);
    }

    Some(out)
}
