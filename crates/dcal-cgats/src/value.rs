//! Typed data values.

use std::fmt;

/// Fields whose values are always kept as text, even when they look numeric.
pub const TEXT_FIELDS: &[&str] = &["SAMPLE_NAME", "SAMPLE_LOC", "SAMPLE_DESC"];

/// A single cell of a `DATA` table.
///
/// Unquoted tokens that parse as a number become [`Value::Number`],
/// everything else is kept verbatim as [`Value::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Numeric field value.
    Number(f64),
    /// Textual field value (sample names, locations).
    Text(String),
}

impl Value {
    /// Interprets a raw token for the given field.
    pub fn from_token(field: &str, token: &str, quoted: bool) -> Self {
        if quoted || TEXT_FIELDS.contains(&field) {
            return Self::Text(token.to_string());
        }
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Number(v),
            _ => Self::Text(token.to_string()),
        }
    }

    /// Returns the numeric value, if any.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Returns the text value, if any.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", format_number(*v)),
            Self::Text(s) => {
                let needs_quotes = s.is_empty()
                    || s.chars().any(|c| c.is_whitespace() || c == '"')
                    || s.parse::<f64>().is_ok();
                if needs_quotes {
                    write!(f, "\"{}\"", s)
                } else {
                    f.write_str(s)
                }
            }
        }
    }
}

/// Formats a number the way it should appear in a data row.
///
/// Shortest representation that reads back to the same `f64`;
/// negative zero is written as `0`.
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{}", v)
}

/// Rounds to `digits` decimal places.
#[inline]
pub fn round_to(v: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_tokens() {
        assert_eq!(Value::from_token("RGB_R", "12.5", false), Value::Number(12.5));
        assert_eq!(Value::from_token("RGB_R", "1e-3", false), Value::Number(0.001));
    }

    #[test]
    fn text_tokens() {
        assert_eq!(Value::from_token("SAMPLE_LOC", "1", false), Value::Text("1".into()));
        assert_eq!(Value::from_token("RGB_R", "12", true), Value::Text("12".into()));
        assert_eq!(Value::from_token("RGB_R", "A1", false), Value::Text("A1".into()));
    }

    #[test]
    fn display_quotes_ambiguous_text() {
        assert_eq!(Value::Text("A1".into()).to_string(), "A1");
        assert_eq!(Value::Text("12".into()).to_string(), "\"12\"");
        assert_eq!(Value::Text("two words".into()).to_string(), "\"two words\"");
        assert_eq!(Value::Number(32767.5).to_string(), "32767.5");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(0.123456789, 7), 0.1234568);
        assert_eq!(round_to(235.004, 2), 235.0);
    }
}
