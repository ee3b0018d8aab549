use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Loosely-typed option source (declared attributes or a bound options object).
pub type OptionMap = serde_json::Map<String, Value>;

/// Marker prefix the host framework uses for its own scope bindings.
pub const RESERVED_KEY_MARKER: char = '$';

/// Scalar configuration value after coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl OptionValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Host-style truthiness used for switch-like options.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(value) => *value,
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::Text(value) => !value.is_empty() && value != "false",
        }
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Returns `true` for keys that carry host binding plumbing (`$key`, `$$key`).
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(RESERVED_KEY_MARKER)
}

/// Coerces one raw option value into a configuration scalar.
///
/// | raw value                             | result           |
/// |---------------------------------------|------------------|
/// | number                                | `Number`         |
/// | string with a leading number (`20px`) | `Number` (`20`)  |
/// | any other string                      | `Text`           |
/// | bool                                  | `Flag`           |
/// | null, array, object                   | `None` (skipped) |
#[must_use]
pub fn coerce_option(raw: &Value) -> Option<OptionValue> {
    match raw {
        Value::Number(number) => number.as_f64().map(OptionValue::Number),
        Value::String(text) => Some(match parse_leading_numeric(text) {
            Some(number) => OptionValue::Number(number),
            None => OptionValue::Text(text.clone()),
        }),
        Value::Bool(flag) => Some(OptionValue::Flag(*flag)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses a string that is entirely a number; non-finite spellings
/// (`inf`, `NaN`) are rejected.
#[must_use]
pub fn parse_numeric(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Parses the longest decimal number at the start of `text`, ignoring
/// leading whitespace and any trailing unit (`"20px"` is `20`).
///
/// Needs at least one digit; the fraction is kept (`"12.7"` is `12.7`).
#[must_use]
pub fn parse_leading_numeric(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integral = digits_from(end);
    end += integral;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if fraction > 0 || integral > 0 {
            end += 1 + fraction;
        }
    }
    if integral + fraction == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }
    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Effective chart configuration: option name to merged scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    entries: IndexMap<String, OptionValue>,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(OptionValue::as_number)
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_text)
    }

    /// Missing keys are falsy.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(OptionValue::is_truthy)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}
