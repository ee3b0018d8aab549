use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Dataset, OptionMap};

/// Declared attributes of a chart directive, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    values: IndexMap<String, String>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds attributes from raw markup names, normalizing them the way the
    /// host framework does: `data-bar-height` and `x-bar_height` both become
    /// `barHeight`.
    pub fn from_markup<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut attributes = Self::new();
        for (name, value) in pairs {
            attributes.insert(normalize_attribute_name(name.as_ref()), value);
        }
        attributes
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw option source for `loadOptions`; values stay strings until coerced there.
    #[must_use]
    pub fn to_option_map(&self) -> OptionMap {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect()
    }
}

fn normalize_attribute_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix("data-")
        .or_else(|| trimmed.strip_prefix("x-"))
        .unwrap_or(trimmed);
    let mut name = String::with_capacity(stripped.len());
    for (position, word) in stripped
        .split(['-', '_', ':'])
        .filter(|word| !word.is_empty())
        .enumerate()
    {
        if position == 0 {
            name.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

/// Everything the host binds onto one directive instance.
#[derive(Debug, Clone, Default)]
pub struct DirectiveBindings {
    pub attributes: Attributes,
    pub options: Option<OptionMap>,
    pub data: Option<Rc<Dataset>>,
}

impl DirectiveBindings {
    #[must_use]
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            options: None,
            data: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: OptionMap) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Rc<Dataset>) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_names_are_camel_cased_without_prefixes() {
        let attributes = Attributes::from_markup([
            ("data-bar-height", "30"),
            ("x-bar_padding", "4"),
            ("show:details", "true"),
            ("margin", "10"),
        ]);
        assert_eq!(attributes.get("barHeight"), Some("30"));
        assert_eq!(attributes.get("barPadding"), Some("4"));
        assert_eq!(attributes.get("showDetails"), Some("true"));
        assert_eq!(attributes.get("margin"), Some("10"));
    }

    #[test]
    fn option_map_keeps_declaration_order() {
        let attributes = Attributes::new().with("b", "1").with("a", "2");
        let map = attributes.to_option_map();
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, ["b", "a"]);
    }
}
