use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::dataset::Datum;

/// Concrete attribute value stored on a scene node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Formats integral values without a fractional part (`25`, not `25.0`).
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

pub type BoundAttrFn = Rc<dyn Fn(&Datum, usize) -> AttrValue>;

/// Attribute assignment: a constant or a function of the node's bound datum and index.
#[derive(Clone)]
pub enum Attr {
    Const(AttrValue),
    Bound(BoundAttrFn),
}

impl Attr {
    pub fn bound(f: impl Fn(&Datum, usize) -> AttrValue + 'static) -> Self {
        Self::Bound(Rc::new(f))
    }

    /// Resolves the attribute; `None` when data-bound and no datum is available.
    #[must_use]
    pub fn resolve(&self, datum: Option<(&Datum, usize)>) -> Option<AttrValue> {
        match self {
            Self::Const(value) => Some(value.clone()),
            Self::Bound(f) => datum.map(|(datum, index)| f(datum, index)),
        }
    }
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(value) => f.debug_tuple("Const").field(value).finish(),
            Self::Bound(_) => f.write_str("Bound(..)"),
        }
    }
}

impl From<AttrValue> for Attr {
    fn from(value: AttrValue) -> Self {
        Self::Const(value)
    }
}

impl From<f64> for Attr {
    fn from(value: f64) -> Self {
        Self::Const(AttrValue::Number(value))
    }
}

impl From<&str> for Attr {
    fn from(value: &str) -> Self {
        Self::Const(AttrValue::from(value))
    }
}

impl From<String> for Attr {
    fn from(value: String) -> Self {
        Self::Const(AttrValue::Text(value))
    }
}

/// Ordered property mapping handed to capability validation and node builders.
#[derive(Debug, Clone, Default)]
pub struct Props {
    entries: IndexMap<String, Attr>,
}

impl Props {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Attr>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_bound(
        self,
        key: impl Into<String>,
        f: impl Fn(&Datum, usize) -> AttrValue + 'static,
    ) -> Self {
        self.with(key, Attr::bound(f))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Attr>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Attr> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attr)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key list accepted by property validation: none, a single key or an ordered list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keys(SmallVec<[String; 4]>);

impl Keys {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Keys {
    fn from(key: &str) -> Self {
        Self(SmallVec::from_iter([key.to_owned()]))
    }
}

impl From<String> for Keys {
    fn from(key: String) -> Self {
        Self(SmallVec::from_iter([key]))
    }
}

impl From<&[&str]> for Keys {
    fn from(keys: &[&str]) -> Self {
        Self(keys.iter().map(|key| (*key).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Keys {
    fn from(keys: [&str; N]) -> Self {
        Self(keys.iter().map(|key| (*key).to_owned()).collect())
    }
}

impl From<Vec<String>> for Keys {
    fn from(keys: Vec<String>) -> Self {
        Self(keys.into_iter().collect())
    }
}

impl From<Option<&str>> for Keys {
    fn from(key: Option<&str>) -> Self {
        key.map_or_else(Self::none, Self::from)
    }
}

/// Presence check; values are never inspected.
#[must_use]
pub fn has_all_keys(props: &Props, required: &Keys) -> bool {
    required.iter().all(|key| props.contains_key(key))
}

/// Copies the required then optional keys present in `props`.
#[must_use]
pub fn pick_keys(props: &Props, required: &Keys, optional: &Keys) -> Props {
    let mut picked = Props::new();
    for key in required.iter().chain(optional.iter()) {
        if let Some(value) = props.get(key) {
            picked.insert(key, value.clone());
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::{Attr, AttrValue, Keys, Props, format_number, pick_keys};
    use crate::core::dataset::Datum;

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(format_number(25.0), "25");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(12.5), "12.5");
    }

    #[test]
    fn bound_attr_needs_a_datum() {
        let attr = Attr::bound(|datum, index| AttrValue::from(datum.value + index as f64));
        assert_eq!(attr.resolve(None), None);
        assert_eq!(
            attr.resolve(Some((&Datum::new(4.0), 2))),
            Some(AttrValue::Number(6.0))
        );
    }

    #[test]
    fn pick_keys_keeps_required_before_optional() {
        let props = Props::new().with("fill", "red").with("x", 1.0).with("y", 2.0);
        let picked = pick_keys(&props, &Keys::from(["y", "x"]), &Keys::from("fill"));
        let keys: Vec<&str> = picked.keys().collect();
        assert_eq!(keys, vec!["y", "x", "fill"]);
    }
}
