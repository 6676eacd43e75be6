use std::collections::BTreeMap;

use crate::foundation::core::Length;

/// A pre-cascaded property value.
///
/// Property resolution happens upstream; the layout core only reads these values and never
/// re-resolves them. Lengths arrive as plain numbers in points.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean flag.
    Flag(bool),
    /// Numeric value (lengths are in points).
    Number(f64),
    /// Keyword or string value.
    Text(String),
}

impl PropertyValue {
    /// Numeric view of the value, if it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Keyword/string view of the value, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

/// Property table attached to each content node, keyed by property name.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Read-only lookup of resolved properties for one node.
pub trait PropertyResolver {
    /// Look up a property by name.
    fn get(&self, name: &str) -> Option<&PropertyValue>;

    /// Numeric property, or `default` when absent or not numeric.
    fn length_or(&self, name: &str, default: Length) -> Length {
        self.get(name)
            .and_then(PropertyValue::as_number)
            .unwrap_or(default)
    }

    /// Optional numeric property.
    fn length(&self, name: &str) -> Option<Length> {
        self.get(name).and_then(PropertyValue::as_number)
    }

    /// Keyword property, if present as text.
    fn keyword(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_text)
    }
}

impl PropertyResolver for PropertyMap {
    fn get(&self, name: &str) -> Option<&PropertyValue> {
        BTreeMap::get(self, name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/properties.rs"]
mod tests;
