//! Element tree carried by reference-data messages.
//!
//! Every message payload is an [`Element`]: either a scalar, a sequence of
//! named sub-elements, or an array of elements. Bulk fields (index members,
//! for example) arrive as arrays of sequences.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A node in a message's element tree.
///
/// Serialised adjacently tagged, e.g. `{"type":"date","value":"2023-01-15"}`
/// or `{"type":"sequence","value":{"security":{"type":"string","value":"X"}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Element {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Datetime(NaiveDateTime),
    Sequence(BTreeMap<String, Element>),
    Array(Vec<Element>),
}

impl Element {
    /// Build a string scalar
    pub fn string(value: impl Into<String>) -> Self {
        Element::String(value.into())
    }

    /// Build a sequence from `(name, element)` pairs
    pub fn sequence<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Element)>,
        K: Into<String>,
    {
        Element::Sequence(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// An empty sequence
    pub fn empty_sequence() -> Self {
        Element::Sequence(BTreeMap::new())
    }

    /// Look up a named sub-element of a sequence.
    ///
    /// Returns `None` for scalars and arrays.
    pub fn get(&self, name: &str) -> Option<&Element> {
        match self {
            Element::Sequence(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Whether a sequence carries the named sub-element
    pub fn has_element(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The values of an array element; empty for anything else
    pub fn values(&self) -> &[Element] {
        match self {
            Element::Array(values) => values,
            _ => &[],
        }
    }

    /// Number of values held by an array element
    pub fn num_values(&self) -> usize {
        self.values().len()
    }

    /// Borrow a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::String(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the string value of a named sub-element
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Element::as_str)
    }

    /// Whether this element is a scalar value
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Element::Sequence(_) | Element::Array(_))
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::String(value.to_string())
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::String(value)
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        Element::Int(value)
    }
}

impl From<f64> for Element {
    fn from(value: f64) -> Self {
        Element::Float(value)
    }
}

impl From<bool> for Element {
    fn from(value: bool) -> Self {
        Element::Bool(value)
    }
}

impl From<NaiveDate> for Element {
    fn from(value: NaiveDate) -> Self {
        Element::Date(value)
    }
}

impl From<NaiveDateTime> for Element {
    fn from(value: NaiveDateTime) -> Self {
        Element::Datetime(value)
    }
}

impl From<Vec<Element>> for Element {
    fn from(values: Vec<Element>) -> Self {
        Element::Array(values)
    }
}
