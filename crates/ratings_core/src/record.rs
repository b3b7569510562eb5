//! Raw and canonical bond records.

use std::collections::BTreeMap;
use std::fmt;

use adapter_refdata::Element;
use serde::{Deserialize, Serialize};

/// Scalar value of a vendor field.
///
/// Dates and datetimes are already rendered as canonical text
/// (`YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`) by the time they land here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    /// Convert a scalar element. Sequences and arrays have no scalar value.
    pub fn from_element(element: &Element) -> Option<Self> {
        match element {
            Element::String(s) => Some(FieldValue::Text(s.clone())),
            Element::Int(i) => Some(FieldValue::Integer(*i)),
            Element::Float(x) => Some(FieldValue::Float(*x)),
            Element::Bool(b) => Some(FieldValue::Bool(*b)),
            Element::Date(d) => Some(FieldValue::Text(d.format("%Y-%m-%d").to_string())),
            Element::Datetime(dt) => {
                Some(FieldValue::Text(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
            }
            Element::Sequence(_) | Element::Array(_) => None,
        }
    }

    /// Text form of the value
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Field values of one security; `None` marks a requested field the vendor did not return
pub type RawFieldRecord = BTreeMap<String, Option<FieldValue>>;

/// Raw field records keyed by the vendor's echoed security identifier
pub type RawDataSet = BTreeMap<String, RawFieldRecord>;

/// Rating agency outlook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outlook {
    Positive,
    Negative,
    #[default]
    Stable,
    Developing,
}

impl Outlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outlook::Positive => "positive",
            Outlook::Negative => "negative",
            Outlook::Stable => "stable",
            Outlook::Developing => "developing",
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a rating is under review for change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WatchStatus {
    Positive,
    Negative,
    #[default]
    #[serde(rename = "Not on watchlist")]
    NotOnWatchlist,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Positive => "Positive",
            WatchStatus::Negative => "Negative",
            WatchStatus::NotOnWatchlist => "Not on watchlist",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical bond record served over HTTP.
///
/// Every attribute is always present; see [`crate::transform`] for defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BondRecord {
    pub isin: String,
    pub issuer: String,
    pub country: String,
    pub sector: String,
    pub industry: String,
    pub moodys_rating: String,
    pub sp_rating: String,
    pub fitch_rating: String,
    pub moodys_rating_date: String,
    pub sp_rating_date: String,
    pub fitch_rating_date: String,
    pub moodys_outlook: Outlook,
    pub sp_outlook: Outlook,
    pub fitch_outlook: Outlook,
    pub moodys_outlook_date: String,
    pub sp_outlook_date: String,
    pub fitch_outlook_date: String,
    pub moodys_watch: WatchStatus,
    pub sp_watch: WatchStatus,
    pub fitch_watch: WatchStatus,
}

impl BondRecord {
    /// Whether the issuer name resolved to something non-empty
    pub fn has_issuer(&self) -> bool {
        !self.issuer.trim().is_empty()
    }
}
