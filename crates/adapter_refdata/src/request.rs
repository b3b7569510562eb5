//! Request construction.

use serde::{Deserialize, Serialize};

use crate::names::{REFDATA_SERVICE, REFERENCE_DATA_REQUEST};

/// Identifier tying response messages to the request that produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub u64);

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request against a vendor service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Service the request targets, e.g. `//blp/refdata`
    pub service: String,
    /// Operation name, e.g. `ReferenceDataRequest`
    pub operation: String,
    /// Securities the request asks about
    pub securities: Vec<String>,
    /// Fields requested for every security
    pub fields: Vec<String>,
}

impl Request {
    /// Build a `ReferenceDataRequest` for the given securities and fields
    pub fn reference_data<S, F>(securities: S, fields: F) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            service: REFDATA_SERVICE.to_string(),
            operation: REFERENCE_DATA_REQUEST.to_string(),
            securities: securities.into_iter().map(Into::into).collect(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a field
    pub fn append_field(&mut self, field: impl Into<String>) {
        self.fields.push(field.into());
    }
}
