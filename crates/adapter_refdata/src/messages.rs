//! Builders for reference-data response messages.
//!
//! Used by [`ScriptedSession`](crate::ScriptedSession) responders and by
//! tests to produce payloads shaped like real `ReferenceDataResponse`
//! messages.

use crate::element::Element;
use crate::event::Message;
use crate::names::{
    CATEGORY, FIELD_DATA, MESSAGE, REFERENCE_DATA_RESPONSE, RESPONSE_ERROR, SECURITY,
    SECURITY_DATA, SECURITY_ERROR, SUBCATEGORY,
};

/// Error element with category, subcategory and message text
pub fn error_info(category: &str, subcategory: &str, message: &str) -> Element {
    Element::sequence([
        (CATEGORY, Element::string(category)),
        (SUBCATEGORY, Element::string(subcategory)),
        (MESSAGE, Element::string(message)),
    ])
}

/// A `securityData` entry carrying field values
pub fn security_entry<I, K>(security: &str, fields: I) -> Element
where
    I: IntoIterator<Item = (K, Element)>,
    K: Into<String>,
{
    Element::sequence([
        (SECURITY, Element::string(security)),
        (FIELD_DATA, Element::sequence(fields)),
    ])
}

/// A `securityData` entry carrying a security-level error
pub fn security_error_entry(security: &str, error: Element) -> Element {
    Element::sequence([
        (SECURITY, Element::string(security)),
        (SECURITY_ERROR, error),
        (FIELD_DATA, Element::empty_sequence()),
    ])
}

/// A `ReferenceDataResponse` message holding the given `securityData` entries
pub fn reference_data_response(entries: Vec<Element>) -> Message {
    Message::new(
        REFERENCE_DATA_RESPONSE,
        Element::sequence([(SECURITY_DATA, Element::Array(entries))]),
    )
}

/// A `ReferenceDataResponse` message holding a message-level error
pub fn response_error(error: Element) -> Message {
    Message::new(
        REFERENCE_DATA_RESPONSE,
        Element::sequence([(RESPONSE_ERROR, error)]),
    )
}
