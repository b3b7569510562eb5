//! Events delivered by a session.

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::request::CorrelationId;

/// Kind of an event.
///
/// Only [`EventType::Response`] marks the end of a request's reply stream;
/// [`EventType::PartialResponse`] events precede it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    PartialResponse,
    Response,
    Timeout,
    SessionStatus,
    ServiceStatus,
    RequestStatus,
    #[serde(other)]
    Other,
}

/// A single message within an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message type name, e.g. `ReferenceDataResponse`
    pub message_type: String,
    /// Correlation id of the request this message answers
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,
    /// Message payload
    pub body: Element,
}

impl Message {
    pub fn new(message_type: impl Into<String>, body: Element) -> Self {
        Self {
            message_type: message_type.into(),
            correlation_id: None,
            body,
        }
    }

    pub fn with_correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Whether the payload carries the named top-level element
    pub fn has_element(&self, name: &str) -> bool {
        self.body.has_element(name)
    }

    /// Named top-level element of the payload
    pub fn get_element(&self, name: &str) -> Option<&Element> {
        self.body.get(name)
    }
}

/// A batch of messages of one event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_type: EventType,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Event {
    pub fn new(event_type: EventType, messages: Vec<Message>) -> Self {
        Self {
            event_type,
            messages,
        }
    }

    /// Event returned when nothing arrived within the poll timeout
    pub fn timeout() -> Self {
        Self::new(EventType::Timeout, Vec::new())
    }

    pub fn partial(messages: Vec<Message>) -> Self {
        Self::new(EventType::PartialResponse, messages)
    }

    pub fn response(messages: Vec<Message>) -> Self {
        Self::new(EventType::Response, messages)
    }

    /// Whether this event terminates a request's reply stream
    pub fn is_final(&self) -> bool {
        self.event_type == EventType::Response
    }

    /// Whether this event carries response data (partial or final)
    pub fn carries_data(&self) -> bool {
        matches!(
            self.event_type,
            EventType::PartialResponse | EventType::Response
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a Event {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
