//! Session abstraction over the vendor's request/event model.

use std::time::Duration;

use thiserror::Error;

use crate::event::Event;
use crate::request::{CorrelationId, Request};

/// Session-level errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Rejected by terminal: {0}")]
    Rejected(String),

    #[error("Session is not started")]
    NotStarted,

    #[error("Service {0} is not open")]
    ServiceNotOpen(String),

    #[error("Session closed by peer")]
    Closed,
}

/// Connection settings for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Terminal (or bridge) host
    pub host: String,
    /// Terminal (or bridge) port
    pub port: u16,
    /// Upper bound on connecting and on each handshake exchange
    pub connect_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8194,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl SessionOptions {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// `host:port` string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A blocking session against the terminal.
///
/// Mirrors the vendor SDK lifecycle: [`start`](VendorSession::start), then
/// [`open_service`](VendorSession::open_service), then any number of
/// [`send_request`](VendorSession::send_request) calls whose replies are read
/// back with [`next_event`](VendorSession::next_event).
pub trait VendorSession: Send {
    /// Start the session
    fn start(&mut self) -> Result<(), SessionError>;

    /// Open a service by name, e.g. `//blp/refdata`
    fn open_service(&mut self, name: &str) -> Result<(), SessionError>;

    /// Send a request; replies arrive through [`next_event`](VendorSession::next_event)
    fn send_request(&mut self, request: &Request) -> Result<CorrelationId, SessionError>;

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns an event of type `Timeout` when nothing arrived in time.
    fn next_event(&mut self, timeout: Duration) -> Result<Event, SessionError>;

    /// Stop the session and release its resources
    fn stop(&mut self);
}

impl<S: VendorSession + ?Sized> VendorSession for Box<S> {
    fn start(&mut self) -> Result<(), SessionError> {
        (**self).start()
    }

    fn open_service(&mut self, name: &str) -> Result<(), SessionError> {
        (**self).open_service(name)
    }

    fn send_request(&mut self, request: &Request) -> Result<CorrelationId, SessionError> {
        (**self).send_request(request)
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Event, SessionError> {
        (**self).next_event(timeout)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
