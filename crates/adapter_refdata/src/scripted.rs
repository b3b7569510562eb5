//! Deterministic in-process session.
//!
//! A [`ScriptedSession`] answers each request by calling a responder closure
//! and queueing the events it returns. When the queue is empty,
//! [`next_event`](VendorSession::next_event) returns a `Timeout` event
//! immediately instead of waiting.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::event::Event;
use crate::request::{CorrelationId, Request};
use crate::session::{SessionError, VendorSession};

type Responder = Box<dyn FnMut(&Request) -> Vec<Event> + Send>;

/// Shared record of the requests a [`ScriptedSession`] received.
///
/// Clones observe the same log, so a test can keep one while the session is
/// moved into the component under test.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<Request>>>);

impl RequestLog {
    fn push(&self, request: Request) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
    }

    /// Snapshot of all requests received so far
    pub fn requests(&self) -> Vec<Request> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Session whose replies are produced by a responder closure
pub struct ScriptedSession {
    responder: Responder,
    queue: VecDeque<Event>,
    log: RequestLog,
    start_failure: Option<String>,
    unavailable_services: Vec<String>,
    started: bool,
    open_services: Vec<String>,
    next_correlation: u64,
}

impl ScriptedSession {
    /// Create a session answering every request with `responder`
    pub fn new<F>(responder: F) -> Self
    where
        F: FnMut(&Request) -> Vec<Event> + Send + 'static,
    {
        Self {
            responder: Box::new(responder),
            queue: VecDeque::new(),
            log: RequestLog::default(),
            start_failure: None,
            unavailable_services: Vec::new(),
            started: false,
            open_services: Vec::new(),
            next_correlation: 1,
        }
    }

    /// Session that never produces any reply
    pub fn silent() -> Self {
        Self::new(|_| Vec::new())
    }

    /// Make [`start`](VendorSession::start) fail with `reason`
    pub fn failing_start(mut self, reason: impl Into<String>) -> Self {
        self.start_failure = Some(reason.into());
        self
    }

    /// Make [`open_service`](VendorSession::open_service) fail for `name`
    pub fn without_service(mut self, name: impl Into<String>) -> Self {
        self.unavailable_services.push(name.into());
        self
    }

    /// Start the session immediately, skipping the handshake checks
    pub fn started(mut self) -> Self {
        self.started = true;
        self
    }

    /// Handle to the log of received requests
    pub fn request_log(&self) -> RequestLog {
        self.log.clone()
    }

    /// Queue an unsolicited event
    pub fn push_event(&mut self, event: Event) {
        self.queue.push_back(event);
    }
}

impl std::fmt::Debug for ScriptedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedSession")
            .field("queued", &self.queue.len())
            .field("requests", &self.log.len())
            .field("started", &self.started)
            .finish()
    }
}

impl VendorSession for ScriptedSession {
    fn start(&mut self) -> Result<(), SessionError> {
        if let Some(reason) = &self.start_failure {
            return Err(SessionError::Rejected(reason.clone()));
        }
        self.started = true;
        Ok(())
    }

    fn open_service(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.started {
            return Err(SessionError::NotStarted);
        }
        if self.unavailable_services.iter().any(|s| s == name) {
            return Err(SessionError::ServiceNotOpen(name.to_string()));
        }
        self.open_services.push(name.to_string());
        Ok(())
    }

    fn send_request(&mut self, request: &Request) -> Result<CorrelationId, SessionError> {
        if !self.started {
            return Err(SessionError::NotStarted);
        }

        let id = CorrelationId(self.next_correlation);
        self.next_correlation += 1;

        self.log.push(request.clone());
        for mut event in (self.responder)(request) {
            for message in &mut event.messages {
                message.correlation_id.get_or_insert(id);
            }
            self.queue.push_back(event);
        }

        Ok(id)
    }

    fn next_event(&mut self, _timeout: Duration) -> Result<Event, SessionError> {
        Ok(self.queue.pop_front().unwrap_or_else(Event::timeout))
    }

    fn stop(&mut self) {
        self.started = false;
        self.open_services.clear();
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use crate::messages::{reference_data_response, security_entry};
    use crate::names::REFDATA_SERVICE;

    fn echo_session() -> ScriptedSession {
        ScriptedSession::new(|request| {
            let entries = request
                .securities
                .iter()
                .map(|s| security_entry(s, Vec::<(String, _)>::new()))
                .collect();
            vec![Event::response(vec![reference_data_response(entries)])]
        })
    }

    #[test]
    fn test_lifecycle() {
        let mut session = echo_session();
        assert!(matches!(
            session.open_service(REFDATA_SERVICE),
            Err(SessionError::NotStarted)
        ));

        session.start().unwrap();
        session.open_service(REFDATA_SERVICE).unwrap();
    }

    #[test]
    fn test_failing_start() {
        let mut session = ScriptedSession::silent().failing_start("terminal offline");
        let err = session.start().unwrap_err();
        assert!(err.to_string().contains("terminal offline"));
    }

    #[test]
    fn test_missing_service() {
        let mut session = ScriptedSession::silent().without_service(REFDATA_SERVICE);
        session.start().unwrap();
        assert!(matches!(
            session.open_service(REFDATA_SERVICE),
            Err(SessionError::ServiceNotOpen(_))
        ));
    }

    #[test]
    fn test_replies_are_queued_and_correlated() {
        let mut session = echo_session().started();
        let log = session.request_log();

        let id = session
            .send_request(&Request::reference_data(["A", "B"], ["ISSUER"]))
            .unwrap();

        let event = session.next_event(Duration::from_millis(500)).unwrap();
        assert_eq!(event.event_type, EventType::Response);
        assert_eq!(event.messages[0].correlation_id, Some(id));

        let event = session.next_event(Duration::from_millis(500)).unwrap();
        assert_eq!(event.event_type, EventType::Timeout);

        assert_eq!(log.len(), 1);
        assert_eq!(log.requests()[0].securities, vec!["A", "B"]);
    }

    #[test]
    fn test_correlation_ids_increase() {
        let mut session = ScriptedSession::silent().started();
        let first = session.send_request(&Request::reference_data(["A"], ["F"])).unwrap();
        let second = session.send_request(&Request::reference_data(["B"], ["F"])).unwrap();
        assert!(second > first);
    }
}
