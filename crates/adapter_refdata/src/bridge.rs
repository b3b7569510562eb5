//! TCP transport to the terminal bridge.
//!
//! The vendor SDK is a native library hosted by a bridge process next to the
//! terminal. The bridge relays the session model as newline-delimited JSON:
//!
//! ```text
//! -> {"start":{}}
//! <- {"status":{"ok":true}}
//! -> {"openService":{"name":"//blp/refdata"}}
//! <- {"status":{"ok":true}}
//! -> {"request":{"correlationId":1,"service":"//blp/refdata","operation":"ReferenceDataRequest","securities":[..],"fields":[..]}}
//! <- {"event":{"eventType":"PARTIAL_RESPONSE","messages":[..]}}
//! <- {"event":{"eventType":"RESPONSE","messages":[..]}}
//! -> {"stop":{}}
//! ```
//!
//! All I/O is blocking. [`next_event`](VendorSession::next_event) maps a read
//! timeout to a `Timeout` event.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::event::{Event, EventType};
use crate::request::{CorrelationId, Request};
use crate::session::{SessionError, SessionOptions, VendorSession};

/// Smallest read timeout handed to the socket; a zero timeout is rejected by std.
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum OutboundFrame<'a> {
    Start {},
    OpenService {
        name: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Request {
        correlation_id: CorrelationId,
        service: &'a str,
        operation: &'a str,
        securities: &'a [String],
        fields: &'a [String],
    },
    Stop {},
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum InboundFrame {
    Status {
        ok: bool,
        #[serde(default)]
        reason: Option<String>,
    },
    Event(Event),
}

struct Connection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    /// Bytes of a frame whose newline has not arrived yet
    partial: Vec<u8>,
}

/// Session connected to the terminal bridge over TCP
pub struct BridgeSession {
    options: SessionOptions,
    connection: Option<Connection>,
    pending: VecDeque<Event>,
    open_services: Vec<String>,
    next_correlation: u64,
}

impl BridgeSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            connection: None,
            pending: VecDeque::new(),
            open_services: Vec::new(),
            next_correlation: 1,
        }
    }

    fn connect(&self) -> Result<Connection, SessionError> {
        let address = self.options.server_address();
        let mut last_error = None;

        for addr in address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.options.connect_timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    let writer = stream.try_clone()?;
                    return Ok(Connection {
                        reader: BufReader::new(stream),
                        writer,
                        partial: Vec::new(),
                    });
                }
                Err(e) => {
                    debug!(%addr, error = %e, "Bridge connect attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => SessionError::Io(e),
            None => SessionError::Protocol(format!("{} resolved to no addresses", address)),
        })
    }

    fn connection(&mut self) -> Result<&mut Connection, SessionError> {
        self.connection.as_mut().ok_or(SessionError::NotStarted)
    }

    fn write_frame(&mut self, frame: &OutboundFrame<'_>) -> Result<(), SessionError> {
        let mut line = serde_json::to_vec(frame)
            .map_err(|e| SessionError::Protocol(format!("Failed to encode frame: {}", e)))?;
        line.push(b'\n');

        let connection = self.connection()?;
        connection.writer.write_all(&line)?;
        connection.writer.flush()?;
        Ok(())
    }

    /// Read one frame, waiting at most `timeout`. `Ok(None)` on timeout.
    fn read_frame(&mut self, timeout: Duration) -> Result<Option<InboundFrame>, SessionError> {
        let connection = self.connection()?;
        connection
            .reader
            .get_ref()
            .set_read_timeout(Some(timeout.max(MIN_READ_TIMEOUT)))?;

        match connection.reader.read_until(b'\n', &mut connection.partial) {
            Ok(0) => Err(SessionError::Closed),
            Ok(_) if connection.partial.last() != Some(&b'\n') => Err(SessionError::Closed),
            Ok(_) => {
                let line = std::mem::take(&mut connection.partial);
                serde_json::from_slice(&line)
                    .map(Some)
                    .map_err(|e| SessionError::Protocol(format!("Malformed frame: {}", e)))
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(SessionError::Io(e)),
        }
    }

    /// Wait for the status frame acknowledging a handshake step.
    ///
    /// Events arriving in the meantime are kept for `next_event`.
    fn await_status(&mut self, step: &str) -> Result<(), SessionError> {
        let deadline = Instant::now() + self.options.connect_timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SessionError::Protocol(format!(
                    "No acknowledgement for {} within {:?}",
                    step, self.options.connect_timeout
                )));
            }

            match self.read_frame(remaining)? {
                Some(InboundFrame::Status { ok: true, .. }) => return Ok(()),
                Some(InboundFrame::Status { ok: false, reason }) => {
                    return Err(SessionError::Rejected(
                        reason.unwrap_or_else(|| format!("{} refused", step)),
                    ));
                }
                Some(InboundFrame::Event(event)) => self.pending.push_back(event),
                None => {}
            }
        }
    }
}

impl std::fmt::Debug for BridgeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeSession")
            .field("address", &self.options.server_address())
            .field("connected", &self.connection.is_some())
            .field("open_services", &self.open_services)
            .finish()
    }
}

impl VendorSession for BridgeSession {
    fn start(&mut self) -> Result<(), SessionError> {
        if self.connection.is_some() {
            return Ok(());
        }

        self.connection = Some(self.connect()?);
        let started = self
            .write_frame(&OutboundFrame::Start {})
            .and_then(|_| self.await_status("session start"));

        if let Err(e) = started {
            self.connection = None;
            return Err(e);
        }

        debug!(address = %self.options.server_address(), "Bridge session started");
        Ok(())
    }

    fn open_service(&mut self, name: &str) -> Result<(), SessionError> {
        if self.open_services.iter().any(|s| s == name) {
            return Ok(());
        }

        self.write_frame(&OutboundFrame::OpenService { name })?;
        self.await_status("service open").map_err(|e| match e {
            SessionError::Rejected(reason) => {
                SessionError::ServiceNotOpen(format!("{} ({})", name, reason))
            }
            other => other,
        })?;

        self.open_services.push(name.to_string());
        Ok(())
    }

    fn send_request(&mut self, request: &Request) -> Result<CorrelationId, SessionError> {
        if !self.open_services.iter().any(|s| *s == request.service) {
            return Err(SessionError::ServiceNotOpen(request.service.clone()));
        }

        let correlation_id = CorrelationId(self.next_correlation);
        self.next_correlation += 1;

        self.write_frame(&OutboundFrame::Request {
            correlation_id,
            service: &request.service,
            operation: &request.operation,
            securities: &request.securities,
            fields: &request.fields,
        })?;

        Ok(correlation_id)
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Event, SessionError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(event);
        }

        match self.read_frame(timeout)? {
            Some(InboundFrame::Event(event)) => Ok(event),
            Some(InboundFrame::Status { ok, reason }) => {
                if !ok {
                    warn!(reason = ?reason, "Bridge reported a session status failure");
                }
                Ok(Event::new(EventType::SessionStatus, Vec::new()))
            }
            None => Ok(Event::timeout()),
        }
    }

    fn stop(&mut self) {
        if self.connection.is_none() {
            return;
        }

        if let Err(e) = self.write_frame(&OutboundFrame::Stop {}) {
            debug!(error = %e, "Failed to notify bridge of session stop");
        }
        if let Some(connection) = self.connection.take() {
            let _ = connection.writer.shutdown(std::net::Shutdown::Both);
        }
        self.open_services.clear();
        self.pending.clear();
    }
}

impl Drop for BridgeSession {
    fn drop(&mut self) {
        self.stop();
    }
}
