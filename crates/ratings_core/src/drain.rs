//! Event draining for a single outstanding request.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use adapter_refdata::{CorrelationId, Event, Message, SessionError, VendorSession};
use thiserror::Error;

/// Default wait per poll of the session
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// Default upper bound on waiting for a request's final event
pub const DEFAULT_DRAIN_DEADLINE: Duration = Duration::from_secs(120);

/// Timing bounds for draining a reply stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainPolicy {
    pub poll_timeout: Duration,
    pub deadline: Duration,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            deadline: DEFAULT_DRAIN_DEADLINE,
        }
    }
}

impl DrainPolicy {
    pub fn new(poll_timeout: Duration, deadline: Duration) -> Self {
        Self {
            poll_timeout,
            deadline,
        }
    }
}

#[derive(Debug, Error)]
pub enum DrainError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("No final response within {0:?}")]
    DeadlineElapsed(Duration),
}

fn answers(message: &Message, id: CorrelationId) -> bool {
    message.correlation_id.map_or(true, |c| c == id)
}

fn ends_request(event: &Event, id: CorrelationId) -> bool {
    event.is_final() && (event.messages.is_empty() || event.iter().any(|m| answers(m, id)))
}

/// Read events until the final response to request `id` arrives.
///
/// `visit` sees every data message answering `id`, partial and final alike.
/// Returning `ControlFlow::Break` stops draining early and hands the value
/// back. Timeout and status events are skipped.
pub fn drain_replies<S, B, F>(
    session: &mut S,
    id: CorrelationId,
    policy: &DrainPolicy,
    mut visit: F,
) -> Result<ControlFlow<B>, DrainError>
where
    S: VendorSession + ?Sized,
    F: FnMut(&Message) -> ControlFlow<B>,
{
    let started = Instant::now();

    loop {
        if started.elapsed() >= policy.deadline {
            return Err(DrainError::DeadlineElapsed(policy.deadline));
        }

        let event = session.next_event(policy.poll_timeout)?;
        if !event.carries_data() {
            continue;
        }

        for message in event.iter().filter(|m| answers(m, id)) {
            if let ControlFlow::Break(value) = visit(message) {
                return Ok(ControlFlow::Break(value));
            }
        }

        if ends_request(&event, id) {
            return Ok(ControlFlow::Continue(()));
        }
    }
}
