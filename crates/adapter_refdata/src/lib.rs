//! # adapter_refdata
//!
//! Session model for the terminal's reference-data service.
//!
//! The vendor exposes reference data through a session/request/event model:
//! a session is started, a service (`//blp/refdata`) is opened, requests are
//! sent, and responses arrive asynchronously as a stream of events made of
//! messages whose payload is a tree of named elements. This crate captures
//! that model in Rust types and provides two transports:
//!
//! - [`BridgeSession`]: talks newline-delimited JSON over TCP to the bridge
//!   process hosting the vendor SDK.
//! - [`ScriptedSession`]: deterministic in-process session driven by a
//!   responder closure, for tests and offline runs.
//!
//! ## Modules
//!
//! - [`element`]: the element tree carried by messages
//! - [`event`]: events, event types and messages
//! - [`request`]: request construction
//! - [`session`]: the [`VendorSession`] trait, options and errors
//! - [`names`]: element and service names used by the reference-data schema
//! - [`messages`]: builders for reference-data response messages

pub mod bridge;
pub mod element;
pub mod event;
pub mod messages;
pub mod names;
pub mod request;
pub mod scripted;
pub mod session;

pub use bridge::BridgeSession;
pub use element::Element;
pub use event::{Event, EventType, Message};
pub use request::{CorrelationId, Request};
pub use scripted::{RequestLog, ScriptedSession};
pub use session::{SessionError, SessionOptions, VendorSession};
