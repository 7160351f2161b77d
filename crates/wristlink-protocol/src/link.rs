//! The message boundary between protocol sessions and the physical link.
//!
//! The device multiplexes several logical protocols over one serial
//! connection; each application payload is addressed to a numeric endpoint.
//! Transport establishment and outer framing live outside this crate — what
//! crosses this boundary is the endpoint id plus the stripped application
//! payload, in both directions.
//!
//! Outbound messages go through [`MessageSink`], fire-and-forget. Inbound
//! payloads are delivered through an [`EndpointRouter`]: a session claims an
//! endpoint's single handler slot with a channel sender for its lifetime,
//! and the transport's read loop calls [`EndpointRouter::dispatch`] for each
//! received payload.

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::Sender;

use crate::error::ProtocolError;

/// A logical channel identifier multiplexed over the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint(pub u16);

impl Endpoint {
    /// Wall-clock read/set.
    pub const TIME: Endpoint = Endpoint(11);
    /// Firmware version report.
    pub const VERSION: Endpoint = Endpoint(16);
    /// System messages.
    pub const SYSTEM_MESSAGE: Endpoint = Endpoint(18);
    /// Music metadata and control.
    pub const MUSIC_CONTROL: Endpoint = Endpoint(32);
    /// Device log records.
    pub const LOGS: Endpoint = Endpoint(2000);
    /// Ping/pong liveness.
    pub const PING: Endpoint = Endpoint(2001);
    /// Notifications.
    pub const NOTIFICATION: Endpoint = Endpoint(3000);
    /// Resource storage.
    pub const RESOURCE: Endpoint = Endpoint(4000);
    /// Installed application management.
    pub const APP_MANAGER: Endpoint = Endpoint(6000);
    /// Chunked file transfer.
    pub const PUT_BYTES: Endpoint = Endpoint(0xBEEF);
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound message capability supplied by the transport.
///
/// Sends are fire-and-forget: the call returns immediately and the response,
/// if any, arrives later as a separate inbound payload. The transport
/// guarantees in-order delivery per endpoint.
pub trait MessageSink {
    /// Send one application payload to the given endpoint.
    fn send_message(&mut self, endpoint: Endpoint, payload: &[u8]);
}

/// Maps each endpoint to its single active inbound handler.
///
/// A handler is the sending half of a channel; the session owner drains the
/// receiving half and feeds payloads into the session. Claiming an endpoint
/// that is already held fails — exactly one session may hold an endpoint at
/// a time.
#[derive(Debug, Default)]
pub struct EndpointRouter {
    handlers: HashMap<Endpoint, Sender<Vec<u8>>>,
}

impl EndpointRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        EndpointRouter {
            handlers: HashMap::new(),
        }
    }

    /// Claim an endpoint's handler slot for the lifetime of a session.
    pub fn claim(&mut self, endpoint: Endpoint, inbox: Sender<Vec<u8>>) -> Result<(), ProtocolError> {
        if self.handlers.contains_key(&endpoint) {
            return Err(ProtocolError::EndpointClaimed(endpoint));
        }
        self.handlers.insert(endpoint, inbox);
        Ok(())
    }

    /// Release an endpoint's handler slot. Returns whether a handler was
    /// registered.
    pub fn release(&mut self, endpoint: Endpoint) -> bool {
        self.handlers.remove(&endpoint).is_some()
    }

    /// Whether an endpoint currently has a handler.
    pub fn is_claimed(&self, endpoint: Endpoint) -> bool {
        self.handlers.contains_key(&endpoint)
    }

    /// Deliver one inbound payload to the endpoint's handler.
    ///
    /// Returns `true` if the payload was handed off. Payloads for unclaimed
    /// endpoints are dropped; a handler whose receiver is gone is removed.
    pub fn dispatch(&mut self, endpoint: Endpoint, payload: &[u8]) -> bool {
        match self.handlers.get(&endpoint) {
            Some(inbox) => {
                if inbox.send(payload.to_vec()).is_ok() {
                    true
                } else {
                    log::trace!("handler for endpoint {} is gone, releasing", endpoint);
                    self.handlers.remove(&endpoint);
                    false
                }
            }
            None => {
                log::trace!(
                    "no handler for endpoint {}, dropping {} bytes",
                    endpoint,
                    payload.len()
                );
                false
            }
        }
    }
}
