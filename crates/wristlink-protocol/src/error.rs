//! Protocol error types.

use crate::link::Endpoint;
use thiserror::Error;
use wristlink_pack::PackError;

/// Errors that can occur when working with the wristlink protocol.
///
/// These cover local faults only: a malformed descriptor, a truncated
/// response, or caller misuse. A device-side NAK is not an error value but a
/// state transition of the transfer session, observable through
/// [`crate::PutBytesSession::state`] and [`crate::PutBytesSession::has_error`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A pack/unpack operation failed.
    #[error(transparent)]
    Pack(#[from] PackError),

    /// A response payload is shorter than its structure requires.
    #[error("payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// A transfer session was started more than once.
    #[error("transfer session already started")]
    AlreadyStarted,

    /// The endpoint's handler slot is already held by another session.
    #[error("endpoint {0} already claimed")]
    EndpointClaimed(Endpoint),
}
