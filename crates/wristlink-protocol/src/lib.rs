//! Wristlink Serial Protocol
//!
//! This crate implements the client side of the wristlink wearable's serial
//! protocol: the checksum its hardware CRC unit expects, the app bank
//! decoder, and the chunked PUT_BYTES transfer used to push firmware,
//! resources, and applications onto the device.
//!
//! # Protocol Overview
//!
//! The device multiplexes logical protocols over one serial link; each
//! application payload is addressed to a numeric endpoint. This crate covers
//! two of them:
//!
//! - **APP_MANAGER** — query the installed-app bank and remove apps
//! - **PUT_BYTES** — reliable chunked upload with handshake, commit, and
//!   finalize rounds
//!
//! Wire layouts are written as format descriptors and packed through the
//! `wristlink-pack` crate. Transport establishment and outer framing are out
//! of scope: the boundary is [`MessageSink`] outbound and
//! [`EndpointRouter`] inbound, both carrying stripped application payloads.
//!
//! # Example
//!
//! ```rust,ignore
//! use wristlink_protocol::{AppBank, PutBytesSession, TransferType};
//!
//! // Decode an app bank response
//! let bank = AppBank::decode(&payload)?;
//!
//! // Push an application binary into slot 2
//! let mut session = PutBytesSession::new(image, TransferType::Binary, 2);
//! session.begin(&mut sink)?;
//! ```

mod appbank;
mod constants;
mod crc;
mod error;
mod link;
mod putbytes;

pub use appbank::*;
pub use constants::*;
pub use crc::*;
pub use error::*;
pub use link::*;
pub use putbytes::*;
