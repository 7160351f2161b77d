//! Binary struct packing for the wristlink wire protocol.
//!
//! The device's serial protocol mixes fixed headers, fixed-width text fields
//! and raw binary blobs in the same message. Rather than bespoke marshaling
//! per message, every wire layout is written as a compact format descriptor
//! and packed/unpacked through this crate, so a layout change is a one-line
//! edit.
//!
//! # Descriptor Grammar
//!
//! A descriptor starts with `!` (network byte order, required) followed by
//! field elements, each an optional decimal count plus a field character:
//!
//! - `b`/`B` — signed/unsigned 8-bit integer
//! - `h`/`H` — signed/unsigned 16-bit integer
//! - `i`/`I`, `l`/`L` — signed/unsigned 32-bit integer
//! - `[width]s` — fixed-width UTF-8 text (width 1 if omitted, `0s` is the
//!   empty string)
//! - `[width]S` — fixed-width raw bytes
//!
//! A count in front of a numeric kind repeats it; in front of `s`/`S` it is
//! the field width.
//!
//! # Example
//!
//! ```rust,ignore
//! use wristlink_pack::{pack, unpack, Value};
//!
//! let data = pack("!BI", &[Value::UInt8(1), Value::UInt32(5000)])?;
//! let values = unpack("!BI", &data)?;
//! assert_eq!(values[1].as_u32(), Some(5000));
//! ```

mod codec;
mod error;
mod format;
mod value;

pub use codec::*;
pub use error::*;
pub use format::*;
pub use value::*;
