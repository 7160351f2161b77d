//! Protocol constants
//!
//! These constants define the command codes, status values, and fixed
//! record sizes used on the wristlink serial protocol endpoints.

// ============================================================================
// Transfer Commands (host → device, PUT_BYTES endpoint)
// ============================================================================

/// Open a transfer session: `u8=1, u32 total_length, u8 type, u8 slot`.
pub const PUTBYTES_CMD_BEGIN: u8 = 1;
/// Send one chunk of payload: `u8=2, u32 token, u32 len, bytes[len]`.
pub const PUTBYTES_CMD_DATA: u8 = 2;
/// Commit the transferred buffer: `u8=3, u32 token, u32 crc`.
pub const PUTBYTES_CMD_COMMIT: u8 = 3;
/// Abort the session: `u8=4, u32 token`.
pub const PUTBYTES_CMD_ABORT: u8 = 4;
/// Finalize/install the committed buffer: `u8=5, u32 token`.
pub const PUTBYTES_CMD_FINALIZE: u8 = 5;

/// Status byte the device sends for a successful operation. Any other value
/// is a failure, regardless of its numeric code.
pub const STATUS_ACK: u8 = 1;

/// Maximum payload bytes carried by one data chunk.
pub const TRANSFER_CHUNK_SIZE: usize = 2000;

// ============================================================================
// App Bank (APP_MANAGER endpoint)
// ============================================================================

/// Request the app bank contents (single request byte).
pub const APPBANK_REQ_CONTENTS: u8 = 1;
/// Remove an installed app: `u8=2, u32 id, u32 index`.
pub const APPBANK_REQ_REMOVE: u8 = 2;

/// Response-kind byte that introduces a bank contents payload.
pub const APPBANK_RESP_CONTENTS: u8 = 1;

/// Size of the bank contents header (`u8 kind, u32 capacity, u32 count`).
pub const APPBANK_HEADER_SIZE: usize = 9;
/// Size of one fixed app record.
pub const APP_RECORD_SIZE: usize = 78;

// ============================================================================
// Checksum
// ============================================================================

/// Polynomial of the device's hardware CRC unit.
pub const CRC_POLY: u32 = 0x04C1_1DB7;
/// Seed of the device's hardware CRC unit.
pub const CRC_SEED: u32 = 0xFFFF_FFFF;
