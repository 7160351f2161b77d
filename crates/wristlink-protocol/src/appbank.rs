//! App bank contents, removal, and install notifications.
//!
//! The APP_MANAGER endpoint reports which applications occupy the device's
//! fixed installation slots. A contents response is a 9-byte header
//! (`u8 kind, u32 capacity, u32 count`) followed by `count` fixed 78-byte
//! app records; other payloads on the endpoint are install/remove result
//! notifications.

use std::fmt;

use wristlink_pack::{pack, unpack, Value};

use crate::constants::*;
use crate::error::ProtocolError;

/// Descriptor for the bank contents header.
const BANK_HEADER_FORMAT: &str = "!BII";
/// Descriptor for one fixed app record.
const APP_RECORD_FORMAT: &str = "!II32s32sIH";

/// One installed application, decoded from its fixed 78-byte record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    /// Application id.
    pub id: u32,
    /// Bank slot the app occupies.
    pub index: u32,
    /// Application name (fixed 32-byte field, trailing NULs stripped).
    pub name: String,
    /// Vendor name (fixed 32-byte field, trailing NULs stripped).
    pub company: String,
    /// Application flags.
    pub flags: u32,
    /// Packed version: major in the high byte, minor in the low byte.
    pub raw_version: u16,
}

impl App {
    /// Render the version as `"major.minor"`.
    pub fn version(&self) -> String {
        format!("{}.{}", self.raw_version >> 8, self.raw_version & 0xFF)
    }

    fn decode(record: &[u8]) -> Result<App, ProtocolError> {
        let fields = unpack(APP_RECORD_FORMAT, record)?;
        let [Value::UInt32(id), Value::UInt32(index), Value::Text(name), Value::Text(company), Value::UInt32(flags), Value::UInt16(raw_version)] =
            fields.as_slice()
        else {
            // the record descriptor always expands to this shape
            unreachable!("app record descriptor shape");
        };
        Ok(App {
            id: *id,
            index: *index,
            name: name.clone(),
            company: company.clone(),
            flags: *flags,
            raw_version: *raw_version,
        })
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, version {} by {}", self.name, self.version(), self.company)
    }
}

/// Snapshot of the device's app bank, decoded once from a single contents
/// response and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppBank {
    /// Total number of app slots (free and occupied).
    pub size: u32,
    /// Installed apps, in response order.
    pub apps: Vec<App>,
}

impl AppBank {
    /// Decode a bank contents payload.
    ///
    /// The leading byte is the endpoint's response-kind discriminator and is
    /// not interpreted here. Fails when the payload is shorter than the
    /// header or than the record count the header claims.
    pub fn decode(payload: &[u8]) -> Result<AppBank, ProtocolError> {
        if payload.len() < APPBANK_HEADER_SIZE {
            return Err(ProtocolError::PayloadTooShort {
                expected: APPBANK_HEADER_SIZE,
                actual: payload.len(),
            });
        }
        let header = unpack(BANK_HEADER_FORMAT, payload)?;
        let [Value::UInt8(_), Value::UInt32(size), Value::UInt32(count)] = header.as_slice() else {
            unreachable!("bank header descriptor shape");
        };

        let count = *count as usize;
        let expected = APPBANK_HEADER_SIZE + count * APP_RECORD_SIZE;
        if payload.len() < expected {
            return Err(ProtocolError::PayloadTooShort {
                expected,
                actual: payload.len(),
            });
        }

        let mut apps = Vec::with_capacity(count);
        for i in 0..count {
            let start = APPBANK_HEADER_SIZE + i * APP_RECORD_SIZE;
            apps.push(App::decode(&payload[start..start + APP_RECORD_SIZE])?);
        }
        for app in &apps {
            log::debug!("app bank slot {}: {} ({})", app.index, app, app.id);
        }

        Ok(AppBank { size: *size, apps })
    }
}

/// Requests the host sends on the APP_MANAGER endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppBankRequest {
    /// Ask for the bank contents.
    Contents,
    /// Remove the app occupying a slot.
    Remove {
        /// Application id.
        id: u32,
        /// Bank slot the app occupies.
        index: u32,
    },
}

impl AppBankRequest {
    /// Encode the request payload.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let data = match self {
            AppBankRequest::Contents => pack("!B", &[Value::UInt8(APPBANK_REQ_CONTENTS)])?,
            AppBankRequest::Remove { id, index } => pack(
                "!BII",
                &[
                    Value::UInt8(APPBANK_REQ_REMOVE),
                    Value::UInt32(*id),
                    Value::UInt32(*index),
                ],
            )?,
        };
        Ok(data)
    }
}

/// Result notification after an install, remove, or update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallEvent {
    /// The slot is available.
    Available,
    /// The app was removed.
    Removed,
    /// The app was updated in place.
    Updated,
    /// An event code this library does not know.
    Unknown(u32),
}

impl InstallEvent {
    /// Decode an install notification (`u8 kind, u32 event`).
    pub fn decode(payload: &[u8]) -> Result<InstallEvent, ProtocolError> {
        let fields = unpack("!BI", payload)?;
        let [Value::UInt8(_), Value::UInt32(event)] = fields.as_slice() else {
            unreachable!("install event descriptor shape");
        };
        Ok(match event {
            0 => InstallEvent::Available,
            1 => InstallEvent::Removed,
            2 => InstallEvent::Updated,
            other => InstallEvent::Unknown(*other),
        })
    }
}

/// A decoded inbound payload on the APP_MANAGER endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppBankMessage {
    /// Bank contents snapshot.
    Contents(AppBank),
    /// Install/remove result notification.
    Install(InstallEvent),
}

impl AppBankMessage {
    /// Decode an APP_MANAGER payload by its response-kind byte.
    pub fn decode(payload: &[u8]) -> Result<AppBankMessage, ProtocolError> {
        match payload.first() {
            None => Err(ProtocolError::PayloadTooShort {
                expected: 1,
                actual: 0,
            }),
            Some(&APPBANK_RESP_CONTENTS) => Ok(AppBankMessage::Contents(AppBank::decode(payload)?)),
            Some(_) => Ok(AppBankMessage::Install(InstallEvent::decode(payload)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a contents payload with the given capacity and records.
    fn contents_payload(capacity: u32, records: &[Vec<u8>]) -> Vec<u8> {
        let mut payload = vec![APPBANK_RESP_CONTENTS];
        payload.extend_from_slice(&capacity.to_be_bytes());
        payload.extend_from_slice(&(records.len() as u32).to_be_bytes());
        for record in records {
            payload.extend_from_slice(record);
        }
        payload
    }

    /// Build one 78-byte app record.
    fn app_record(id: u32, index: u32, name: &str, company: &str, flags: u32, version: u16) -> Vec<u8> {
        let mut record = Vec::with_capacity(APP_RECORD_SIZE);
        record.extend_from_slice(&id.to_be_bytes());
        record.extend_from_slice(&index.to_be_bytes());
        let mut name_field = [0u8; 32];
        name_field[..name.len()].copy_from_slice(name.as_bytes());
        record.extend_from_slice(&name_field);
        let mut company_field = [0u8; 32];
        company_field[..company.len()].copy_from_slice(company.as_bytes());
        record.extend_from_slice(&company_field);
        record.extend_from_slice(&flags.to_be_bytes());
        record.extend_from_slice(&version.to_be_bytes());
        record
    }

    #[test]
    fn test_empty_bank() {
        let bank = AppBank::decode(&contents_payload(8, &[])).unwrap();
        assert_eq!(bank.size, 8);
        assert!(bank.apps.is_empty());
    }

    #[test]
    fn test_decode_records() {
        let records = vec![
            app_record(0xA1B2_C3D4, 0, "Watchface", "Example Labs", 3, 0x0102),
            app_record(7, 1, "Tracker", "Someone Else", 0, 0x1400),
        ];
        let bank = AppBank::decode(&contents_payload(8, &records)).unwrap();

        assert_eq!(bank.apps.len(), 2);
        let app = &bank.apps[0];
        assert_eq!(app.id, 0xA1B2_C3D4);
        assert_eq!(app.index, 0);
        assert_eq!(app.name, "Watchface");
        assert_eq!(app.company, "Example Labs");
        assert_eq!(app.flags, 3);
        assert_eq!(app.version(), "1.2");
        assert_eq!(bank.apps[1].version(), "20.0");
    }

    #[test]
    fn test_header_too_short() {
        let err = AppBank::decode(&[1, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::PayloadTooShort {
                expected: APPBANK_HEADER_SIZE,
                actual: 3
            }
        );
    }

    #[test]
    fn test_truncated_records_rejected() {
        // header claims two records but only one follows
        let records = vec![app_record(1, 0, "A", "B", 0, 0)];
        let mut payload = contents_payload(8, &records);
        payload[5..9].copy_from_slice(&2u32.to_be_bytes());

        let err = AppBank::decode(&payload).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::PayloadTooShort {
                expected: APPBANK_HEADER_SIZE + 2 * APP_RECORD_SIZE,
                actual: payload.len(),
            }
        );
    }

    #[test]
    fn test_request_encoding() {
        assert_eq!(
            AppBankRequest::Contents.encode().unwrap(),
            vec![APPBANK_REQ_CONTENTS]
        );

        let data = AppBankRequest::Remove {
            id: 0x0102_0304,
            index: 5,
        }
        .encode()
        .unwrap();
        assert_eq!(data, [2, 1, 2, 3, 4, 0, 0, 0, 5]);
    }

    #[test]
    fn test_install_event_mapping() {
        let mut payload = vec![2];
        payload.extend_from_slice(&1u32.to_be_bytes());
        assert_eq!(InstallEvent::decode(&payload).unwrap(), InstallEvent::Removed);

        payload[1..5].copy_from_slice(&9u32.to_be_bytes());
        assert_eq!(
            InstallEvent::decode(&payload).unwrap(),
            InstallEvent::Unknown(9)
        );
    }

    #[test]
    fn test_message_dispatch_on_kind_byte() {
        let contents = contents_payload(8, &[]);
        assert!(matches!(
            AppBankMessage::decode(&contents).unwrap(),
            AppBankMessage::Contents(_)
        ));

        let mut install = vec![2];
        install.extend_from_slice(&0u32.to_be_bytes());
        assert_eq!(
            AppBankMessage::decode(&install).unwrap(),
            AppBankMessage::Install(InstallEvent::Available)
        );
    }
}
