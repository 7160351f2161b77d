//! Packing and unpacking against a format descriptor.

use crate::error::PackError;
use crate::format::{parse_format, FieldKind, FieldSpec};
use crate::value::Value;

/// Unpack a buffer into the ordered values a descriptor names.
///
/// Unpacking is sloppy-safe: the buffer may be longer than the described
/// layout and trailing bytes are ignored, so a packed prefix can sit in
/// front of an unrelated payload. A buffer shorter than the described layout
/// is an error.
pub fn unpack(format: &str, data: &[u8]) -> Result<Vec<Value>, PackError> {
    let specs = parse_format(format)?;
    let expected: usize = specs.iter().map(FieldSpec::byte_len).sum();
    if data.len() < expected {
        return Err(PackError::InsufficientData {
            expected,
            actual: data.len(),
        });
    }

    let mut values = Vec::with_capacity(specs.iter().map(FieldSpec::value_slots).sum());
    let mut pos = 0;
    for spec in &specs {
        match spec.kind {
            FieldKind::Text => {
                if spec.count == 0 {
                    // a zero-width text field always decodes to ""
                    values.push(Value::Text(String::new()));
                    continue;
                }
                let field = &data[pos..pos + spec.count];
                let mut end = field.len();
                while end > 0 && field[end - 1] == 0 {
                    end -= 1;
                }
                let text = std::str::from_utf8(&field[..end])
                    .map_err(|_| PackError::InvalidUtf8 { offset: pos })?;
                values.push(Value::Text(text.to_string()));
                pos += spec.count;
            }
            FieldKind::Bytes => {
                values.push(Value::Bytes(data[pos..pos + spec.count].to_vec()));
                pos += spec.count;
            }
            kind => {
                for _ in 0..spec.count {
                    values.push(read_scalar(kind, data, pos));
                    pos += kind.scalar_width();
                }
            }
        }
    }

    Ok(values)
}

/// Pack ordered values into the layout a descriptor names.
///
/// The value count must equal the number of scalar slots the descriptor
/// expands to, and each value must match its field kind. Text and byte
/// values are copied into their declared width, truncated when longer and
/// zero-filled when shorter.
pub fn pack(format: &str, values: &[Value]) -> Result<Vec<u8>, PackError> {
    let specs = parse_format(format)?;
    let size: usize = specs.iter().map(FieldSpec::byte_len).sum();
    if size == 0 {
        return Err(PackError::EmptyFormat);
    }
    let slots: usize = specs.iter().map(FieldSpec::value_slots).sum();
    if values.len() != slots {
        return Err(PackError::ValueCount {
            expected: slots,
            actual: values.len(),
        });
    }

    let mut data = vec![0u8; size];
    let mut pos = 0;
    let mut index = 0;
    for spec in &specs {
        match spec.kind {
            FieldKind::Text => {
                let text = values[index].as_text().ok_or(PackError::ValueKind {
                    index,
                    kind: spec.kind.name(),
                })?;
                index += 1;
                let src = text.as_bytes();
                let n = src.len().min(spec.count);
                data[pos..pos + n].copy_from_slice(&src[..n]);
                pos += spec.count;
            }
            FieldKind::Bytes => {
                let bytes = values[index].as_bytes().ok_or(PackError::ValueKind {
                    index,
                    kind: spec.kind.name(),
                })?;
                index += 1;
                let n = bytes.len().min(spec.count);
                data[pos..pos + n].copy_from_slice(&bytes[..n]);
                pos += spec.count;
            }
            kind => {
                for _ in 0..spec.count {
                    write_scalar(kind, &values[index], index, &mut data[pos..])?;
                    index += 1;
                    pos += kind.scalar_width();
                }
            }
        }
    }

    Ok(data)
}

fn read_scalar(kind: FieldKind, data: &[u8], pos: usize) -> Value {
    match kind {
        FieldKind::Int8 => Value::Int8(data[pos] as i8),
        FieldKind::UInt8 => Value::UInt8(data[pos]),
        FieldKind::Int16 => Value::Int16(i16::from_be_bytes([data[pos], data[pos + 1]])),
        FieldKind::UInt16 => Value::UInt16(u16::from_be_bytes([data[pos], data[pos + 1]])),
        FieldKind::Int32 => Value::Int32(i32::from_be_bytes([
            data[pos],
            data[pos + 1],
            data[pos + 2],
            data[pos + 3],
        ])),
        FieldKind::UInt32 => Value::UInt32(u32::from_be_bytes([
            data[pos],
            data[pos + 1],
            data[pos + 2],
            data[pos + 3],
        ])),
        // handled by the callers above
        FieldKind::Text | FieldKind::Bytes => unreachable!("scalar read of a width field"),
    }
}

fn write_scalar(
    kind: FieldKind,
    value: &Value,
    index: usize,
    out: &mut [u8],
) -> Result<(), PackError> {
    let mismatch = PackError::ValueKind {
        index,
        kind: kind.name(),
    };
    match kind {
        FieldKind::Int8 => out[0] = value.as_i8().ok_or(mismatch)? as u8,
        FieldKind::UInt8 => out[0] = value.as_u8().ok_or(mismatch)?,
        FieldKind::Int16 => out[..2].copy_from_slice(&value.as_i16().ok_or(mismatch)?.to_be_bytes()),
        FieldKind::UInt16 => {
            out[..2].copy_from_slice(&value.as_u16().ok_or(mismatch)?.to_be_bytes())
        }
        FieldKind::Int32 => out[..4].copy_from_slice(&value.as_i32().ok_or(mismatch)?.to_be_bytes()),
        FieldKind::UInt32 => {
            out[..4].copy_from_slice(&value.as_u32().ok_or(mismatch)?.to_be_bytes())
        }
        FieldKind::Text | FieldKind::Bytes => unreachable!("scalar write of a width field"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(format: &str, values: Vec<Value>) -> Vec<Value> {
        let data = pack(format, &values).expect("pack should succeed");
        unpack(format, &data).expect("unpack should succeed")
    }

    #[test]
    fn test_numeric_boundaries_roundtrip() {
        let values = vec![
            Value::Int8(i8::MIN),
            Value::Int8(i8::MAX),
            Value::UInt8(u8::MAX),
            Value::Int16(i16::MIN),
            Value::UInt16(u16::MAX),
            Value::Int32(i32::MIN),
            Value::UInt32(u32::MAX),
            Value::UInt32(0),
        ];
        assert_eq!(roundtrip("!2bBhHi2I", values.clone()), values);
    }

    #[test]
    fn test_network_byte_order() {
        let data = pack("!H", &[Value::UInt16(0x1234)]).unwrap();
        assert_eq!(data, [0x12, 0x34]);

        let data = pack("!I", &[Value::UInt32(0xDEADBEEF)]).unwrap();
        assert_eq!(data, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_long_aliases_are_four_bytes() {
        let values = vec![Value::Int32(-7), Value::UInt32(7)];
        let data = pack("!lL", &values).unwrap();
        assert_eq!(data.len(), 8);
        assert_eq!(unpack("!lL", &data).unwrap(), values);
    }

    #[test]
    fn test_text_zero_fill_trimmed() {
        let data = pack("!5s", &[Value::Text("ab".into())]).unwrap();
        assert_eq!(data, b"ab\0\0\0");
        let values = unpack("!5s", &data).unwrap();
        assert_eq!(values[0].as_text(), Some("ab"));
    }

    #[test]
    fn test_text_truncated_to_width() {
        let data = pack("!5s", &[Value::Text("abcdef".into())]).unwrap();
        let values = unpack("!5s", &data).unwrap();
        assert_eq!(values[0].as_text(), Some("abcde"));
    }

    #[test]
    fn test_zero_width_text_always_empty() {
        // the value is consumed but never written
        let data = pack("!0sB", &[Value::Text("ignored".into()), Value::UInt8(9)]).unwrap();
        assert_eq!(data, [9]);
        let values = unpack("!0sB", &data).unwrap();
        assert_eq!(values[0].as_text(), Some(""));
        assert_eq!(values[1].as_u8(), Some(9));
    }

    #[test]
    fn test_only_trailing_nuls_stripped() {
        let mut field = Vec::from(&b"a\0b"[..]);
        field.extend_from_slice(&[0, 0]);
        let values = unpack("!5s", &field).unwrap();
        assert_eq!(values[0].as_text(), Some("a\0b"));
    }

    #[test]
    fn test_raw_bytes_kept_verbatim() {
        let blob = vec![0xFF, 0x00, 0x80, 0x00];
        let data = pack("!4S", &[Value::Bytes(blob.clone())]).unwrap();
        assert_eq!(data, blob);
        let values = unpack("!4S", &data).unwrap();
        assert_eq!(values[0].as_bytes(), Some(blob.as_slice()));
    }

    #[test]
    fn test_sloppy_unpack_ignores_trailing_bytes() {
        let mut data = pack("!BH", &[Value::UInt8(1), Value::UInt16(2)]).unwrap();
        data.extend_from_slice(b"trailing payload");
        let values = unpack("!BH", &data).unwrap();
        assert_eq!(values, vec![Value::UInt8(1), Value::UInt16(2)]);
    }

    #[test]
    fn test_short_buffer_is_an_error() {
        let err = unpack("!II", &[0u8; 7]).unwrap_err();
        assert_eq!(
            err,
            PackError::InsufficientData {
                expected: 8,
                actual: 7
            }
        );
    }

    #[test]
    fn test_value_count_checked() {
        let err = pack("!2B", &[Value::UInt8(1)]).unwrap_err();
        assert_eq!(
            err,
            PackError::ValueCount {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_value_kind_checked() {
        let err = pack("!B", &[Value::Text("nope".into())]).unwrap_err();
        assert_eq!(err, PackError::ValueKind { index: 0, kind: "u8" });
    }

    #[test]
    fn test_empty_layout_rejected_on_pack() {
        assert_eq!(
            pack("!0s", &[Value::Text(String::new())]).unwrap_err(),
            PackError::EmptyFormat
        );
    }

    #[test]
    fn test_mixed_descriptor_roundtrip() {
        let values = vec![
            Value::Int8(-11),
            Value::Int32(-123),
            Value::UInt32(u32::MAX),
            Value::UInt8(244),
            Value::Int16(i16::MIN),
            Value::UInt16(u16::MAX),
            Value::Text("12345".into()),
            Value::Text("1234".into()),
            Value::Text(String::new()),
            Value::Text("a".into()),
        ];
        assert_eq!(roundtrip("!biIBhH5s5s0ss", values.clone()), values);
    }
}
