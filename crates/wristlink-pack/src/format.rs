//! Format descriptor parsing.
//!
//! A descriptor is a compact text grammar describing an ordered sequence of
//! wire fields. The leading `!` selects network (big-endian) byte order for
//! all multi-byte integers and is required. Each following element is an
//! optional decimal count and a field character:
//!
//! | Character | Field                                   |
//! |-----------|-----------------------------------------|
//! | `b` / `B` | signed / unsigned 8-bit integer         |
//! | `h` / `H` | signed / unsigned 16-bit integer        |
//! | `i` / `I` | signed / unsigned 32-bit integer        |
//! | `l` / `L` | signed / unsigned 32-bit integer        |
//! | `s`       | fixed-width UTF-8 text                  |
//! | `S`       | fixed-width raw bytes                   |
//!
//! For numeric kinds the count is a repeat (`2H` is two u16 fields). For
//! `s`/`S` it is the field width in bytes, defaulting to 1; `0s` always
//! decodes to an empty string and consumes no buffer bytes.

use crate::error::PackError;

/// The kind of a single descriptor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed 8-bit integer (`b`).
    Int8,
    /// Unsigned 8-bit integer (`B`).
    UInt8,
    /// Signed 16-bit integer (`h`).
    Int16,
    /// Unsigned 16-bit integer (`H`).
    UInt16,
    /// Signed 32-bit integer (`i` or `l`).
    Int32,
    /// Unsigned 32-bit integer (`I` or `L`).
    UInt32,
    /// Fixed-width UTF-8 text (`s`).
    Text,
    /// Fixed-width raw bytes (`S`).
    Bytes,
}

impl FieldKind {
    /// Width in bytes of one scalar of this kind. Text and byte fields carry
    /// their width in the [`FieldSpec`] count instead.
    pub fn scalar_width(self) -> usize {
        match self {
            FieldKind::Int8 | FieldKind::UInt8 => 1,
            FieldKind::Int16 | FieldKind::UInt16 => 2,
            FieldKind::Int32 | FieldKind::UInt32 => 4,
            FieldKind::Text | FieldKind::Bytes => 1,
        }
    }

    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Int8 => "i8",
            FieldKind::UInt8 => "u8",
            FieldKind::Int16 => "i16",
            FieldKind::UInt16 => "u16",
            FieldKind::Int32 => "i32",
            FieldKind::UInt32 => "u32",
            FieldKind::Text => "text",
            FieldKind::Bytes => "bytes",
        }
    }
}

/// One parsed descriptor element.
///
/// For numeric kinds `count` is the repeat count (each repeat is one value
/// slot). For `Text`/`Bytes` it is the field width in bytes (one value slot
/// regardless of width).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field kind.
    pub kind: FieldKind,
    /// Repeat count or width, depending on kind.
    pub count: usize,
}

impl FieldSpec {
    /// Number of buffer bytes this element covers.
    pub fn byte_len(&self) -> usize {
        match self.kind {
            FieldKind::Text | FieldKind::Bytes => self.count,
            kind => self.count * kind.scalar_width(),
        }
    }

    /// Number of value slots this element produces or consumes.
    pub fn value_slots(&self) -> usize {
        match self.kind {
            FieldKind::Text | FieldKind::Bytes => 1,
            _ => self.count,
        }
    }
}

/// Parse a format descriptor into its ordered field specs.
pub fn parse_format(format: &str) -> Result<Vec<FieldSpec>, PackError> {
    let bytes = format.as_bytes();
    if bytes.first() != Some(&b'!') {
        return Err(PackError::MissingByteOrder);
    }

    let mut specs = Vec::new();
    let mut i = 1;
    while i < bytes.len() {
        let start = i;
        let mut count: Option<usize> = None;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            count = Some(count.unwrap_or(0) * 10 + usize::from(bytes[i] - b'0'));
            i += 1;
        }
        if i == bytes.len() {
            return Err(PackError::DanglingCount { pos: start });
        }

        let ch = bytes[i] as char;
        let kind = match ch {
            'b' => FieldKind::Int8,
            'B' => FieldKind::UInt8,
            'h' => FieldKind::Int16,
            'H' => FieldKind::UInt16,
            'i' | 'l' => FieldKind::Int32,
            'I' | 'L' => FieldKind::UInt32,
            's' => FieldKind::Text,
            'S' => FieldKind::Bytes,
            _ => return Err(PackError::UnknownFormat { ch, pos: i }),
        };
        specs.push(FieldSpec {
            kind,
            count: count.unwrap_or(1),
        });
        i += 1;
    }

    Ok(specs)
}

/// Compute the number of bytes a descriptor encodes to.
pub fn packed_size(format: &str) -> Result<usize, PackError> {
    Ok(parse_format(format)?.iter().map(FieldSpec::byte_len).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_size_mixed() {
        // header byte + two u32 fields
        assert_eq!(packed_size("!BII").unwrap(), 9);
        // the app record layout
        assert_eq!(packed_size("!II32s32sIH").unwrap(), 78);
        // repeats multiply numeric widths
        assert_eq!(packed_size("!2BH3I").unwrap(), 16);
    }

    #[test]
    fn test_packed_size_is_additive() {
        let d1 = "BI4s";
        let d2 = "2hS";
        let combined = format!("!{}{}", d1, d2);
        let lhs = packed_size(&combined).unwrap();
        let rhs = packed_size(&format!("!{}", d1)).unwrap() + packed_size(&format!("!{}", d2)).unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_string_widths() {
        assert_eq!(packed_size("!5s").unwrap(), 5);
        assert_eq!(packed_size("!0s").unwrap(), 0);
        // width defaults to 1 when no count is given
        assert_eq!(packed_size("!s").unwrap(), 1);
        assert_eq!(packed_size("!16S").unwrap(), 16);
    }

    #[test]
    fn test_unknown_character_rejected() {
        let err = packed_size("!Bx").unwrap_err();
        assert_eq!(err, PackError::UnknownFormat { ch: 'x', pos: 2 });
    }

    #[test]
    fn test_missing_order_marker_rejected() {
        assert_eq!(packed_size("BII").unwrap_err(), PackError::MissingByteOrder);
        assert_eq!(packed_size("").unwrap_err(), PackError::MissingByteOrder);
    }

    #[test]
    fn test_dangling_count_rejected() {
        assert_eq!(
            packed_size("!B12").unwrap_err(),
            PackError::DanglingCount { pos: 2 }
        );
    }
}
