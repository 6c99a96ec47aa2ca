//! Strict decoder.
//!
//! Accepts every marker family [`Value`] can represent, including the
//! non-canonical ones other encoders emit (float32, oversized headers,
//! signed markers for non-negative integers). Rejects truncation, the
//! reserved `0xc1` marker, invalid UTF-8, duplicate map keys and trailing
//! bytes as malformed; extension types and non-string map keys as
//! unsupported.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use num_bigint::BigInt;

use super::error::CodecError;
use super::marker;
use super::value::Value;
use crate::config::MAX_NESTING_DEPTH;

/// Cursor over an encoded byte slice.
pub(crate) struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Decodes exactly one value spanning the whole input.
    pub(crate) fn read_document(mut self) -> Result<Value, CodecError> {
        if self.input.is_empty() {
            return Err(CodecError::malformed("empty input"));
        }
        let value = self.read_value(0)?;
        if self.remaining() != 0 {
            return Err(CodecError::malformed(format!(
                "{} trailing bytes after value at offset {}",
                self.remaining(),
                self.pos
            )));
        }
        Ok(value)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return Err(CodecError::malformed(format!(
                "need {} bytes at offset {}, only {} left",
                len,
                self.pos,
                self.remaining()
            )));
        }
        let input = self.input;
        let slice = &input[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_fixed::<1>()?[0])
    }

    fn read_u16(&mut self) -> Result<usize, CodecError> {
        Ok(usize::from(u16::from_be_bytes(self.read_fixed()?)))
    }

    fn read_u32(&mut self) -> Result<usize, CodecError> {
        Ok(u32::from_be_bytes(self.read_fixed()?) as usize)
    }

    /// Reads one value. `depth` is the number of containers already open.
    fn read_value(&mut self, depth: usize) -> Result<Value, CodecError> {
        let offset = self.pos;
        let m = self.read_u8()?;
        let value = match m {
            0x00..=marker::POSITIVE_FIXINT_MAX => Value::from(m),
            marker::FIXMAP..=marker::FIXMAP_MAX => self.read_map(usize::from(m & 0x0f), depth)?,
            marker::FIXARRAY..=marker::FIXARRAY_MAX => {
                self.read_array(usize::from(m & 0x0f), depth)?
            }
            marker::FIXSTR..=marker::FIXSTR_MAX => self.read_str(usize::from(m & 0x1f))?,

            marker::NIL => Value::Nil,
            marker::NEVER_USED => {
                return Err(CodecError::malformed(format!(
                    "reserved marker 0xc1 at offset {}",
                    offset
                )))
            }
            marker::FALSE => Value::Bool(false),
            marker::TRUE => Value::Bool(true),

            marker::BIN8 => {
                let len = usize::from(self.read_u8()?);
                Value::Binary(self.take(len)?.to_vec())
            }
            marker::BIN16 => {
                let len = self.read_u16()?;
                Value::Binary(self.take(len)?.to_vec())
            }
            marker::BIN32 => {
                let len = self.read_u32()?;
                Value::Binary(self.take(len)?.to_vec())
            }

            marker::EXT8 | marker::EXT16 | marker::EXT32 | marker::FIXEXT1..=marker::FIXEXT16 => {
                return Err(CodecError::unsupported(format!(
                    "extension type (marker {:#04x}) at offset {}",
                    m, offset
                )))
            }

            marker::FLOAT32 => finite(f64::from(f32::from_be_bytes(self.read_fixed()?)), offset)?,
            marker::FLOAT64 => finite(f64::from_be_bytes(self.read_fixed()?), offset)?,

            marker::UINT8 => Value::from(self.read_u8()?),
            marker::UINT16 => Value::from(u16::from_be_bytes(self.read_fixed()?)),
            marker::UINT32 => Value::from(u32::from_be_bytes(self.read_fixed()?)),
            marker::UINT64 => Value::from(u64::from_be_bytes(self.read_fixed()?)),

            marker::INT8 => Value::from(i8::from_be_bytes(self.read_fixed()?)),
            marker::INT16 => Value::from(i16::from_be_bytes(self.read_fixed()?)),
            marker::INT32 => Value::from(i32::from_be_bytes(self.read_fixed()?)),
            marker::INT64 => Value::from(i64::from_be_bytes(self.read_fixed()?)),

            marker::STR8 => {
                let len = usize::from(self.read_u8()?);
                self.read_str(len)?
            }
            marker::STR16 => {
                let len = self.read_u16()?;
                self.read_str(len)?
            }
            marker::STR32 => {
                let len = self.read_u32()?;
                self.read_str(len)?
            }

            marker::ARRAY16 => {
                let len = self.read_u16()?;
                self.read_array(len, depth)?
            }
            marker::ARRAY32 => {
                let len = self.read_u32()?;
                self.read_array(len, depth)?
            }

            marker::MAP16 => {
                let len = self.read_u16()?;
                self.read_map(len, depth)?
            }
            marker::MAP32 => {
                let len = self.read_u32()?;
                self.read_map(len, depth)?
            }

            marker::NEGATIVE_FIXINT_MIN..=0xff => Value::Integer(BigInt::from(m as i8)),
        };
        Ok(value)
    }

    fn read_str(&mut self, len: usize) -> Result<Value, CodecError> {
        let offset = self.pos;
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes).map_err(|e| {
            CodecError::malformed(format!("invalid UTF-8 in string at offset {}: {}", offset, e))
        })?;
        Ok(Value::String(s.to_string()))
    }

    fn read_array(&mut self, len: usize, depth: usize) -> Result<Value, CodecError> {
        check_depth(depth)?;
        // Every element occupies at least one byte.
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(self.read_value(depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(&mut self, len: usize, depth: usize) -> Result<Value, CodecError> {
        check_depth(depth)?;
        let mut entries = BTreeMap::new();
        for _ in 0..len {
            let key_offset = self.pos;
            let key = match self.read_value(depth + 1)? {
                Value::String(s) => s,
                other => {
                    return Err(CodecError::unsupported(format!(
                        "{} map key at offset {}",
                        other.type_name(),
                        key_offset
                    )))
                }
            };
            let item = self.read_value(depth + 1)?;
            match entries.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(item);
                }
                Entry::Occupied(slot) => {
                    return Err(CodecError::malformed(format!(
                        "duplicate map key {:?} at offset {}",
                        slot.key(),
                        key_offset
                    )))
                }
            }
        }
        Ok(Value::Map(entries))
    }
}

fn finite(f: f64, offset: usize) -> Result<Value, CodecError> {
    if f.is_finite() {
        Ok(Value::Float(f))
    } else {
        Err(CodecError::unsupported(format!(
            "non-finite float at offset {}",
            offset
        )))
    }
}

fn check_depth(depth: usize) -> Result<(), CodecError> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(CodecError::unsupported(format!(
            "nesting deeper than {} levels",
            MAX_NESTING_DEPTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(bytes: &[u8]) -> Result<Value, CodecError> {
        Decoder::new(bytes).read_document()
    }

    #[test]
    fn scalars() {
        assert_eq!(read(&[0xc0]).unwrap(), Value::Nil);
        assert_eq!(read(&[0xc3]).unwrap(), Value::Bool(true));
        assert_eq!(read(&[0x05]).unwrap(), Value::from(5u8));
        assert_eq!(read(&[0xff]).unwrap(), Value::from(-1i8));
        assert_eq!(read(&[0xd0, 0x80]).unwrap(), Value::from(-128i16));
        assert_eq!(
            read(&[0xcf, 0, 0, 0, 0, 0, 0, 0x01, 0x00]).unwrap(),
            Value::from(256u16)
        );
    }

    #[test]
    fn non_canonical_forms_are_accepted() {
        // int8 carrying a small positive number.
        assert_eq!(read(&[0xd0, 0x05]).unwrap(), Value::from(5u8));
        // str8 carrying a short string.
        assert_eq!(read(&[0xd9, 0x01, b'x']).unwrap(), Value::from("x"));
        // float32 widened to f64.
        assert_eq!(
            read(&[0xca, 0x3f, 0xc0, 0x00, 0x00]).unwrap(),
            Value::Float(1.5)
        );
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(read(&[]).unwrap_err().is_malformed());
    }

    #[test]
    fn truncated_input_is_malformed() {
        assert!(read(&[0xcd, 0x01]).unwrap_err().is_malformed());
        assert!(read(&[0xa3, b'a']).unwrap_err().is_malformed());
        assert!(read(&[0x92, 0x01]).unwrap_err().is_malformed());
        assert!(read(&[0xc4, 0x04, 0x00]).unwrap_err().is_malformed());
    }

    #[test]
    fn reserved_marker_is_malformed() {
        assert!(read(&[0xc1]).unwrap_err().is_malformed());
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let err = read(&[0x01, 0x02]).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        assert!(read(&[0xa2, 0xc3, 0x28]).unwrap_err().is_malformed());
    }

    #[test]
    fn duplicate_keys_are_malformed() {
        let bytes = [0x82, 0xa1, b'a', 0x01, 0xa1, b'a', 0x02];
        assert!(read(&bytes).unwrap_err().is_malformed());
    }

    #[test]
    fn non_string_keys_are_unsupported() {
        let err = read(&[0x81, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValueType { .. }));
    }

    #[test]
    fn extension_types_are_unsupported() {
        let err = read(&[0xd4, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValueType { .. }));
    }

    #[test]
    fn nan_is_unsupported() {
        let mut bytes = vec![0xcb];
        bytes.extend_from_slice(&f64::NAN.to_be_bytes());
        let err = read(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValueType { .. }));
    }

    #[test]
    fn huge_declared_length_does_not_preallocate() {
        // array32 claiming u32::MAX elements with nothing behind it.
        let err = read(&[0xdd, 0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let bytes = vec![0x91; MAX_NESTING_DEPTH + 1];
        let err = read(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValueType { .. }));
    }
}
