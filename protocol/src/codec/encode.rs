//! Canonical encoder.
//!
//! Every value has exactly one byte representation: integers take the
//! narrowest marker that fits (non-negative values always use the unsigned
//! family), floats are always written as float64, and length headers use the
//! shortest form. Map entries come out in key order because [`Value::Map`]
//! is a `BTreeMap`.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::error::CodecError;
use super::marker;
use super::value::Value;
use crate::config::{MAX_NESTING_DEPTH, MAX_WIRE_INTEGER, MIN_WIRE_INTEGER};

/// Append-only byte sink for one encoding pass.
pub(crate) struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub(crate) fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Writes `value`. `depth` is the number of containers already open.
    pub(crate) fn write_value(&mut self, value: &Value, depth: usize) -> Result<(), CodecError> {
        match value {
            Value::Nil => self.buf.push(marker::NIL),
            Value::Bool(false) => self.buf.push(marker::FALSE),
            Value::Bool(true) => self.buf.push(marker::TRUE),
            Value::Integer(n) => self.write_integer(n)?,
            Value::Float(f) => self.write_float(*f)?,
            Value::String(s) => self.write_str(s)?,
            Value::Binary(b) => self.write_bin(b)?,
            Value::Array(items) => {
                check_depth(depth)?;
                self.write_collection_header(
                    items.len(),
                    marker::FIXARRAY,
                    marker::ARRAY16,
                    marker::ARRAY32,
                )?;
                for item in items {
                    self.write_value(item, depth + 1)?;
                }
            }
            Value::Map(entries) => {
                check_depth(depth)?;
                self.write_collection_header(
                    entries.len(),
                    marker::FIXMAP,
                    marker::MAP16,
                    marker::MAP32,
                )?;
                for (key, item) in entries {
                    self.write_str(key)?;
                    self.write_value(item, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn write_integer(&mut self, n: &BigInt) -> Result<(), CodecError> {
        if let Some(u) = n.to_u64() {
            self.write_unsigned(u);
            Ok(())
        } else if let Some(i) = n.to_i64() {
            self.write_negative(i);
            Ok(())
        } else {
            Err(CodecError::unsupported(format!(
                "integer {} outside wire range [{}, {}]",
                n, MIN_WIRE_INTEGER, MAX_WIRE_INTEGER
            )))
        }
    }

    fn write_unsigned(&mut self, u: u64) {
        if u <= u64::from(marker::POSITIVE_FIXINT_MAX) {
            self.buf.push(u as u8);
        } else if u <= u64::from(u8::MAX) {
            self.buf.push(marker::UINT8);
            self.buf.push(u as u8);
        } else if u <= u64::from(u16::MAX) {
            self.buf.push(marker::UINT16);
            self.buf.extend_from_slice(&(u as u16).to_be_bytes());
        } else if u <= u64::from(u32::MAX) {
            self.buf.push(marker::UINT32);
            self.buf.extend_from_slice(&(u as u32).to_be_bytes());
        } else {
            self.buf.push(marker::UINT64);
            self.buf.extend_from_slice(&u.to_be_bytes());
        }
    }

    /// Only called with `i < 0`; non-negative values go through
    /// [`Self::write_unsigned`].
    fn write_negative(&mut self, i: i64) {
        if i >= marker::NEGATIVE_FIXINT_FLOOR {
            self.buf.push(i as i8 as u8);
        } else if i >= i64::from(i8::MIN) {
            self.buf.push(marker::INT8);
            self.buf.push(i as i8 as u8);
        } else if i >= i64::from(i16::MIN) {
            self.buf.push(marker::INT16);
            self.buf.extend_from_slice(&(i as i16).to_be_bytes());
        } else if i >= i64::from(i32::MIN) {
            self.buf.push(marker::INT32);
            self.buf.extend_from_slice(&(i as i32).to_be_bytes());
        } else {
            self.buf.push(marker::INT64);
            self.buf.extend_from_slice(&i.to_be_bytes());
        }
    }

    fn write_float(&mut self, f: f64) -> Result<(), CodecError> {
        if !f.is_finite() {
            return Err(CodecError::unsupported(format!(
                "non-finite float {}",
                f
            )));
        }
        self.buf.push(marker::FLOAT64);
        self.buf.extend_from_slice(&f.to_be_bytes());
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), CodecError> {
        let len = s.len();
        if len <= marker::FIXSTR_MAX_LEN {
            self.buf.push(marker::FIXSTR | len as u8);
        } else {
            self.write_sized_header(len, marker::STR8, marker::STR16, marker::STR32, "string")?;
        }
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn write_bin(&mut self, b: &[u8]) -> Result<(), CodecError> {
        self.write_sized_header(b.len(), marker::BIN8, marker::BIN16, marker::BIN32, "binary")?;
        self.buf.extend_from_slice(b);
        Ok(())
    }

    fn write_collection_header(
        &mut self,
        len: usize,
        fix: u8,
        m16: u8,
        m32: u8,
    ) -> Result<(), CodecError> {
        if len <= marker::FIX_COLLECTION_MAX_LEN {
            self.buf.push(fix | len as u8);
            return Ok(());
        }
        if len <= usize::from(u16::MAX) {
            self.buf.push(m16);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            let len = u32::try_from(len)
                .map_err(|_| CodecError::unsupported(format!("collection of {} elements", len)))?;
            self.buf.push(m32);
            self.buf.extend_from_slice(&len.to_be_bytes());
        }
        Ok(())
    }

    fn write_sized_header(
        &mut self,
        len: usize,
        m8: u8,
        m16: u8,
        m32: u8,
        what: &str,
    ) -> Result<(), CodecError> {
        if len <= usize::from(u8::MAX) {
            self.buf.push(m8);
            self.buf.push(len as u8);
        } else if len <= usize::from(u16::MAX) {
            self.buf.push(m16);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            let len = u32::try_from(len)
                .map_err(|_| CodecError::unsupported(format!("{} of {} bytes", what, len)))?;
            self.buf.push(m32);
            self.buf.extend_from_slice(&len.to_be_bytes());
        }
        Ok(())
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

    fn bytes_of(value: impl Into<Value>) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_value(&value.into(), 0).unwrap();
        enc.into_bytes()
    }

    #[test]
    fn unsigned_boundaries_use_narrowest_marker() {
        assert_eq!(bytes_of(0u8), vec![0x00]);
        assert_eq!(bytes_of(127u8), vec![0x7f]);
        assert_eq!(bytes_of(128u8), vec![0xcc, 0x80]);
        assert_eq!(bytes_of(256u16), vec![0xcd, 0x01, 0x00]);
        assert_eq!(bytes_of(65_536u32), vec![0xce, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(
            bytes_of(u64::MAX),
            vec![0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn negative_boundaries_use_narrowest_marker() {
        assert_eq!(bytes_of(-1i8), vec![0xff]);
        assert_eq!(bytes_of(-32i8), vec![0xe0]);
        assert_eq!(bytes_of(-33i8), vec![0xd0, 0xdf]);
        assert_eq!(bytes_of(-129i16), vec![0xd1, 0xff, 0x7f]);
        assert_eq!(bytes_of(i64::MIN)[0], 0xd3);
    }

    #[test]
    fn integer_outside_wire_range_is_rejected() {
        let too_big = BigInt::from(u64::MAX) + 1;
        let mut enc = Encoder::new();
        let err = enc.write_value(&Value::Integer(too_big), 0).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValueType { .. }));

        let too_small = BigInt::from(i64::MIN) - 1;
        let err = enc.write_value(&Value::Integer(too_small), 0).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValueType { .. }));
    }

    #[test]
    fn floats_are_float64() {
        assert_eq!(
            bytes_of(1.5f64),
            vec![0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut enc = Encoder::new();
            assert!(enc.write_value(&Value::Float(f), 0).is_err());
        }
    }

    #[test]
    fn string_headers() {
        assert_eq!(bytes_of(""), vec![0xa0]);
        assert_eq!(bytes_of("x"), vec![0xa1, b'x']);
        let s32 = "a".repeat(32);
        assert_eq!(&bytes_of(s32.as_str())[..2], &[0xd9, 32]);
        let s256 = "a".repeat(256);
        assert_eq!(&bytes_of(s256.as_str())[..3], &[0xda, 0x01, 0x00]);
    }

    #[test]
    fn binary_always_has_explicit_header() {
        assert_eq!(bytes_of(Vec::<u8>::new()), vec![0xc4, 0x00]);
        assert_eq!(bytes_of(vec![1u8, 2]), vec![0xc4, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn collection_headers() {
        assert_eq!(bytes_of(Vec::<Value>::new()), vec![0x90]);
        let sixteen: Vec<Value> = (0..16u8).map(Value::from).collect();
        assert_eq!(&bytes_of(sixteen)[..3], &[0xdc, 0x00, 0x10]);
        assert_eq!(bytes_of(Value::map(Vec::<(String, Value)>::new())), vec![0x80]);
    }

    #[test]
    fn map_keys_emitted_in_order() {
        let v = Value::map([("b", 2u8), ("a", 1u8)]);
        assert_eq!(bytes_of(v), vec![0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0x02]);
    }

    #[test]
    fn nesting_limit() {
        let mut v = Value::Nil;
        for _ in 0..MAX_NESTING_DEPTH {
            v = Value::Array(vec![v]);
        }
        let mut enc = Encoder::new();
        assert!(enc.write_value(&v, 0).is_ok());

        let v = Value::Array(vec![v]);
        let mut enc = Encoder::new();
        let err = enc.write_value(&v, 0).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValueType { .. }));
    }
}
