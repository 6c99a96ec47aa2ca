//! The structured value carried by the codec.
//!
//! [`Value`] is the closed set of shapes the wire format can express. Maps
//! are keyed by strings and stored in a [`BTreeMap`], so iteration order is
//! the key order and two logically equal maps always encode to the same
//! bytes, no matter how they were assembled.

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::error::CodecError;
use crate::config::{MAX_WIRE_INTEGER, MIN_WIRE_INTEGER};

/// A self-describing structured value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Nil,
    Bool(bool),
    /// Arbitrary-width integer. Only `[-2^63, 2^64 - 1]` survives encoding.
    Integer(BigInt),
    /// Finite IEEE-754 double. Non-finite values are rejected by the codec.
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Builds a map value from `(key, value)` pairs. Later duplicates win.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Self::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up `key` when `self` is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "<{}>", self.type_name()),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions into Value
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Self::Integer(BigInt::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Binary(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Self::Map(m)
    }
}

/// Key of the single-entry JSON object that stands for a [`Value::Binary`].
pub const JSON_BINARY_KEY: &str = "$bin";

/// Converts JSON into a value without losing information.
///
/// Integral numbers become [`Value::Integer`] at full precision and must fit
/// the wire range; numbers with a fraction or exponent become
/// [`Value::Float`]. JSON has no binary type, so `{"$bin": "<hex>"}` is read
/// as [`Value::Binary`]. This is the same form [`Value`]'s `Serialize`
/// produces, so JSON output converts back to the value it came from.
impl TryFrom<serde_json::Value> for Value {
    type Error = CodecError;

    fn try_from(json: serde_json::Value) -> Result<Self, CodecError> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(Self::Nil),
            Json::Bool(b) => Ok(Self::Bool(b)),
            Json::Number(n) => number(&n),
            Json::String(s) => Ok(Self::String(s)),
            Json::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array),
            Json::Object(obj) => {
                if let Some(bytes) = binary_object(&obj) {
                    return bytes.map(Self::Binary);
                }
                obj.into_iter()
                    .map(|(k, v)| Ok((k, Self::try_from(v)?)))
                    .collect::<Result<BTreeMap<_, _>, CodecError>>()
                    .map(Self::Map)
            }
        }
    }
}

fn number(n: &serde_json::Number) -> Result<Value, CodecError> {
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }

    // serde_json keeps the literal text, so wide integers are not rounded.
    let text = n.to_string();
    if !text.contains(['.', 'e', 'E']) {
        let wide: BigInt = text
            .parse()
            .map_err(|_| CodecError::malformed(format!("invalid JSON number {}", text)))?;
        return Err(CodecError::unsupported(format!(
            "integer {} outside [{}, {}]",
            wide, MIN_WIRE_INTEGER, MAX_WIRE_INTEGER
        )));
    }

    n.as_f64()
        .map(Value::Float)
        .ok_or_else(|| CodecError::unsupported(format!("non-finite float {}", text)))
}

/// `Some` when `obj` is exactly `{"$bin": "<string>"}`.
fn binary_object(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> Option<Result<Vec<u8>, CodecError>> {
    if obj.len() != 1 {
        return None;
    }
    let hex_text = obj.get(JSON_BINARY_KEY)?.as_str()?;
    Some(
        hex::decode(hex_text)
            .map_err(|e| CodecError::malformed(format!("invalid {} hex: {}", JSON_BINARY_KEY, e))),
    )
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

/// Human-oriented serialization: binaries are rendered as
/// `{"$bin": "<lowercase hex>"}` and integers wider than 64 bits as decimal
/// strings.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Nil => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => {
                if let Some(v) = i.to_i64() {
                    serializer.serialize_i64(v)
                } else if let Some(v) = i.to_u64() {
                    serializer.serialize_u64(v)
                } else {
                    serializer.serialize_str(&i.to_string())
                }
            }
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Binary(b) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(JSON_BINARY_KEY, &hex::encode(b))?;
                map.end()
            }
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_helper_orders_keys() {
        let v = Value::map([("b", Value::from(2u8)), ("a", Value::from(1u8))]);
        let keys: Vec<_> = v.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn from_json_maps_numbers_by_kind() {
        let v = Value::try_from(json!({"n": -5, "u": 18446744073709551615u64, "f": 1.5})).unwrap();
        assert_eq!(v.get("n"), Some(&Value::from(-5i64)));
        assert_eq!(v.get("u"), Some(&Value::from(u64::MAX)));
        assert_eq!(v.get("f"), Some(&Value::Float(1.5)));
    }

    #[test]
    fn from_json_nested() {
        let v = Value::try_from(json!({"a": [null, true, "x"]})).unwrap();
        assert_eq!(
            v,
            Value::map([(
                "a",
                Value::Array(vec![Value::Nil, Value::Bool(true), Value::from("x")])
            )])
        );
    }

    #[test]
    fn from_json_rejects_integers_outside_wire_range() {
        for text in [r#"{"t": 18446744073709551616}"#, "[-9223372036854775809]"] {
            let json: serde_json::Value = serde_json::from_str(text).unwrap();
            let err = Value::try_from(json).unwrap_err();
            assert!(
                matches!(err, CodecError::UnsupportedValueType { .. }),
                "{} gave {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn from_json_keeps_exponent_numbers_as_floats() {
        let json: serde_json::Value = serde_json::from_str("[1e3, 2.0]").unwrap();
        assert_eq!(
            Value::try_from(json).unwrap(),
            Value::Array(vec![Value::Float(1000.0), Value::Float(2.0)])
        );
    }

    #[test]
    fn from_json_reads_tagged_binary() {
        let v = Value::try_from(json!({"pk": {"$bin": "DEad"}})).unwrap();
        assert_eq!(v.get("pk"), Some(&Value::Binary(vec![0xde, 0xad])));

        let err = Value::try_from(json!({"$bin": "abc"})).unwrap_err();
        assert!(err.is_malformed());

        // Extra keys or a non-string payload make it an ordinary map.
        let v = Value::try_from(json!({"$bin": 1})).unwrap();
        assert_eq!(v, Value::map([("$bin", 1u8)]));
    }

    #[test]
    fn serialize_renders_binary_as_tagged_hex() {
        let v = Value::map([("pk", Value::Binary(vec![0xde, 0xad]))]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"pk":{"$bin":"dead"}}"#);
    }

    #[test]
    fn json_rendering_converts_back() {
        let v = Value::map([
            ("b", Value::Binary(vec![1, 2])),
            ("s", Value::from("0102")),
            ("i", Value::from(u64::MAX)),
            ("f", Value::Float(-0.25)),
        ]);
        let json: serde_json::Value = serde_json::from_str(&v.to_string()).unwrap();
        assert_eq!(Value::try_from(json).unwrap(), v);
    }

    #[test]
    fn serialize_wide_integer_as_string() {
        let wide: BigInt = BigInt::from(u64::MAX) * 4;
        let v = Value::Integer(wide.clone());
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            format!("\"{}\"", wide)
        );
    }

    #[test]
    fn accessors_reject_other_variants() {
        let v = Value::from("text");
        assert_eq!(v.as_str(), Some("text"));
        assert!(v.as_bytes().is_none());
        assert!(v.as_integer().is_none());
        assert_eq!(v.type_name(), "string");
    }

    #[test]
    fn display_is_json() {
        let v = Value::map([("a", 1u8)]);
        assert_eq!(v.to_string(), r#"{"a":1}"#);
    }
}
