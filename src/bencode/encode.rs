use std::io::Write;

use bytes::Bytes;

use super::error::EncodeError;
use super::to_bencode::ToBencode;
use super::value::Value;

/// Encoder settings.
///
/// The default encoder writes dictionary entries in their stored order. With
/// [`Encoder::canonical`] enabled, entries are written sorted by raw key bytes
/// at every nesting level, which is what info-hash style consumers expect.
///
/// # Examples
///
/// ```
/// use bencodec::bencode::{Encoder, Value};
///
/// let dict = Value::dict([("zeta", Value::Integer(1)), ("alpha", Value::Integer(2))]);
///
/// let stored = Encoder::new().encode(&dict).unwrap();
/// assert_eq!(stored, b"d4:zetai1e5:alphai2ee");
///
/// let sorted = Encoder::new().canonical(true).encode(&dict).unwrap();
/// assert_eq!(sorted, b"d5:alphai2e4:zetai1ee");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Encoder {
    canonical: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort dictionary keys by raw bytes when writing.
    ///
    /// The sort is stable: duplicate keys keep their relative order.
    pub fn canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    pub fn is_canonical(&self) -> bool {
        self.canonical
    }

    /// Encodes a value to a byte vector.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::new();
        self.encode_to(value, &mut buf)?;
        Ok(buf)
    }

    /// Encodes a value into `writer`.
    pub fn encode_to<W: Write + ?Sized>(
        &self,
        value: &Value,
        writer: &mut W,
    ) -> Result<(), EncodeError> {
        match value {
            Value::Integer(i) => {
                write!(writer, "i{}e", i)?;
            }
            Value::Bytes(b) => encode_bytes(b, writer)?,
            Value::List(l) => {
                writer.write_all(b"l")?;
                for item in l {
                    self.encode_to(item, writer)?;
                }
                writer.write_all(b"e")?;
            }
            Value::Dict(d) => {
                writer.write_all(b"d")?;
                if self.canonical {
                    let mut sorted: Vec<&(Bytes, Value)> = d.iter().collect();
                    sorted.sort_by(|a, b| a.0.cmp(&b.0));
                    for (key, val) in sorted {
                        encode_bytes(key, writer)?;
                        self.encode_to(val, writer)?;
                    }
                } else {
                    for (key, val) in d {
                        encode_bytes(key, writer)?;
                        self.encode_to(val, writer)?;
                    }
                }
                writer.write_all(b"e")?;
            }
        }
        Ok(())
    }
}

fn encode_bytes<W: Write + ?Sized>(b: &[u8], writer: &mut W) -> Result<(), EncodeError> {
    write!(writer, "{}:", b.len())?;
    writer.write_all(b)?;
    Ok(())
}

/// Encodes a bencode value to a byte vector.
///
/// The output follows the bencode format:
/// - Integers: `i<number>e`
/// - Byte strings: `<length>:<data>`
/// - Lists: `l<items>e`
/// - Dictionaries: `d<key><value>...e` (keys in stored order)
///
/// # Errors
///
/// Returns an error if writing to the internal buffer fails.
///
/// # Examples
///
/// ```
/// use bencodec::bencode::{encode, Value};
///
/// assert_eq!(encode(&Value::Integer(42)).unwrap(), b"i42e");
/// assert_eq!(encode(&Value::string("hello")).unwrap(), b"5:hello");
///
/// let list = Value::List(vec![Value::Integer(1), Value::string("two")]);
/// assert_eq!(encode(&list).unwrap(), b"li1e3:twoe");
///
/// let dict = Value::dict([("b", Value::Integer(2)), ("a", Value::Integer(1))]);
/// assert_eq!(encode(&dict).unwrap(), b"d1:bi2e1:ai1ee");
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    Encoder::new().encode(value)
}

/// Encodes a bencode value into `writer`.
pub fn encode_to<W: Write + ?Sized>(value: &Value, writer: &mut W) -> Result<(), EncodeError> {
    Encoder::new().encode_to(value, writer)
}

/// Maps a native value onto [`Value`] and encodes it.
///
/// # Errors
///
/// Returns [`EncodeError::UnsupportedType`] if part of the value has no
/// bencode form, or [`EncodeError::InvalidKeyType`] if a map key is not a
/// byte string.
///
/// # Examples
///
/// ```
/// use bencodec::bencode::to_bytes;
///
/// let encoded = to_bytes(&vec![777i64, -42, 0]).unwrap();
/// assert_eq!(encoded, b"li777ei-42ei0ee");
/// ```
pub fn to_bytes<T: ToBencode + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    encode(&value.to_value()?)
}
