//! Mapping of native Rust values onto [`Value`].

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;

use super::error::EncodeError;
use super::value::Value;

/// A type that can be represented as a bencode [`Value`].
///
/// Integers, strings, byte buffers, sequences and maps implement this out of
/// the box. Types with no bencode form (floating point numbers, `bool`, `()`
/// and `None`) implement it too, and fail at encode time with
/// [`EncodeError::UnsupportedType`], so they can still sit inside generic
/// containers.
///
/// # Examples
///
/// ```
/// use bencodec::bencode::{ToBencode, Value, EncodeError};
///
/// struct Peer {
///     ip: String,
///     port: u16,
/// }
///
/// impl ToBencode for Peer {
///     fn to_value(&self) -> Result<Value, EncodeError> {
///         Ok(Value::dict([
///             ("ip", self.ip.to_value()?),
///             ("port", self.port.to_value()?),
///         ]))
///     }
/// }
///
/// let peer = Peer { ip: "10.0.0.1".into(), port: 6881 };
/// let encoded = bencodec::bencode::to_bytes(&peer).unwrap();
/// assert_eq!(encoded, b"d2:ip8:10.0.0.14:porti6881ee");
/// ```
pub trait ToBencode {
    fn to_value(&self) -> Result<Value, EncodeError>;
}

impl ToBencode for Value {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(self.clone())
    }
}

impl<T: ToBencode + ?Sized> ToBencode for &T {
    fn to_value(&self) -> Result<Value, EncodeError> {
        (**self).to_value()
    }
}

impl<T: ToBencode + ?Sized> ToBencode for Box<T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        (**self).to_value()
    }
}

macro_rules! impl_lossless_int {
    ($($t:ty),*) => {
        $(
            impl ToBencode for $t {
                fn to_value(&self) -> Result<Value, EncodeError> {
                    Ok(Value::Integer(i64::from(*self)))
                }
            }
        )*
    };
}

impl_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_wide_int {
    ($($t:ty),*) => {
        $(
            impl ToBencode for $t {
                fn to_value(&self) -> Result<Value, EncodeError> {
                    i64::try_from(*self)
                        .map(Value::Integer)
                        .map_err(|_| EncodeError::UnsupportedType(concat!(stringify!($t), " outside i64 range")))
                }
            }
        )*
    };
}

impl_wide_int!(u64, usize, isize, i128, u128);

macro_rules! impl_unsupported {
    ($($t:ty => $name:literal),*) => {
        $(
            impl ToBencode for $t {
                fn to_value(&self) -> Result<Value, EncodeError> {
                    Err(EncodeError::UnsupportedType($name))
                }
            }
        )*
    };
}

impl_unsupported!(f32 => "f32", f64 => "f64", bool => "bool", () => "()");

impl ToBencode for str {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::string(self))
    }
}

impl ToBencode for String {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::string(self))
    }
}

impl ToBencode for char {
    fn to_value(&self) -> Result<Value, EncodeError> {
        let mut buf = [0u8; 4];
        Ok(Value::string(self.encode_utf8(&mut buf)))
    }
}

impl ToBencode for Bytes {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Bytes(self.clone()))
    }
}

impl<T: ToBencode> ToBencode for Option<T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        match self {
            Some(v) => v.to_value(),
            None => Err(EncodeError::UnsupportedType("None")),
        }
    }
}

impl<T: ToBencode> ToBencode for [T] {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.iter()
            .map(ToBencode::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }
}

impl<T: ToBencode> ToBencode for Vec<T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.as_slice().to_value()
    }
}

impl<T: ToBencode, const N: usize> ToBencode for [T; N] {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.as_slice().to_value()
    }
}

impl<K: ToBencode, V: ToBencode> ToBencode for BTreeMap<K, V> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        dict_from_entries(self.iter())
    }
}

/// Entries are written in the map's iteration order, which is unspecified.
/// Use [`Encoder::canonical`](super::Encoder::canonical) for stable output.
impl<K: ToBencode, V: ToBencode, S> ToBencode for HashMap<K, V, S> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        dict_from_entries(self.iter())
    }
}

/// Wraps `(key, value)` pairs so they encode as a dictionary instead of a
/// list of two-element lists.
///
/// # Examples
///
/// ```
/// use bencodec::bencode::{to_bytes, Entries};
///
/// let entries = Entries(vec![("key2", 42i64), ("key1", 7)]);
/// assert_eq!(to_bytes(&entries).unwrap(), b"d4:key2i42e4:key1i7ee");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entries<K, V>(pub Vec<(K, V)>);

impl<K: ToBencode, V: ToBencode> ToBencode for Entries<K, V> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        dict_from_entries(self.0.iter().map(|(k, v)| (k, v)))
    }
}

fn dict_from_entries<'a, K, V, I>(entries: I) -> Result<Value, EncodeError>
where
    K: ToBencode + 'a,
    V: ToBencode + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    let mut dict = Vec::new();
    for (k, v) in entries {
        let key = match k.to_value()? {
            Value::Bytes(b) => b,
            other => return Err(EncodeError::InvalidKeyType(kind(&other))),
        };
        dict.push((key, v.to_value()?));
    }
    Ok(Value::Dict(dict))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Integer(_) => "integer",
        Value::Bytes(_) => "byte string",
        Value::List(_) => "list",
        Value::Dict(_) => "dictionary",
    }
}
