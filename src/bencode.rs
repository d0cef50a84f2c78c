//! Bencode encoding and decoding.
//!
//! Bencode is a compact, self-delimiting format for integers, byte strings,
//! lists and dictionaries, used by peer-to-peer protocols for storing and
//! transmitting loosely structured data.
//!
//! # Data Types
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! Dictionaries keep their entries in the order they were written or
//! decoded. Sorted output is available through [`Encoder::canonical`].
//!
//! # Examples
//!
//! ## Decoding a single value
//!
//! ```
//! use bencodec::bencode::{decode, Value};
//!
//! let value = decode(b"d3:foo3:bar3:numi-7ee").unwrap();
//! assert_eq!(value.get(b"foo").and_then(Value::as_str), Some("bar"));
//! assert_eq!(value.get(b"num").and_then(Value::as_integer), Some(-7));
//! ```
//!
//! ## Decoding a stream of values
//!
//! ```
//! use bencodec::bencode::{Decoder, Value};
//!
//! let data: &[u8] = b"0:li777e6:StRingei2147483647e";
//! let mut decoder = Decoder::new(data);
//!
//! while let Some(value) = decoder.decode().unwrap() {
//!     println!("{value}");
//! }
//! ```
//!
//! ## Encoding
//!
//! ```
//! use bencodec::bencode::{encode, Value};
//!
//! let list = Value::List(vec![
//!     Value::Integer(777),
//!     Value::string("StRing"),
//!     Value::Integer(-42),
//!     Value::string("!@$#%^"),
//!     Value::Integer(0),
//! ]);
//! assert_eq!(encode(&list).unwrap(), b"li777e6:StRingi-42e6:!@$#%^i0ee");
//! ```
//!
//! # Error Handling
//!
//! Decoding can fail for various reasons:
//!
//! - [`DecodeError::MalformedLengthPrefix`] - Bad byte in a string length
//! - [`DecodeError::TruncatedString`] - Input ended inside a string
//! - [`DecodeError::MalformedInteger`] - Bad byte in an integer, or no `e`
//! - [`DecodeError::TruncatedCollection`] - A list or dictionary was never closed
//! - [`DecodeError::UnexpectedCharacter`] - A byte that cannot start a value
//!
//! Running out of input between two values is not an error: [`Decoder::decode`]
//! returns `Ok(None)`.

mod decode;
mod encode;
mod error;
mod to_bencode;
mod value;

pub use decode::{decode, decode_all, Decoder};
pub use encode::{encode, encode_to, to_bytes, Encoder};
pub use error::{DecodeError, EncodeError, Production};
pub use to_bencode::{Entries, ToBencode};
pub use value::Value;

#[cfg(test)]
mod tests;
