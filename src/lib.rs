//! bencodec - A Bencode codec
//!
//! This library encodes and decodes the Bencode format: integers, byte
//! strings, ordered lists and ordered dictionaries, concatenated into
//! self-delimiting streams.
//!
//! # Modules
//!
//! - [`bencode`] - Value model, encoder and recursive-descent decoder
//! - [`stream`] - Multi-value stream adapters between values, byte sinks and files

pub mod bencode;
pub mod stream;

pub use bencode::{
    decode, decode_all, encode, encode_to, to_bytes, DecodeError, Decoder, EncodeError, Encoder,
    Entries, Production, ToBencode, Value,
};
pub use stream::{decode_stream, encode_stream, StreamError, ValueSink};
