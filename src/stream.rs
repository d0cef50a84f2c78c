//! Multi-value stream adapters.
//!
//! A bencode stream is a plain concatenation of top-level values with no
//! separators. These helpers connect a producer of values to a byte sink, and
//! a byte source to a consumer of decoded values.
//!
//! # Examples
//!
//! ```
//! use bencodec::bencode::Value;
//! use bencodec::stream::{decode_stream, encode_stream};
//!
//! let mut bytes: Vec<u8> = Vec::new();
//! let written = encode_stream([Value::string(""), Value::Integer(-42)], &mut bytes).unwrap();
//! assert_eq!(written, 2);
//! assert_eq!(bytes, b"0:i-42e");
//!
//! let mut values: Vec<Value> = Vec::new();
//! decode_stream(&bytes[..], &mut values).unwrap();
//! assert_eq!(values, vec![Value::string(""), Value::Integer(-42)]);
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::Sender;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::bencode::{DecodeError, Decoder, EncodeError, Encoder, ToBencode, Value};

/// Errors that can occur while moving values between a stream and a consumer.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The consumer refused a value.
    #[error("consumer closed: {0}")]
    ConsumerClosed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives decoded values one at a time.
///
/// [`close`](ValueSink::close) is called once the source has been drained
/// without error.
pub trait ValueSink {
    fn accept(&mut self, value: Value) -> Result<(), StreamError>;

    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

impl ValueSink for Vec<Value> {
    fn accept(&mut self, value: Value) -> Result<(), StreamError> {
        self.push(value);
        Ok(())
    }
}

/// Forwards values to a channel. Dropping the receiver closes the sink.
impl ValueSink for Sender<Value> {
    fn accept(&mut self, value: Value) -> Result<(), StreamError> {
        self.send(value)
            .map_err(|e| StreamError::ConsumerClosed(e.to_string()))
    }
}

impl<S: ValueSink + ?Sized> ValueSink for &mut S {
    fn accept(&mut self, value: Value) -> Result<(), StreamError> {
        (**self).accept(value)
    }

    fn close(&mut self) -> Result<(), StreamError> {
        (**self).close()
    }
}

/// Encodes every value from `values` into `sink` and flushes it.
///
/// Returns the number of values written. The first failing value aborts the
/// stream; bytes already written for earlier values stay in the sink.
pub fn encode_stream<I, W>(values: I, sink: W) -> Result<usize, StreamError>
where
    I: IntoIterator,
    I::Item: ToBencode,
    W: Write,
{
    encode_stream_with(Encoder::new(), values, sink)
}

/// Same as [`encode_stream`], with explicit encoder settings.
pub fn encode_stream_with<I, W>(
    encoder: Encoder,
    values: I,
    mut sink: W,
) -> Result<usize, StreamError>
where
    I: IntoIterator,
    I::Item: ToBencode,
    W: Write,
{
    let mut count = 0;
    for item in values {
        let value = item.to_value()?;
        encoder.encode_to(&value, &mut sink)?;
        count += 1;
        trace!("encoded value {}", count);
    }
    sink.flush()?;
    debug!(count, canonical = encoder.is_canonical(), "encoded value stream");
    Ok(count)
}

/// Decodes every value in `source` and hands it to `consumer`.
///
/// Stops at the clean end of the source, closes the consumer and returns the
/// number of values delivered. On error the consumer is left open.
pub fn decode_stream<R, S>(source: R, consumer: S) -> Result<usize, StreamError>
where
    R: BufRead,
    S: ValueSink,
{
    decode_stream_with(Decoder::new(source), consumer)
}

/// Same as [`decode_stream`], with a preconfigured decoder.
pub fn decode_stream_with<R, S>(
    mut decoder: Decoder<R>,
    mut consumer: S,
) -> Result<usize, StreamError>
where
    R: BufRead,
    S: ValueSink,
{
    let mut count = 0;
    loop {
        match decoder.decode() {
            Ok(Some(value)) => {
                consumer.accept(value)?;
                count += 1;
                trace!("decoded value {}", count);
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Decoding failed after {} values: {}", count, e);
                return Err(e.into());
            }
        }
    }
    consumer.close()?;
    debug!(count, "decoded value stream");
    Ok(count)
}

/// Encodes `values` into a new file at `path`, replacing any existing file.
pub fn encode_file<P, I>(path: P, values: I) -> Result<usize, StreamError>
where
    P: AsRef<Path>,
    I: IntoIterator,
    I::Item: ToBencode,
{
    let path = path.as_ref();
    debug!("Encoding value stream to {}", path.display());
    let file = File::create(path)?;
    encode_stream(values, BufWriter::new(file))
}

/// Decodes every value stored in the file at `path`.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Vec<Value>, StreamError> {
    let path = path.as_ref();
    debug!("Decoding value stream from {}", path.display());
    let file = File::open(path)?;
    let mut values = Vec::new();
    decode_stream(BufReader::new(file), &mut values)?;
    Ok(values)
}
