use std::io::{BufRead, BufReader, ErrorKind, Read};

use bytes::Bytes;

use super::error::{DecodeError, Production};
use super::value::Value;

/// Streaming bencode decoder over a buffered byte source.
///
/// Each call to [`Decoder::decode`] reads exactly one top-level value. Reaching
/// the end of the source between values is the normal end of a multi-value
/// stream and yields `Ok(None)`, as many times as it is asked.
///
/// # Examples
///
/// ```
/// use bencodec::bencode::{Decoder, Value};
///
/// let mut decoder = Decoder::new(&b"i1e4:spamle"[..]);
/// assert_eq!(decoder.decode().unwrap(), Some(Value::Integer(1)));
/// assert_eq!(decoder.decode().unwrap(), Some(Value::string("spam")));
/// assert_eq!(decoder.decode().unwrap(), Some(Value::List(vec![])));
/// assert_eq!(decoder.decode().unwrap(), None);
/// assert_eq!(decoder.decode().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    max_depth: Option<usize>,
    failed: bool,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            max_depth: None,
            failed: false,
        }
    }

    /// Limits how deeply lists and dictionaries may nest.
    ///
    /// A limit of `0` only accepts integers and strings.
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Decodes the next top-level value.
    ///
    /// Returns `Ok(None)` when the source is exhausted at a value boundary.
    pub fn decode(&mut self) -> Result<Option<Value>, DecodeError> {
        match self.peek()? {
            None => Ok(None),
            Some(lead) => self.decode_value(lead, Production::Value, 0).map(Some),
        }
    }

    /// Number of bytes currently buffered by the source.
    ///
    /// Exact for in-memory slices, a lower bound for readers.
    pub fn remaining(&mut self) -> usize {
        self.reader.fill_buf().map(|buf| buf.len()).unwrap_or(0)
    }

    fn peek(&mut self) -> Result<Option<u8>, DecodeError> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, DecodeError> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.reader.consume(1);
        }
        Ok(byte)
    }

    fn unexpected(&mut self, production: Production, byte: u8) -> DecodeError {
        DecodeError::UnexpectedCharacter {
            production,
            found: byte as char,
            remaining: self.remaining(),
        }
    }

    /// Decodes the value starting with the unconsumed lookahead byte `lead`.
    ///
    /// `within` names the production reported if `lead` cannot start a value.
    fn decode_value(
        &mut self,
        lead: u8,
        within: Production,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        match lead {
            b'0'..=b'9' => self.decode_bytes().map(Value::Bytes),
            b'i' => {
                self.reader.consume(1);
                self.decode_integer()
            }
            b'l' => {
                let depth = self.enter(depth)?;
                self.reader.consume(1);
                self.decode_list(depth)
            }
            b'd' => {
                let depth = self.enter(depth)?;
                self.reader.consume(1);
                self.decode_dict(depth)
            }
            c => Err(self.unexpected(within, c)),
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, DecodeError> {
        let depth = depth + 1;
        match self.max_depth {
            Some(limit) if depth > limit => Err(DecodeError::NestingTooDeep { limit }),
            _ => Ok(depth),
        }
    }

    fn decode_integer(&mut self) -> Result<Value, DecodeError> {
        let mut value: i64 = 0;
        let mut negative = false;
        let mut digits = 0usize;

        loop {
            match self.next_byte()? {
                Some(c @ b'0'..=b'9') => {
                    let digit = i64::from(c - b'0');
                    // Accumulate negative values downwards so i64::MIN fits.
                    value = value
                        .checked_mul(10)
                        .and_then(|v| {
                            if negative {
                                v.checked_sub(digit)
                            } else {
                                v.checked_add(digit)
                            }
                        })
                        .ok_or(DecodeError::IntegerOverflow)?;
                    digits += 1;
                }
                Some(b'-') if digits == 0 && !negative => negative = true,
                Some(b'e') if digits > 0 => return Ok(Value::Integer(value)),
                Some(c) => {
                    return Err(DecodeError::MalformedInteger {
                        found: Some(c as char),
                        remaining: self.remaining(),
                    })
                }
                None => {
                    return Err(DecodeError::MalformedInteger {
                        found: None,
                        remaining: 0,
                    })
                }
            }
        }
    }

    fn decode_length(&mut self) -> Result<usize, DecodeError> {
        let mut len: usize = 0;

        loop {
            match self.next_byte()? {
                Some(c @ b'0'..=b'9') => {
                    len = len
                        .checked_mul(10)
                        .and_then(|l| l.checked_add(usize::from(c - b'0')))
                        .ok_or(DecodeError::LengthOverflow)?;
                }
                Some(b':') => return Ok(len),
                Some(c) => {
                    return Err(DecodeError::MalformedLengthPrefix {
                        found: Some(c as char),
                        remaining: self.remaining(),
                    })
                }
                None => {
                    return Err(DecodeError::MalformedLengthPrefix {
                        found: None,
                        remaining: 0,
                    })
                }
            }
        }
    }

    fn decode_bytes(&mut self) -> Result<Bytes, DecodeError> {
        let len = self.decode_length()?;

        // Grow with the data actually read rather than trusting the prefix.
        let mut buf = Vec::with_capacity(len.min(self.remaining()));
        let read = (&mut self.reader).take(len as u64).read_to_end(&mut buf)?;

        if read < len {
            return Err(DecodeError::TruncatedString {
                expected: len,
                found: read,
            });
        }

        Ok(Bytes::from(buf))
    }

    fn decode_list(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let mut list = Vec::new();

        loop {
            match self.peek()? {
                Some(b'e') => {
                    self.reader.consume(1);
                    return Ok(Value::List(list));
                }
                Some(lead) => list.push(self.decode_value(lead, Production::List, depth)?),
                None => {
                    return Err(DecodeError::TruncatedCollection {
                        production: Production::List,
                    })
                }
            }
        }
    }

    fn decode_dict(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let mut dict = Vec::new();

        loop {
            match self.peek()? {
                Some(b'e') => {
                    self.reader.consume(1);
                    return Ok(Value::Dict(dict));
                }
                Some(b'0'..=b'9') => {
                    let key = self.decode_bytes()?;
                    let value = match self.peek()? {
                        Some(lead) => self.decode_value(lead, Production::Dict, depth)?,
                        None => {
                            return Err(DecodeError::TruncatedCollection {
                                production: Production::Dict,
                            })
                        }
                    };
                    dict.push((key, value));
                }
                Some(c) => return Err(self.unexpected(Production::Dict, c)),
                None => {
                    return Err(DecodeError::TruncatedCollection {
                        production: Production::Dict,
                    })
                }
            }
        }
    }
}

impl<R: Read> Decoder<BufReader<R>> {
    /// Creates a decoder over an unbuffered reader.
    pub fn from_reader(reader: R) -> Self {
        Decoder::new(BufReader::new(reader))
    }
}

/// Yields top-level values until the source is exhausted.
///
/// The iterator stops after the first error.
impl<R: BufRead> Iterator for Decoder<R> {
    type Item = Result<Value, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.decode() {
            Ok(value) => value.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Decodes exactly one bencode value from `data`.
///
/// # Errors
///
/// Fails if `data` is empty, is not valid bencode, or has bytes left over
/// after the first value.
///
/// # Examples
///
/// ```
/// use bencodec::bencode::{decode, Value};
///
/// assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
/// assert_eq!(decode(b"4:spam").unwrap().as_str(), Some("spam"));
/// assert!(decode(b"i42ei43e").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, DecodeError> {
    let mut decoder = Decoder::new(data);
    let value = decoder.decode()?.ok_or(DecodeError::EmptyInput)?;

    let remaining = decoder.remaining();
    if remaining != 0 {
        return Err(DecodeError::TrailingData { remaining });
    }

    Ok(value)
}

/// Decodes every top-level value in `data`.
///
/// # Examples
///
/// ```
/// use bencodec::bencode::{decode_all, Value};
///
/// let values = decode_all(b"0:i-42e").unwrap();
/// assert_eq!(values, vec![Value::string(""), Value::Integer(-42)]);
/// ```
pub fn decode_all(data: &[u8]) -> Result<Vec<Value>, DecodeError> {
    Decoder::new(data).collect()
}
