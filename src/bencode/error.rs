use std::fmt;

use thiserror::Error;

/// A grammar rule of the decoder's dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    /// Dispatch of a top-level value.
    Value,
    String,
    Integer,
    List,
    Dict,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Production::Value => "Value",
            Production::String => "String",
            Production::Integer => "Integer",
            Production::List => "List",
            Production::Dict => "Dict",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while decoding bencode input.
///
/// `remaining` fields carry the number of bytes the source still had buffered
/// when the error was detected. For in-memory slices this is exact, for
/// buffered readers it is a lower bound.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A string length prefix contained a byte that is neither a digit nor `:`,
    /// or the input ended before the `:` delimiter.
    #[error("{}", describe(Production::String, .found, .remaining))]
    MalformedLengthPrefix { found: Option<char>, remaining: usize },

    /// The input ended before the declared number of string bytes were read.
    #[error("unexpected end of stream while decoding String: expected {expected} bytes, found {found}")]
    TruncatedString { expected: usize, found: usize },

    /// An integer token contained an unexpected byte or was not terminated.
    #[error("{}", describe(Production::Integer, .found, .remaining))]
    MalformedInteger { found: Option<char>, remaining: usize },

    /// The integer does not fit in an `i64`.
    #[error("Integer value exceeds 64-bit signed range")]
    IntegerOverflow,

    /// The declared string length does not fit in a `usize`.
    #[error("String length prefix exceeds addressable size")]
    LengthOverflow,

    /// The input ended before a list or dictionary terminator.
    #[error("unexpected end of stream while decoding {production}")]
    TruncatedCollection { production: Production },

    /// A byte that cannot start the expected production.
    #[error("{production} value contains unexpected character - {found} (bytes left {remaining})")]
    UnexpectedCharacter {
        production: Production,
        found: char,
        remaining: usize,
    },

    /// Nesting exceeded the limit configured on the decoder.
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// The input contained no value at all.
    #[error("empty input")]
    EmptyInput,

    /// Bytes followed the single expected value.
    #[error("trailing data after value ({remaining} bytes)")]
    TrailingData { remaining: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Returns the production that was being decoded when the error occurred.
    pub fn production(&self) -> Option<Production> {
        match self {
            DecodeError::MalformedLengthPrefix { .. }
            | DecodeError::TruncatedString { .. }
            | DecodeError::LengthOverflow => Some(Production::String),
            DecodeError::MalformedInteger { .. } | DecodeError::IntegerOverflow => {
                Some(Production::Integer)
            }
            DecodeError::TruncatedCollection { production }
            | DecodeError::UnexpectedCharacter { production, .. } => Some(*production),
            DecodeError::NestingTooDeep { .. }
            | DecodeError::EmptyInput
            | DecodeError::TrailingData { .. }
            | DecodeError::Io(_) => None,
        }
    }

    /// Returns `true` if the error was caused by the input ending too early.
    pub fn is_eof(&self) -> bool {
        matches!(
            self,
            DecodeError::TruncatedString { .. }
                | DecodeError::TruncatedCollection { .. }
                | DecodeError::MalformedLengthPrefix { found: None, .. }
                | DecodeError::MalformedInteger { found: None, .. }
        )
    }
}

fn describe(production: Production, found: &Option<char>, remaining: &usize) -> String {
    match found {
        Some(c) => format!(
            "{production} value contains unexpected character - {c} (bytes left {remaining})"
        ),
        None => format!("unexpected end of stream while decoding {production}"),
    }
}

/// Errors that can occur while encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The value has no bencode representation.
    #[error("type is not bencodable: {0}")]
    UnsupportedType(&'static str),

    /// A dictionary key did not map to a byte string.
    #[error("dictionary key is not a byte string: {0}")]
    InvalidKeyType(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
