//! Error types for treecodec

use std::fmt;
use thiserror::Error;

/// Location inside malformed input, when the format reports one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Byte offset from the start of the input
    Byte(usize),
    /// One-based line and column (text formats)
    Line { line: usize, column: usize },
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Byte(offset) => write!(f, "byte {}", offset),
            Position::Line { line, column } => write!(f, "line {} column {}", line, column),
        }
    }
}

/// Treecodec error type
#[derive(Debug, Error)]
pub enum Error {
    /// Encoding name is not in the registry, or a file suffix could not be mapped
    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    /// A value could not be represented in the requested encoding
    #[error("failed to encode {encoding}: {message}")]
    Encode { encoding: String, message: String },

    /// Input was malformed for the requested encoding
    #[error(
        "failed to decode {encoding}{}: {message}",
        .position.map(|p| format!(" at {}", p)).unwrap_or_default()
    )]
    Decode {
        encoding: String,
        message: String,
        position: Option<Position>,
    },

    /// Elements could not be coerced to the requested element kind
    #[error("type error: {0}")]
    Type(String),

    /// Input type has no element kind
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Input type or shape has no defined storage mapping
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Units metadata refers to a dataset that does not exist at its level
    #[error("units metadata '{key}' has no sibling dataset '{target}'")]
    MissingTarget { key: String, target: String },

    /// A group or dataset with this name already exists
    #[error("'{0}' already exists")]
    NameConflict(String),

    /// Raised by a record layer when a tree does not describe a valid record
    #[error("invalid record: {0}")]
    Record(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn encode(encoding: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Encode {
            encoding: encoding.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn decode(
        encoding: impl Into<String>,
        message: impl fmt::Display,
        position: Option<Position>,
    ) -> Self {
        Error::Decode {
            encoding: encoding.into(),
            message: message.to_string(),
            position,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
