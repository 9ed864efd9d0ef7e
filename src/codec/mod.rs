//! Text and binary codecs and the registry that dispatches to them
//!
//! | name          | payload | typed arrays                         |
//! |---------------|---------|--------------------------------------|
//! | `json`        | text    | nested lists, non-finite floats null |
//! | `json-ext`    | text    | tagged, hex buffer, bit-exact        |
//! | `msgpack-ext` | binary  | tagged, bin buffer, bit-exact        |
//! | `yaml`        | text    | nested lists                         |
//! | `pickle`      | binary  | tagged, bytes buffer, bit-exact      |

mod json;
mod json_ext;
mod msgpack;
#[cfg(feature = "pickle")]
mod pickle;
mod registry;
mod wire;
mod yaml;

pub use registry::{Capabilities, Registry};

use crate::error::{Error, Result};
use std::fmt;

/// Closed set of supported encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Json,
    JsonExt,
    MsgpackExt,
    Yaml,
    Pickle,
}

impl Encoding {
    pub const ALL: [Encoding; 5] = [
        Encoding::Json,
        Encoding::JsonExt,
        Encoding::MsgpackExt,
        Encoding::Yaml,
        Encoding::Pickle,
    ];

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::JsonExt => "json-ext",
            Encoding::MsgpackExt => "msgpack-ext",
            Encoding::Yaml => "yaml",
            Encoding::Pickle => "pickle",
        }
    }

    /// Look up an encoding by name, case-insensitively; `js` and `yml` are aliases
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" | "js" => Ok(Encoding::Json),
            "json-ext" => Ok(Encoding::JsonExt),
            "msgpack-ext" => Ok(Encoding::MsgpackExt),
            "yaml" | "yml" => Ok(Encoding::Yaml),
            "pickle" => Ok(Encoding::Pickle),
            _ => Err(Error::UnknownEncoding(name.to_string())),
        }
    }

    /// Whether encoded output is a byte payload
    pub fn is_binary(self) -> bool {
        matches!(self, Encoding::MsgpackExt | Encoding::Pickle)
    }

    /// Encoding picked when decoding a payload without an explicit name
    pub fn for_payload(payload: &Payload) -> Self {
        match payload {
            Payload::Text(_) => Encoding::Json,
            Payload::Binary(_) => Encoding::MsgpackExt,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoded output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Binary(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Payload::Text(_))
    }
}

/// Encoder options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Indented output for text encodings
    pub pretty: bool,
}
