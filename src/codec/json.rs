//! Plain JSON

use super::wire::Wire;
use super::{EncodeOptions, Encoding, Payload};
use crate::error::{Error, Position, Result};

pub(super) fn encode(wire: &Wire, options: &EncodeOptions) -> Result<Payload> {
    to_text(wire, options, Encoding::Json)
}

pub(super) fn decode(bytes: &[u8]) -> Result<Wire> {
    from_slice(bytes, Encoding::Json)
}

/// serde_json writes non-finite floats as `null`
pub(super) fn to_text(wire: &Wire, options: &EncodeOptions, encoding: Encoding) -> Result<Payload> {
    let text = if options.pretty {
        serde_json::to_string_pretty(wire)
    } else {
        serde_json::to_string(wire)
    };
    text.map(Payload::Text)
        .map_err(|e| Error::encode(encoding.name(), e))
}

pub(super) fn from_slice(bytes: &[u8], encoding: Encoding) -> Result<Wire> {
    serde_json::from_slice(bytes).map_err(|e| {
        let position = (e.line() > 0).then(|| Position::Line {
            line: e.line(),
            column: e.column(),
        });
        Error::decode(encoding.name(), e, position)
    })
}
