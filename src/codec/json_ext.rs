//! JSON with tagged typed arrays (hex buffers)

use super::json::{from_slice, to_text};
use super::wire::Wire;
use super::{EncodeOptions, Encoding, Payload};
use crate::error::Result;

pub(super) fn encode(wire: &Wire, options: &EncodeOptions) -> Result<Payload> {
    to_text(wire, options, Encoding::JsonExt)
}

pub(super) fn decode(bytes: &[u8]) -> Result<Wire> {
    from_slice(bytes, Encoding::JsonExt)
}
