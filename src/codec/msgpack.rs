//! MessagePack with tagged typed arrays (bin buffers)

use super::wire::Wire;
use super::{EncodeOptions, Encoding, Payload};
use crate::error::{Error, Result};

pub(super) fn encode(wire: &Wire, _options: &EncodeOptions) -> Result<Payload> {
    rmp_serde::to_vec_named(wire)
        .map(Payload::Binary)
        .map_err(|e| Error::encode(Encoding::MsgpackExt.name(), e))
}

pub(super) fn decode(bytes: &[u8]) -> Result<Wire> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::decode(Encoding::MsgpackExt.name(), e, None))
}
