//! Python pickle streams with tagged typed arrays (bytes buffers)

use super::wire::Wire;
use super::{EncodeOptions, Encoding, Payload};
use crate::error::{Error, Result};
use serde_pickle::{DeOptions, SerOptions};

pub(super) fn encode(wire: &Wire, _options: &EncodeOptions) -> Result<Payload> {
    serde_pickle::to_vec(wire, SerOptions::new())
        .map(Payload::Binary)
        .map_err(|e| Error::encode(Encoding::Pickle.name(), e))
}

pub(super) fn decode(bytes: &[u8]) -> Result<Wire> {
    serde_pickle::from_slice(bytes, DeOptions::new())
        .map_err(|e| Error::decode(Encoding::Pickle.name(), e, None))
}
