//! YAML

use super::wire::Wire;
use super::{EncodeOptions, Encoding, Payload};
use crate::error::{Error, Position, Result};

pub(super) fn encode(wire: &Wire, _options: &EncodeOptions) -> Result<Payload> {
    serde_yaml::to_string(wire)
        .map(Payload::Text)
        .map_err(|e| Error::encode(Encoding::Yaml.name(), e))
}

pub(super) fn decode(bytes: &[u8]) -> Result<Wire> {
    serde_yaml::from_slice(bytes).map_err(|e| {
        let position = e.location().map(|loc| Position::Line {
            line: loc.line(),
            column: loc.column(),
        });
        Error::decode(Encoding::Yaml.name(), e, position)
    })
}
