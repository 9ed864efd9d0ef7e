//! Encoding registry and dispatch

use super::wire::{self, Wire};
use super::{EncodeOptions, Encoding, Payload, json, json_ext, msgpack, yaml};
use crate::error::{Error, Result};
use crate::types::{Tree, Value};
use indexmap::IndexMap;
use std::sync::OnceLock;
use tracing::debug;

pub(crate) type EncodeFn = fn(&Wire, &EncodeOptions) -> Result<Payload>;
pub(crate) type DecodeFn = fn(&[u8]) -> Result<Wire>;

/// Which optional codecs a registry carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub pickle: bool,
}

impl Capabilities {
    /// Everything compiled into this build
    pub fn detect() -> Self {
        Self {
            pickle: cfg!(feature = "pickle"),
        }
    }
}

#[derive(Clone, Copy)]
struct Codec {
    encode: EncodeFn,
    decode: DecodeFn,
}

/// Maps encodings to their codecs
///
/// Populated at construction and read-only afterwards; [`Registry::global`]
/// is shared process-wide.
pub struct Registry {
    codecs: IndexMap<Encoding, Codec>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("encodings", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Registry with the always-available codecs and the optional ones in `capabilities`
    pub fn new(capabilities: Capabilities) -> Self {
        let mut registry = Self {
            codecs: IndexMap::new(),
        };
        registry.register(Encoding::Json, json::encode, json::decode);
        registry.register(Encoding::JsonExt, json_ext::encode, json_ext::decode);
        registry.register(Encoding::MsgpackExt, msgpack::encode, msgpack::decode);
        registry.register(Encoding::Yaml, yaml::encode, yaml::decode);

        #[cfg(feature = "pickle")]
        if capabilities.pickle {
            registry.register(Encoding::Pickle, super::pickle::encode, super::pickle::decode);
        }
        #[cfg(not(feature = "pickle"))]
        if capabilities.pickle {
            tracing::warn!("pickle codec requested but the `pickle` feature is not enabled");
        }

        registry
    }

    /// Shared registry built from [`Capabilities::detect`]
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(|| Registry::new(Capabilities::detect()))
    }

    pub(crate) fn register(&mut self, encoding: Encoding, encode: EncodeFn, decode: DecodeFn) {
        self.codecs.insert(encoding, Codec { encode, decode });
    }

    /// Registered encodings, in registration order
    pub fn encodings(&self) -> impl Iterator<Item = Encoding> + '_ {
        self.codecs.keys().copied()
    }

    pub fn supports(&self, encoding: Encoding) -> bool {
        self.codecs.contains_key(&encoding)
    }

    fn lookup(&self, name: &str) -> Result<(Encoding, Codec)> {
        let encoding = Encoding::from_name(name)?;
        self.codecs
            .get(&encoding)
            .map(|codec| (encoding, *codec))
            .ok_or_else(|| Error::UnknownEncoding(name.to_string()))
    }

    /// Encode a tree
    pub fn encode(&self, tree: &Tree, name: &str, options: &EncodeOptions) -> Result<Payload> {
        let (encoding, codec) = self.lookup(name)?;
        debug!(%encoding, keys = tree.len(), "encoding tree");
        (codec.encode)(&wire::lower_tree(tree, encoding)?, options)
    }

    /// Decode bytes that must hold a mapping
    pub fn decode(&self, bytes: &[u8], name: &str) -> Result<Tree> {
        let (encoding, codec) = self.lookup(name)?;
        debug!(%encoding, bytes = bytes.len(), "decoding tree");
        wire::lift_tree((codec.decode)(bytes)?, encoding)
    }

    /// Encode any value, not only a mapping
    pub fn encode_value(
        &self,
        value: &Value,
        name: &str,
        options: &EncodeOptions,
    ) -> Result<Payload> {
        let (encoding, codec) = self.lookup(name)?;
        debug!(%encoding, kind = value.tag().name(), "encoding value");
        (codec.encode)(&wire::lower(value, encoding)?, options)
    }

    /// Decode bytes holding any value
    pub fn decode_value(&self, bytes: &[u8], name: &str) -> Result<Value> {
        let (encoding, codec) = self.lookup(name)?;
        debug!(%encoding, bytes = bytes.len(), "decoding value");
        wire::lift((codec.decode)(bytes)?, encoding)
    }

    /// Decode a payload, picking json for text and msgpack-ext for binary
    /// unless `name` is given
    pub fn decode_payload(&self, payload: &Payload, name: Option<&str>) -> Result<Tree> {
        let name = name.unwrap_or_else(|| Encoding::for_payload(payload).name());
        self.decode(payload.as_bytes(), name)
    }

    /// The tree as it reads back after a trip through encoding `name`
    pub fn normalize(&self, tree: &Tree, name: &str) -> Result<Tree> {
        let payload = self.encode(tree, name, &EncodeOptions::default())?;
        self.decode(payload.as_bytes(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree;
    use crate::types::TypedArray;

    #[test]
    fn default_encodings_registered() {
        let registry = Registry::new(Capabilities::default());
        let names: Vec<_> = registry.encodings().map(Encoding::name).collect();
        assert_eq!(names, ["json", "json-ext", "msgpack-ext", "yaml"]);
        assert!(!registry.supports(Encoding::Pickle));
    }

    #[test]
    fn missing_codec_is_unknown() {
        let registry = Registry::new(Capabilities::default());
        let err = registry.encode(&Tree::new(), "pickle", &EncodeOptions::default());
        assert!(matches!(err, Err(Error::UnknownEncoding(name)) if name == "pickle"));
    }

    #[test]
    fn aliases_dispatch() {
        let registry = Registry::global();
        let tree = tree! { "a" => 1i64 };
        let payload = registry.encode(&tree, "yml", &EncodeOptions::default()).unwrap();
        assert_eq!(registry.decode(payload.as_bytes(), "yaml").unwrap(), tree);
    }

    #[test]
    fn decode_payload_auto_selects() {
        let registry = Registry::global();
        let tree = tree! { "v" => TypedArray::vector(vec![1.0, 2.0]) };

        let binary = registry.encode(&tree, "msgpack-ext", &EncodeOptions::default()).unwrap();
        assert_eq!(registry.decode_payload(&binary, None).unwrap(), tree);

        let text = registry.encode(&tree, "json", &EncodeOptions::default()).unwrap();
        let back = registry.decode_payload(&text, None).unwrap();
        assert!(back["v"].as_array().is_none());

        let ext = registry.encode(&tree, "json-ext", &EncodeOptions::default()).unwrap();
        assert_eq!(registry.decode_payload(&ext, Some("json-ext")).unwrap(), tree);
    }

    #[test]
    fn decode_requires_a_mapping() {
        let err = Registry::global().decode(b"[1, 2]", "json").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        let value = Registry::global().decode_value(b"[1, 2]", "json").unwrap();
        assert_eq!(value, Value::Seq(vec![1i64.into(), 2i64.into()]));
    }

    #[test]
    fn normalize_degrades_arrays_for_json() {
        let tree = tree! { "v" => TypedArray::from_i64(vec![2], vec![1, 2]).unwrap() };
        let normalized = Registry::global().normalize(&tree, "json").unwrap();
        assert_eq!(normalized["v"], Value::Seq(vec![1i64.into(), 2i64.into()]));
    }
}
