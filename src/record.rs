//! Record layer: typed structs that convert to and from trees
//!
//! Implement [`Record::to_tree`] and [`Record::from_tree`]; serialization,
//! file I/O and comparison come for free.
//!
//! ```
//! use treecodec::{Error, Record, Result, Tree, Value, tree};
//!
//! #[derive(Debug, PartialEq)]
//! struct Molecule {
//!     name: String,
//!     charge: i64,
//! }
//!
//! impl Record for Molecule {
//!     fn to_tree(&self) -> Tree {
//!         tree! { "name" => self.name.as_str(), "charge" => self.charge }
//!     }
//!
//!     fn from_tree(tree: Tree) -> Result<Self> {
//!         let name = tree.get("name").and_then(Value::as_str)
//!             .ok_or_else(|| Error::Record("missing name".into()))?;
//!         let charge = tree.get("charge").and_then(Value::as_int)
//!             .ok_or_else(|| Error::Record("missing charge".into()))?;
//!         Ok(Molecule { name: name.to_string(), charge })
//!     }
//! }
//!
//! let water = Molecule { name: "water".into(), charge: 0 };
//! let payload = water.serialize("msgpack-ext")?;
//! assert_eq!(Molecule::parse_raw(&payload, None)?, water);
//! # Ok::<(), Error>(())
//! ```

use crate::codec::{EncodeOptions, Payload, Registry};
use crate::compare::{Tolerance, equal};
use crate::error::Result;
use crate::file::{self, WriteOptions};
use crate::types::{Tree, Value};
use std::path::Path;

pub trait Record: Sized {
    fn to_tree(&self) -> Tree;

    /// Fails with [`Error::Record`](crate::Error::Record) when the tree is not a valid record
    fn from_tree(tree: Tree) -> Result<Self>;

    fn serialize(&self, encoding: &str) -> Result<Payload> {
        Registry::global().encode(&self.to_tree(), encoding, &EncodeOptions::default())
    }

    /// Text payloads default to json and binary ones to msgpack-ext
    fn parse_raw(payload: &Payload, encoding: Option<&str>) -> Result<Self> {
        Self::from_tree(Registry::global().decode_payload(payload, encoding)?)
    }

    fn parse_file(path: impl AsRef<Path>, encoding: Option<&str>) -> Result<Self> {
        Self::from_tree(file::read_path(path, encoding)?)
    }

    fn write_file(
        &self,
        path: impl AsRef<Path>,
        encoding: Option<&str>,
        options: &WriteOptions,
    ) -> Result<()> {
        file::write_path(path, &self.to_tree(), encoding, options)
    }

    fn compare(&self, other: &Self, tol: &Tolerance) -> bool {
        equal(&Value::Map(self.to_tree()), &Value::Map(other.to_tree()), tol)
    }
}
