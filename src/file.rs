//! Reading and writing trees at filesystem paths
//!
//! The format is taken from an explicit name or inferred from the file
//! suffix:
//!
//! | suffix              | format        |
//! |---------------------|---------------|
//! | `.json`, `.js`      | `json`        |
//! | `.yaml`, `.yml`     | `yaml`        |
//! | `.msgpack`          | `msgpack-ext` |
//! | `.pickle`, `.pkl`   | `pickle`      |
//! | `.grove`, `.grv`    | container     |

use crate::codec::{EncodeOptions, Encoding, Registry};
use crate::container::{self, ContainerOptions};
use crate::error::{Error, Result};
use crate::types::Tree;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Format of a file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Codec(Encoding),
    Container,
}

impl FileFormat {
    /// Format by name; `grove`/`grv` select the container
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "grove" | "grv" => Ok(FileFormat::Container),
            _ => Encoding::from_name(name).map(FileFormat::Codec),
        }
    }

    /// Format from the path suffix
    pub fn from_path(path: &Path) -> Result<Self> {
        let suffix = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match suffix.as_str() {
            "json" | "js" => Ok(FileFormat::Codec(Encoding::Json)),
            "yaml" | "yml" => Ok(FileFormat::Codec(Encoding::Yaml)),
            "msgpack" => Ok(FileFormat::Codec(Encoding::MsgpackExt)),
            "pickle" | "pkl" => Ok(FileFormat::Codec(Encoding::Pickle)),
            "grove" | "grv" => Ok(FileFormat::Container),
            _ => Err(Error::UnknownEncoding(format!(
                "cannot infer an encoding from {}; name one explicitly",
                path.display()
            ))),
        }
    }

    /// Explicit name if given, otherwise the suffix
    pub fn resolve(path: &Path, name: Option<&str>) -> Result<Self> {
        match name {
            Some(name) => Self::from_name(name),
            None => Self::from_path(path),
        }
    }
}

/// What to do with an existing file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the file
    #[default]
    Truncate,
    /// Add to the file; containers merge new nodes into the existing root
    Append,
}

/// Options for [`write_path`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub mode: WriteMode,
    pub encode: EncodeOptions,
    pub container: ContainerOptions,
}

/// Read a tree from `path`
pub fn read_path(path: impl AsRef<Path>, name: Option<&str>) -> Result<Tree> {
    let path = path.as_ref();
    let format = FileFormat::resolve(path, name)?;
    debug!(path = %path.display(), ?format, "reading file");
    match format {
        FileFormat::Container => container::read_file(path),
        FileFormat::Codec(encoding) => {
            let bytes = std::fs::read(path)?;
            Registry::global().decode(&bytes, encoding.name())
        }
    }
}

/// Write a tree to `path`
pub fn write_path(
    path: impl AsRef<Path>,
    tree: &Tree,
    name: Option<&str>,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let format = FileFormat::resolve(path, name)?;
    debug!(path = %path.display(), ?format, mode = ?options.mode, "writing file");
    match format {
        FileFormat::Container => {
            container::write_file(path, tree, &options.container, options.mode)
        }
        FileFormat::Codec(encoding) => {
            let payload = Registry::global().encode(tree, encoding.name(), &options.encode)?;
            let mut file = match options.mode {
                WriteMode::Truncate => OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?,
                WriteMode::Append => OpenOptions::new().append(true).create(true).open(path)?,
            };
            file.write_all(payload.as_bytes())?;
            Ok(())
        }
    }
}
