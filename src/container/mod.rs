//! The grove hierarchical container format
//!
//! A grove file is a 16-byte header followed by a tree of named groups and
//! datasets. Each dataset holds a raw element buffer with its storage kind,
//! shape and string attributes. Trees are mapped onto this hierarchy by
//! [`write_tree`] and read back by [`read_tree`]; keys ending in `_units`
//! become attributes of their sibling dataset.
//!
//! ```no_run
//! use treecodec::container::{self, ContainerOptions};
//! use treecodec::file::WriteMode;
//! use treecodec::tree;
//!
//! let data = tree! { "a" => 1.5, "a_units" => "angstrom" };
//! container::write_file("out.grove", &data, &ContainerOptions::default(), WriteMode::Truncate)?;
//! let back = container::read_file("out.grove")?;
//! assert_eq!(back["a_units"].as_str(), Some("angstrom"));
//! # Ok::<(), treecodec::Error>(())
//! ```

mod storage;
mod tree;

pub use storage::{StorageKind, StorageTag, from_dataset, infer_storage_kind, to_dataset};
pub use tree::{read_tree, write_tree};

use crate::codec::{EncodeOptions, Encoding, Registry};
use crate::error::{Error, Result};
use crate::file::WriteMode;
use crate::types::Tree;
use crate::{parser, writer};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Magic bytes at the start of every grove file
pub const MAGIC: &[u8; 8] = b"GROVE\0\0\0";

/// Current format version
pub const VERSION: u32 = 1;

/// Header size in bytes (magic + version + flags)
pub const HEADER_SIZE: usize = 16;

/// Tags of nodes in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeTag {
    Group = 0x01,
    Dataset = 0x02,
}

impl NodeTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(NodeTag::Group),
            0x02 => Some(NodeTag::Dataset),
            _ => None,
        }
    }
}

/// A named entry of a group
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(Group),
    Dataset(Dataset),
}

/// Ordered collection of named child nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    children: IndexMap<String, Node>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_children(children: IndexMap<String, Node>) -> Self {
        Self { children }
    }

    /// Create an empty child group; fails if `name` is taken
    pub fn create_group(&mut self, name: &str) -> Result<&mut Group> {
        match self.insert(name, Node::Group(Group::new()))? {
            Node::Group(group) => Ok(group),
            Node::Dataset(_) => unreachable!("inserted node is a group"),
        }
    }

    /// Add a dataset; fails if `name` is taken
    pub fn create_dataset(&mut self, name: &str, dataset: Dataset) -> Result<&mut Dataset> {
        match self.insert(name, Node::Dataset(dataset))? {
            Node::Dataset(dataset) => Ok(dataset),
            Node::Group(_) => unreachable!("inserted node is a dataset"),
        }
    }

    /// Insert a node under a new name
    pub fn insert(&mut self, name: &str, node: Node) -> Result<&mut Node> {
        if name.is_empty() || name.contains('/') {
            return Err(Error::encode("grove", format!("invalid node name {:?}", name)));
        }
        match self.children.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::NameConflict(name.to_string())),
            Entry::Vacant(entry) => Ok(entry.insert(node)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        match self.children.get(name) {
            Some(Node::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        match self.children.get(name) {
            Some(Node::Dataset(dataset)) => Some(dataset),
            _ => None,
        }
    }

    pub fn dataset_mut(&mut self, name: &str) -> Option<&mut Dataset> {
        match self.children.get_mut(name) {
            Some(Node::Dataset(dataset)) => Some(dataset),
            _ => None,
        }
    }

    /// Children in insertion order
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A raw element buffer with its storage kind, shape and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    kind: StorageKind,
    shape: Vec<usize>,
    attrs: IndexMap<String, String>,
    data: Vec<u8>,
}

impl Dataset {
    pub fn new(kind: StorageKind, shape: Vec<usize>, data: Vec<u8>) -> Self {
        Self {
            kind,
            shape,
            attrs: IndexMap::new(),
            data,
        }
    }

    pub fn kind(&self) -> &StorageKind {
        &self.kind
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn attrs(&self) -> &IndexMap<String, String> {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Set a string attribute, replacing any previous value
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }
}

/// Options for mapping trees onto containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Store `<name>_units` keys as attributes of dataset `<name>`
    pub units_metadata: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            units_metadata: true,
        }
    }
}

/// An open grove file and its in-memory hierarchy
///
/// Writable handles are written back on [`flush`](Self::flush),
/// [`close`](Self::close) or drop.
#[derive(Debug)]
pub struct ContainerFile {
    file: File,
    path: PathBuf,
    root: Group,
    writable: bool,
    closed: bool,
}

impl ContainerFile {
    /// Create a new empty container, truncating any existing file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::with_root(file, path, Group::new(), true))
    }

    /// Open an existing container read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let root = read_root(&mut file)?;
        Ok(Self::with_root(file, path, root, false))
    }

    /// Open a container for adding nodes, creating it if missing
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let root = if file.metadata()?.len() == 0 {
            Group::new()
        } else {
            read_root(&mut file)?
        };
        Ok(Self::with_root(file, path, root, true))
    }

    fn with_root(file: File, path: &Path, root: Group, writable: bool) -> Self {
        debug!(path = %path.display(), writable, "opened container");
        Self {
            file,
            path: path.to_path_buf(),
            root,
            writable,
            closed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    /// Write the hierarchy back to disk
    pub fn flush(&mut self) -> Result<()> {
        if !self.writable {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{} was opened read-only", self.path.display()),
            )));
        }
        let bytes = writer::to_bytes(&self.root).map_err(|e| Error::encode("grove", e))?;
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&bytes)?;
        self.file.flush()?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "flushed container");
        Ok(())
    }

    /// Flush (when writable) and release the file
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        if self.writable {
            self.flush()?;
        }
        Ok(())
    }
}

impl Drop for ContainerFile {
    fn drop(&mut self) {
        if self.writable && !self.closed {
            if let Err(e) = self.flush() {
                warn!(path = %self.path.display(), error = %e, "failed to flush container on drop");
            }
        }
    }
}

fn read_root(file: &mut File) -> Result<Group> {
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    parser::parse(&bytes).map_err(|e| e.into_error("grove"))
}

/// Write a tree to a grove file
pub fn write_file(
    path: impl AsRef<Path>,
    tree: &Tree,
    options: &ContainerOptions,
    mode: WriteMode,
) -> Result<()> {
    let mut file = match mode {
        WriteMode::Truncate => ContainerFile::create(path)?,
        WriteMode::Append => ContainerFile::append(path)?,
    };
    write_tree(file.root_mut(), tree, options)?;
    file.close()
}

/// Read a grove file into a tree
pub fn read_file(path: impl AsRef<Path>) -> Result<Tree> {
    let file = ContainerFile::open(path)?;
    read_tree(file.root())
}

/// Convert a grove file into a json-ext document
pub fn to_json(container: impl AsRef<Path>, json: impl AsRef<Path>) -> Result<()> {
    let tree = read_file(container)?;
    let payload = Registry::global().encode(
        &tree,
        Encoding::JsonExt.name(),
        &EncodeOptions { pretty: true },
    )?;
    std::fs::write(json, payload.as_bytes())?;
    Ok(())
}

/// Convert a json-ext document into a new grove file
pub fn from_json(
    json: impl AsRef<Path>,
    container: impl AsRef<Path>,
    options: &ContainerOptions,
) -> Result<()> {
    let bytes = std::fs::read(json)?;
    let tree = Registry::global().decode(&bytes, Encoding::JsonExt.name())?;
    write_file(container, &tree, options, WriteMode::Truncate)
}
