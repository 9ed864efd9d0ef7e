//! Mapping between trees and container hierarchies

use super::{ContainerOptions, Group, Node, from_dataset, to_dataset};
use crate::error::{Error, Result};
use crate::types::{Tree, UNITS_SUFFIX, Value};
use tracing::trace;

/// Write `tree` into `group`
///
/// Mappings become child groups and every other value a dataset. With
/// `units_metadata` set, a `<name>_units` string is attached to dataset
/// `<name>` at the same level as an attribute instead of being stored.
pub fn write_tree(group: &mut Group, tree: &Tree, options: &ContainerOptions) -> Result<()> {
    let mut units = Vec::new();

    for (key, value) in tree {
        if options.units_metadata && key.ends_with(UNITS_SUFFIX) {
            units.push((key, value));
            continue;
        }
        match value {
            Value::Map(child) => {
                let child_group = group.create_group(key)?;
                write_tree(child_group, child, options)?;
            }
            other => {
                let dataset = to_dataset(other).map_err(|e| in_key(e, key))?;
                trace!(
                    name = %key,
                    kind = ?dataset.kind(),
                    shape = ?dataset.shape(),
                    "writing dataset"
                );
                group.create_dataset(key, dataset)?;
            }
        }
    }

    for (key, value) in units {
        let target = &key[..key.len() - UNITS_SUFFIX.len()];
        let Value::Str(text) = value else {
            return Err(Error::encode(
                "grove",
                format!(
                    "units metadata '{}' must be a string, found {}",
                    key,
                    value.tag().name()
                ),
            ));
        };
        let dataset = group
            .dataset_mut(target)
            .ok_or_else(|| Error::MissingTarget {
                key: key.clone(),
                target: target.to_string(),
            })?;
        dataset.set_attr(key.as_str(), text.as_str());
    }
    Ok(())
}

/// Name the offending key in storage errors
fn in_key(err: Error, key: &str) -> Error {
    match err {
        Error::NotImplemented(msg) => Error::NotImplemented(format!("{} (key '{}')", msg, key)),
        Error::Type(msg) => Error::Type(format!("{} (key '{}')", msg, key)),
        other => other,
    }
}

/// Read `group` back into a tree
pub fn read_tree(group: &Group) -> Result<Tree> {
    let mut tree = Tree::with_capacity(group.len());
    for (name, node) in group.iter() {
        match node {
            Node::Group(child) => {
                tree.insert(name.clone(), Value::Map(read_tree(child)?));
            }
            Node::Dataset(dataset) => {
                trace!(name = %name, kind = ?dataset.kind(), "reading dataset");
                tree.insert(name.clone(), from_dataset(dataset)?);
                for (key, text) in dataset.attrs() {
                    if key.ends_with(UNITS_SUFFIX) {
                        tree.insert(key.clone(), Value::Str(text.clone()));
                    }
                }
            }
        }
    }
    Ok(tree)
}
