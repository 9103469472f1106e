//! Configuration handles.
//!
//! A [`Conf`] pairs a decoded tree with the path it was loaded from. Handles
//! are cheap to clone and sections are views into the parent's tree, so
//! neither copies configuration data.

mod path;
mod typed;

use crate::error::{ConfError, Result};
use crate::value::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

static EMPTY: Map = Map::new();

/// A loaded configuration tree and the path it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Conf {
    /// File path or store key of the originating document
    path: PathBuf,
    /// Root of the tree, always an object
    root: Value,
}

impl Conf {
    pub(crate) fn new(path: PathBuf, map: Map) -> Self {
        Self {
            path,
            root: Value::object(map),
        }
    }

    /// An empty configuration attributed to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), Map::new())
    }

    /// Path of the document this configuration was loaded from.
    ///
    /// For sections this is the path of the enclosing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The root mapping.
    pub fn content(&self) -> &Map {
        self.root.as_object().unwrap_or(&EMPTY)
    }

    /// The root mapping as a value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Resolve a key path such as `http.ports[0]`.
    ///
    /// The empty key resolves to the whole tree.
    pub fn get(&self, key: &str) -> Option<&Value> {
        path::resolve(&self.root, key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// A view of the mapping at `key`, sharing this configuration's tree.
    pub fn section(&self, key: &str) -> Result<Conf> {
        match self.get(key) {
            Some(Value::Object(map)) => Ok(Self {
                path: self.path.clone(),
                root: Value::Object(Arc::clone(map)),
            }),
            _ => Err(ConfError::SectionNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// Take the root mapping, cloning it only if it is shared.
    pub(crate) fn into_map(self) -> Map {
        match self.root {
            Value::Object(map) => Arc::unwrap_or_clone(map),
            _ => Map::new(),
        }
    }
}
