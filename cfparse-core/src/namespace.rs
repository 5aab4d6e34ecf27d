//! Module namespaces.
//!
//! The front-end only stamps nodes with the namespace they were parsed in;
//! type definition and lookup belong to the engine that consumes the AST.

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

const ROOT_NAME: &str = "__root__";

/// A node in the module tree. `std::net` is `net` with parent `std`,
/// whose parent is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    name: String,
    parent: Option<Arc<Namespace>>,
}

impl Namespace {
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            name: ROOT_NAME.to_string(),
            parent: None,
        })
    }

    pub fn child(parent: &Arc<Self>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: Some(parent.clone()),
        })
    }

    /// Build the chain for a `::`-separated module path under a fresh root.
    pub fn from_path(path: &str) -> Arc<Self> {
        path.split("::")
            .filter(|part| !part.is_empty())
            .fold(Self::root(), |parent, part| Self::child(&parent, part))
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<Namespace>> {
        self.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Segments from the top-level module down to this one (root excluded).
    pub fn to_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = Some(self);
        while let Some(ns) = current {
            if ns.is_root() {
                break;
            }
            path.push(ns.name.as_str());
            current = ns.parent.as_deref();
        }
        path.reverse();
        path
    }

    pub fn get_full_name(&self) -> String {
        self.to_path().join("::")
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_full_name())
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.get_full_name())
    }
}
