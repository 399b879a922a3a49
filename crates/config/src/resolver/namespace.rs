//! The single namespace shared by every template and instance.

use std::collections::HashMap;

use crate::error::{ConfigError, NamespaceKind, Result};

/// Name to kind map; a name may be registered once, whatever its kind.
#[derive(Debug, Default)]
pub(crate) struct Namespace {
    names: HashMap<String, NamespaceKind>,
}

impl Namespace {
    pub(crate) fn register(&mut self, name: &str, kind: NamespaceKind) -> Result<()> {
        if let Some(existing) = self.names.get(name) {
            return Err(ConfigError::NameCollision {
                name: name.to_owned(),
                existing: *existing,
                requested: kind,
            });
        }
        self.names.insert(name.to_owned(), kind);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}
