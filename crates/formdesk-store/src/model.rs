//! Listing snapshot handed to the surface.

use serde::{Deserialize, Serialize};

/// Ordered form names as of the last refresh.
///
/// Rebuilt wholesale on every listing and never patched in place, so it can go
/// stale as soon as something else touches the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListSnapshot {
    names: Vec<String>,
}

impl FileListSnapshot {
    /// Wrap an already ordered list of names.
    #[must_use]
    pub const fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Names in display order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Whether `name` was present at snapshot time.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|entry| entry == name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the snapshot has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Consume the snapshot into its names.
    #[must_use]
    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}
