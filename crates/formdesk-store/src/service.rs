//! Directory-backed form store.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::model::FileListSnapshot;

/// Lists and deletes form files inside a single configured directory.
///
/// The store keeps no state besides the directory path; every call goes back
/// to the filesystem, which is treated as shared with other writers.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Bind the store to `directory`. The directory does not need to exist yet.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Directory the store operates on.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Create the directory (and parents) if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_directory(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.directory).map_err(|source| StoreError::Io {
            operation: "ensure_directory",
            path: self.directory.clone(),
            source,
        })
    }

    /// List form names in lexicographic order.
    ///
    /// An absent directory lists as empty. Hidden entries and anything that is
    /// not a regular file are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn list(&self) -> StoreResult<FileListSnapshot> {
        let metadata = match fs::metadata(&self.directory) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(directory = %self.directory.display(), "forms directory absent; listing empty");
                return Ok(FileListSnapshot::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    operation: "list.metadata",
                    path: self.directory.clone(),
                    source,
                });
            }
        };
        if !metadata.is_dir() {
            return Err(StoreError::NotDirectory {
                path: self.directory.clone(),
            });
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| StoreError::Walk {
                path: self.directory.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                warn!(path = %entry.path().display(), "skipping form with non-utf8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            names.push(name.to_string());
        }

        debug!(directory = %self.directory.display(), count = names.len(), "listed forms");
        Ok(FileListSnapshot::new(names))
    }

    /// Remove the form called `name`, reporting whether a file was removed.
    ///
    /// A missing file, a name that is not a single path component, or any IO
    /// failure all report `false`; the caller re-lists to learn the truth.
    #[must_use]
    pub fn delete(&self, name: &str) -> bool {
        if !is_plain_name(name) {
            warn!(name, "refusing to delete form with unsafe name");
            return false;
        }
        let path = self.directory.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "form deleted");
                true
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "form already absent");
                false
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "form deletion failed");
                false
            }
        }
    }
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    fn forms_dir(names: &[&str]) -> Result<TempDir> {
        let dir = tempfile::Builder::new().prefix("formdesk-store-").tempdir()?;
        for name in names {
            fs::write(dir.path().join(name), b"<h:html/>")?;
        }
        Ok(dir)
    }

    #[test]
    fn list_returns_sorted_regular_files() -> Result<()> {
        let dir = forms_dir(&["b.xml", "a.xml", ".a.xml.part"])?;
        fs::create_dir(dir.path().join("media"))?;
        let store = FileStore::new(dir.path());

        let snapshot = store.list()?;
        assert_eq!(snapshot.names(), ["a.xml", "b.xml"]);
        Ok(())
    }

    #[test]
    fn list_of_empty_or_absent_directory_is_empty() -> Result<()> {
        let dir = forms_dir(&[])?;
        assert!(FileStore::new(dir.path()).list()?.is_empty());
        assert!(FileStore::new(dir.path().join("missing")).list()?.is_empty());
        Ok(())
    }

    #[test]
    fn list_rejects_file_in_place_of_directory() -> Result<()> {
        let dir = forms_dir(&["not-a-dir"])?;
        let store = FileStore::new(dir.path().join("not-a-dir"));
        let err = store.list().expect_err("file path should not list");
        assert!(matches!(err, StoreError::NotDirectory { .. }));
        Ok(())
    }

    #[test]
    fn delete_removes_form_from_listing() -> Result<()> {
        let dir = forms_dir(&["a.xml", "b.xml"])?;
        let store = FileStore::new(dir.path());

        assert!(store.delete("b.xml"));
        assert_eq!(store.list()?.names(), ["a.xml"]);
        Ok(())
    }

    #[test]
    fn delete_missing_form_reports_false_and_leaves_listing() -> Result<()> {
        let dir = forms_dir(&["a.xml"])?;
        let store = FileStore::new(dir.path());
        let before = store.list()?;

        assert!(!store.delete("missing.xml"));
        assert_eq!(store.list()?, before);
        Ok(())
    }

    #[test]
    fn delete_refuses_names_outside_directory() -> Result<()> {
        let root = forms_dir(&["outside.xml"])?;
        let forms = root.path().join("forms");
        fs::create_dir(&forms)?;
        let store = FileStore::new(&forms);

        assert!(!store.delete("../outside.xml"));
        assert!(!store.delete(""));
        assert!(!store.delete("nested/a.xml"));
        assert!(root.path().join("outside.xml").exists());
        Ok(())
    }

    #[test]
    fn ensure_directory_creates_missing_path() -> Result<()> {
        let root = forms_dir(&[])?;
        let store = FileStore::new(root.path().join("odk").join("forms"));
        store.ensure_directory()?;
        assert!(store.directory().is_dir());
        Ok(())
    }
}
