//! Forms directory fixtures.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

/// Body written into fixture forms.
pub const FIXTURE_FORM_BODY: &[u8] = b"<h:html><h:head><h:title>fixture</h:title></h:head></h:html>";

/// Create a temporary forms directory containing `names`.
///
/// # Errors
///
/// Returns an error if the directory or any file cannot be created.
pub fn forms_dir(names: &[&str]) -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix("formdesk-forms-")
        .tempdir()?;
    for name in names {
        write_form(dir.path(), name)?;
    }
    Ok(dir)
}

/// Write a fixture form called `name` into `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_form(dir: &Path, name: &str) -> Result<()> {
    fs::write(dir.join(name), FIXTURE_FORM_BODY)?;
    Ok(())
}
