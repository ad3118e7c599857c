//! The seam between page operations and the PDF library doing the work.

use crate::error::{EditError, Result};
use crate::page_range::{PageIndex, PageSequence};
use std::fs::File;
use std::path::Path;
use tempfile::NamedTempFile;

/// Capabilities page operations need from a PDF library.
///
/// Documents are closed by dropping them.
pub trait DocumentLibrary {
    type Document;

    fn open(&self, path: &Path) -> Result<Self::Document>;

    fn page_count(&self, doc: &Self::Document) -> u32;

    /// New document holding exactly `pages`, in the given order.
    fn copy_pages(&self, doc: &Self::Document, pages: &PageSequence) -> Result<Self::Document>;

    /// `head` followed by all pages of `tail`.
    fn append_whole(&self, head: Self::Document, tail: Self::Document) -> Result<Self::Document>;

    fn is_encrypted(&self, doc: &Self::Document) -> bool;

    /// `Ok(false)` when the password is refused. An error means the password
    /// was accepted but the document could not be made readable.
    fn decrypt(&self, doc: &mut Self::Document, password: &str) -> Result<bool>;

    fn extract_page_text(&self, doc: &Self::Document, page: PageIndex) -> Result<String>;

    fn write(&self, doc: &mut Self::Document, path: &Path) -> Result<()>;
}

/// Receives one call per processed unit of work (page or file).
pub trait Progress {
    fn step(&mut self, current: usize, total: usize, label: &str);
}

impl<F: FnMut(usize, usize, &str)> Progress for F {
    fn step(&mut self, current: usize, total: usize, label: &str) {
        self(current, total, label)
    }
}

/// Ignores progress.
pub struct NoProgress;

impl Progress for NoProgress {
    fn step(&mut self, _current: usize, _total: usize, _label: &str) {}
}

/// Write `dest` through a temporary file in the same directory, so a failure
/// part-way never leaves a truncated output behind.
pub fn write_atomically<F>(dest: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(dest).map_err(|e| EditError::Io(e.error))?;
    Ok(())
}
