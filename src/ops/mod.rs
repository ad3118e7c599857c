//! Page operations: each call opens its inputs, validates everything, and
//! writes its output only once the whole result is known.

pub mod edit;
pub mod extract;
pub mod merge;
pub mod text;
pub mod unlock;

pub use edit::{edit_pages, plan_edit};
pub use extract::extract_pages;
pub use merge::{add_cover, merge_files, merge_folder, MergeOutcome};
pub use text::extract_text;
pub use unlock::{unlock, UnlockOutcome};

use crate::error::{EditError, Result};
use crate::library::DocumentLibrary;
use std::path::Path;

/// State owned by a single edit: the open document, its length, and the
/// directive text being applied. Dropped (closing the document) when the
/// operation ends.
pub struct OperationContext<D> {
    pub document: D,
    pub total_pages: u32,
    pub directive: String,
}

impl<D> OperationContext<D> {
    pub fn open<L>(lib: &L, source: &Path, directive: &str) -> Result<Self>
    where
        L: DocumentLibrary<Document = D>,
    {
        let document = lib.open(source)?;
        let total_pages = lib.page_count(&document);
        Ok(OperationContext {
            document,
            total_pages,
            directive: directive.to_string(),
        })
    }
}

fn require_destination(dest: &Path) -> Result<()> {
    if dest.as_os_str().is_empty() {
        return Err(EditError::MissingDestination);
    }
    Ok(())
}
