use super::require_destination;
use crate::error::Result;
use crate::library::{write_atomically, DocumentLibrary, Progress};
use std::io::Write;
use std::path::Path;

/// Write the text of every page, each followed by a newline, to `dest`.
///
/// Returns the number of pages read.
pub fn extract_text<L: DocumentLibrary>(
    lib: &L,
    source: &Path,
    dest: &Path,
    progress: &mut dyn Progress,
) -> Result<u32> {
    require_destination(dest)?;

    let doc = lib.open(source)?;
    let total = lib.page_count(&doc);

    let mut text = String::new();
    for page in 0..total {
        text.push_str(&lib.extract_page_text(&doc, page)?);
        text.push('\n');
        progress.step(page as usize + 1, total as usize, "page");
    }

    write_atomically(dest, |file| Ok(file.write_all(text.as_bytes())?))?;

    log::info!(
        "extracted text of {} page(s) from {} to {}",
        total,
        source.display(),
        dest.display()
    );
    Ok(total)
}
