use super::require_destination;
use crate::error::Result;
use crate::library::DocumentLibrary;
use crate::page_range::{parse_page_ranges, ParsedRange};
use std::path::Path;

/// Copy the pages named by a range expression, in ascending order, into a
/// new document at `dest`.
pub fn extract_pages<L: DocumentLibrary>(
    lib: &L,
    source: &Path,
    expr: &str,
    dest: &Path,
) -> Result<ParsedRange> {
    require_destination(dest)?;

    let doc = lib.open(source)?;
    let parsed = parse_page_ranges(expr, lib.page_count(&doc))?;

    let mut output = lib.copy_pages(&doc, &parsed.pages)?;
    lib.write(&mut output, dest)?;

    log::info!(
        "extracted {} page(s) from {} to {}",
        parsed.pages.len(),
        source.display(),
        dest.display()
    );
    Ok(parsed)
}
