use anyhow::{Context, Result};
use lopdf::Document;

/// Text of every page of `doc`, in page order.
///
/// pdf-extract separates pages with form feeds; when that split does not
/// line up with the page count, fall back to lopdf's per-page extraction.
pub fn page_texts(doc: &Document) -> Result<Vec<String>> {
    let total = doc.get_pages().len();

    let mut bytes = Vec::new();
    doc.clone()
        .save_to(&mut bytes)
        .context("Failed to serialize PDF for text extraction")?;

    match pdf_extract::extract_text_from_mem(&bytes) {
        Ok(full_text) => {
            let mut pages: Vec<String> = full_text.split('\x0C').map(str::to_string).collect();
            if pages.len() == total + 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
                pages.pop();
            }
            if pages.len() == total {
                return Ok(pages);
            }
            log::debug!(
                "pdf-extract returned {} page break(s) for {} page(s), extracting per page",
                pages.len(),
                total
            );
        }
        Err(e) => log::debug!("pdf-extract failed ({}), extracting per page", e),
    }

    (1..=total as u32)
        .map(|page| {
            doc.extract_text(&[page])
                .with_context(|| format!("Failed to extract text from page {}", page))
        })
        .collect()
}
