use super::{require_destination, OperationContext};
use crate::directive::{split_directive, Markers};
use crate::error::{EditError, Result};
use crate::library::DocumentLibrary;
use crate::page_range::PageSequence;
use crate::transform::{apply_delete, apply_reorder};
use std::path::Path;

/// Outcome of applying a delete/reorder directive to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPlan {
    /// Source pages to emit, in output order.
    pub pages: PageSequence,
    /// How many pages the delete step removed.
    pub deleted: usize,
    /// Delete entries that named pages outside the document.
    pub skipped: Vec<i64>,
}

/// Run the directive against a document of `total_pages` pages: delete
/// first, then reorder what is left.
pub fn plan_directive(text: &str, markers: &Markers, total_pages: u32) -> Result<EditPlan> {
    let directive = split_directive(text, markers);
    if directive.is_empty() {
        return Err(EditError::NothingToDo);
    }

    let mut plan = EditPlan {
        pages: PageSequence::identity(total_pages),
        deleted: 0,
        skipped: Vec::new(),
    };

    if let Some(expr) = directive.delete.filter(|e| !e.is_empty()) {
        let deletion = apply_delete(&plan.pages, expr, total_pages)?;
        plan.deleted = plan.pages.len() - deletion.kept.len();
        plan.pages = deletion.kept;
        plan.skipped = deletion.skipped;
        log::debug!("{} page(s) deleted", plan.deleted);
    }

    if let Some(expr) = directive.reorder.filter(|e| !e.is_empty()) {
        plan.pages = apply_reorder(&plan.pages, expr)?;
        log::debug!("pages reordered to {}", plan.pages);
    }

    if plan.pages.is_empty() {
        return Err(EditError::NoPagesRemain);
    }
    Ok(plan)
}

/// Work out the pages a directive would produce, without writing anything.
pub fn plan_edit<L: DocumentLibrary>(
    lib: &L,
    source: &Path,
    text: &str,
    markers: &Markers,
) -> Result<EditPlan> {
    let ctx = OperationContext::open(lib, source, text)?;
    plan_directive(&ctx.directive, markers, ctx.total_pages)
}

/// Apply a delete/reorder directive and write the result to `dest`.
pub fn edit_pages<L: DocumentLibrary>(
    lib: &L,
    source: &Path,
    text: &str,
    markers: &Markers,
    dest: &Path,
) -> Result<EditPlan> {
    require_destination(dest)?;

    let ctx = OperationContext::open(lib, source, text)?;
    let plan = plan_directive(&ctx.directive, markers, ctx.total_pages)?;

    let mut output = lib.copy_pages(&ctx.document, &plan.pages)?;
    lib.write(&mut output, dest)?;

    log::info!(
        "wrote {} of {} page(s) from {} to {}",
        plan.pages.len(),
        ctx.total_pages,
        source.display(),
        dest.display()
    );
    Ok(plan)
}
