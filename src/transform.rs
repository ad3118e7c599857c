use crate::error::{EditError, Result};
use crate::page_range::{PageIndex, PageSequence};
use std::collections::HashSet;
use std::num::IntErrorKind;

/// Result of removing pages from a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    /// Remaining pages, in their previous order.
    pub kept: PageSequence,
    /// Requested page numbers that do not exist in the document.
    pub skipped: Vec<i64>,
}

/// An integer token. Values beyond `i64` saturate, so they count as out of
/// range rather than malformed.
fn parse_number(token: &str) -> Result<i64> {
    match token.parse::<i64>() {
        Ok(n) => Ok(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(EditError::malformed(token)),
        },
    }
}

/// Remove the 1-based pages listed in `expr` (e.g. "2,4") from `all`.
///
/// A non-numeric entry aborts immediately. Numbers outside
/// `1..=total_pages` are skipped.
pub fn apply_delete(all: &PageSequence, expr: &str, total_pages: u32) -> Result<Deletion> {
    let mut deleted = HashSet::new();
    let mut skipped = Vec::new();

    for token in expr.split(',') {
        let token = token.trim();
        let page = parse_number(token)?;

        if (1..=i64::from(total_pages)).contains(&page) {
            deleted.insert((page - 1) as PageIndex);
        } else {
            log::warn!(
                "page {} to delete is outside the document ({} pages), skipping",
                page,
                total_pages
            );
            skipped.push(page);
        }
    }

    let kept = all.iter().filter(|i| !deleted.contains(i)).collect();
    Ok(Deletion {
        kept: PageSequence::from_indices(kept),
        skipped,
    })
}

/// Reorder `kept` by a permutation of its current 1-based positions.
///
/// Position `k` refers to `kept[k - 1]`, not to page `k` of the original
/// document. The list must name every current position exactly once; the
/// first bad entry is reported and nothing is reordered.
pub fn apply_reorder(kept: &PageSequence, expr: &str) -> Result<PageSequence> {
    let current = kept.as_slice();
    let mut order = Vec::with_capacity(current.len());

    for token in expr.split(',') {
        let token = token.trim();
        let position = parse_number(token)?;

        let index = usize::try_from(position)
            .ok()
            .and_then(|p| p.checked_sub(1))
            .and_then(|p| current.get(p))
            .ok_or(EditError::ReorderOutOfRange {
                page: position,
                available: current.len(),
            })?;
        order.push(*index);
    }

    let distinct: HashSet<PageIndex> = order.iter().copied().collect();
    if order.len() != current.len() || distinct.len() != current.len() {
        return Err(EditError::IncompletePermutation {
            expected: current.len(),
        });
    }

    Ok(PageSequence::from_indices(order))
}
