use crate::error::{EditError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::num::IntErrorKind;
use std::sync::LazyLock;

/// 0-based position of a page within a document.
pub type PageIndex = u32;

static RANGE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*-\s*(\d+)$").expect("range pattern is valid"));

/// Ordered list of page indices without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSequence(Vec<PageIndex>);

impl PageSequence {
    /// Every page of a document, in document order.
    pub fn identity(total_pages: u32) -> Self {
        PageSequence((0..total_pages).collect())
    }

    /// Callers must guarantee the indices are unique.
    pub(crate) fn from_indices(indices: Vec<PageIndex>) -> Self {
        PageSequence(indices)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[PageIndex] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = PageIndex> + '_ {
        self.0.iter().copied()
    }

    /// 1-based page numbers, as a user would type them.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.0.iter().map(|&i| i + 1).collect()
    }
}

/// Renders the 1-based comma list, which parses back to the same pages.
impl fmt::Display for PageSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, page) in self.page_numbers().into_iter().enumerate() {
            if n > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", page)?;
        }
        Ok(())
    }
}

/// One comma-separated entry of a range expression, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl PageRange {
    /// Parse a page range specification like "7" or "3-5"
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(caps) = RANGE_TOKEN.captures(s) {
            let start = parse_page_number(&caps[1], s)?;
            let end = parse_page_number(&caps[2], s)?;
            if start > end {
                return Err(EditError::ReversedRange { start, end });
            }
            return Ok(PageRange {
                start,
                end: Some(end),
            });
        }

        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            let page = parse_page_number(s, s)?;
            return Ok(PageRange {
                start: page,
                end: None,
            });
        }

        Err(EditError::malformed(s))
    }

    fn last(&self) -> u64 {
        self.end.unwrap_or(self.start)
    }

    /// Add the in-document part of this range to `pages` as 0-based indices.
    ///
    /// Returns true when some of the range fell outside `1..=total_pages`.
    pub fn expand_into(&self, total_pages: u32, pages: &mut BTreeSet<PageIndex>) -> bool {
        let first = self.start.max(1);
        let last = self.last().min(u64::from(total_pages));

        if first <= last {
            // both bounds are <= total_pages here
            pages.extend((first - 1) as u32..last as u32);
        }

        first != self.start || last != self.last()
    }
}

/// Numbers too large for `u64` saturate, so they land past the last page.
fn parse_page_number(digits: &str, token: &str) -> Result<u64> {
    match digits.parse::<u64>() {
        Ok(n) => Ok(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u64::MAX),
        Err(_) => Err(EditError::malformed(token)),
    }
}

/// Pages selected by a range expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRange {
    /// Ascending, deduplicated, all within the document.
    pub pages: PageSequence,
    /// Entries that named pages past the end of the document (or page 0).
    pub dropped: Vec<String>,
}

/// Parse a comma-separated list of pages and ranges like "1,3-5,7".
///
/// One malformed entry rejects the whole expression. Entries that reach
/// outside the document are trimmed to it and reported in
/// [`ParsedRange::dropped`].
pub fn parse_page_ranges(expr: &str, total_pages: u32) -> Result<ParsedRange> {
    if expr.trim().is_empty() {
        return Err(EditError::EmptyExpression);
    }

    let ranges = expr
        .split(',')
        .map(PageRange::parse)
        .collect::<Result<Vec<_>>>()?;

    let mut pages = BTreeSet::new();
    let mut dropped = Vec::new();
    for (range, token) in ranges.iter().zip(expr.split(',')) {
        if range.expand_into(total_pages, &mut pages) {
            let token = token.trim();
            log::warn!(
                "page entry '{}' is outside the document ({} pages), skipping",
                token,
                total_pages
            );
            dropped.push(token.to_string());
        }
    }

    if pages.is_empty() {
        return Err(EditError::NoValidPages);
    }

    Ok(ParsedRange {
        pages: PageSequence(pages.into_iter().collect()),
        dropped,
    })
}
