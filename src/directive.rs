//! Splitting combined delete/reorder instructions such as
//! `"delete: 2,4 / reorder: 3,1,2"` into their two expressions.

/// Literal section labels recognised in directive text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub delete: &'static str,
    pub reorder: &'static str,
    pub separator: &'static str,
}

impl Markers {
    pub const ENGLISH: Markers = Markers {
        delete: "delete:",
        reorder: "reorder:",
        separator: "/",
    };

    pub const KOREAN: Markers = Markers {
        delete: "삭제:",
        reorder: "순서 변경:",
        separator: "/",
    };
}

impl Default for Markers {
    fn default() -> Self {
        Markers::ENGLISH
    }
}

/// The two optional halves of a directive.
///
/// `None` means the section label was absent. A label followed by nothing
/// yields `Some("")`, which is treated as a no-op for that step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directive<'a> {
    pub delete: Option<&'a str>,
    pub reorder: Option<&'a str>,
}

impl Directive<'_> {
    pub fn is_empty(&self) -> bool {
        self.delete.is_none() && self.reorder.is_none()
    }
}

/// Split directive text on the first occurrence of each label.
///
/// The delete expression ends at the first separator, reorder label or
/// repeated delete label after it. The reorder expression runs to the end of
/// the text. Labels are matched literally and case-sensitively.
pub fn split_directive<'a>(text: &'a str, markers: &Markers) -> Directive<'a> {
    let delete_at = text.find(markers.delete);
    let reorder_at = text.find(markers.reorder);

    let delete = delete_at.map(|at| {
        let body = &text[at + markers.delete.len()..];
        let end = [markers.separator, markers.reorder, markers.delete]
            .into_iter()
            .filter_map(|stop| body.find(stop))
            .min()
            .unwrap_or(body.len());
        body[..end].trim()
    });

    let reorder = reorder_at.map(|at| text[at + markers.reorder.len()..].trim());

    Directive { delete, reorder }
}
