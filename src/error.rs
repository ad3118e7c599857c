//! Error types for page operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for page operations.
pub type Result<T> = std::result::Result<T, EditError>;

/// Everything that can stop a page operation.
#[derive(Error, Debug)]
pub enum EditError {
    /// No page expression was given at all.
    #[error("No page expression given")]
    EmptyExpression,

    /// A token could not be read as a page number or range.
    #[error("Malformed page entry: '{fragment}'")]
    Malformed { fragment: String },

    /// A range whose start lies after its end, e.g. `3-1`.
    #[error("Reversed page range: {start}-{end}")]
    ReversedRange { start: u64, end: u64 },

    /// The expression parsed, but none of its pages exist in the document.
    #[error("No valid pages in expression")]
    NoValidPages,

    /// Directive text contained neither a delete nor a reorder section.
    #[error("Nothing to do: directive has no delete or reorder section")]
    NothingToDo,

    /// Every page was deleted.
    #[error("No pages remain after editing")]
    NoPagesRemain,

    /// A reorder entry names a position that is not currently shown.
    #[error("Reorder page {page} does not exist (only {available} page(s) remain)")]
    ReorderOutOfRange { page: i64, available: usize },

    /// A reorder list omits or repeats one of the remaining pages.
    #[error("Reorder list must name each of the {expected} remaining page(s) exactly once")]
    IncompletePermutation { expected: usize },

    /// Merging needs at least two documents.
    #[error("At least two PDF files are needed, got {found}")]
    NotEnoughInputs { found: usize },

    /// No output path was supplied.
    #[error("No destination path given")]
    MissingDestination,

    /// Folder discovery found nothing to merge.
    #[error("No PDF files found under {}", .0.display())]
    NoPdfFound(PathBuf),

    /// Decryption was refused.
    #[error("Wrong password")]
    WrongPassword,

    /// The document library failed on a file.
    #[error("{context}: {message}")]
    Library { context: String, message: String },

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Coarse classification of [`EditError`], for callers that branch on the
/// kind of failure rather than on the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    OutOfRange,
    EmptyResult,
    IncompletePermutation,
    External,
}

impl EditError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditError::EmptyExpression
            | EditError::Malformed { .. }
            | EditError::ReversedRange { .. }
            | EditError::MissingDestination
            | EditError::NotEnoughInputs { .. } => ErrorKind::MalformedInput,
            EditError::ReorderOutOfRange { .. } => ErrorKind::OutOfRange,
            EditError::NoValidPages
            | EditError::NothingToDo
            | EditError::NoPagesRemain
            | EditError::NoPdfFound(_) => ErrorKind::EmptyResult,
            EditError::IncompletePermutation { .. } => ErrorKind::IncompletePermutation,
            EditError::WrongPassword | EditError::Library { .. } | EditError::Io(_) => {
                ErrorKind::External
            }
        }
    }

    pub(crate) fn malformed(fragment: &str) -> Self {
        EditError::Malformed {
            fragment: fragment.to_string(),
        }
    }

    pub(crate) fn library(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        EditError::Library {
            context: context.into(),
            message: err.to_string(),
        }
    }
}
