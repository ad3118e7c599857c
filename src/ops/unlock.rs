use super::require_destination;
use crate::error::{EditError, Result};
use crate::library::DocumentLibrary;
use crate::page_range::PageSequence;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The decrypted copy was written.
    Unlocked { pages: u32 },
    /// The source has no encryption; nothing was written.
    NotEncrypted,
}

/// Decrypt `source` with `password` and save an unencrypted copy to `dest`.
pub fn unlock<L: DocumentLibrary>(
    lib: &L,
    source: &Path,
    password: &str,
    dest: &Path,
) -> Result<UnlockOutcome> {
    require_destination(dest)?;

    let mut doc = lib.open(source)?;
    if !lib.is_encrypted(&doc) {
        log::info!("{} is not encrypted", source.display());
        return Ok(UnlockOutcome::NotEncrypted);
    }
    if !lib.decrypt(&mut doc, password)? {
        return Err(EditError::WrongPassword);
    }

    let pages = lib.page_count(&doc);
    let mut output = lib.copy_pages(&doc, &PageSequence::identity(pages))?;
    lib.write(&mut output, dest)?;

    log::info!("unlocked {} into {}", source.display(), dest.display());
    Ok(UnlockOutcome::Unlocked { pages })
}
