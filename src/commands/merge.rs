use super::log_progress;
use crate::ops::{self, MergeOutcome};
use crate::pdf::LopdfLibrary;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(inputs: &[P], output: Q) -> Result<()> {
    let outcome = ops::merge_files(
        &LopdfLibrary,
        inputs,
        output.as_ref(),
        &mut log_progress,
    )?;
    report(&outcome, output.as_ref());
    Ok(())
}

pub fn run_folder<P: AsRef<Path>, Q: AsRef<Path>>(folder: P, output: Q) -> Result<()> {
    let outcome = ops::merge_folder(
        &LopdfLibrary,
        folder.as_ref(),
        output.as_ref(),
        &mut log_progress,
    )?;
    report(&outcome, output.as_ref());
    Ok(())
}

fn report(outcome: &MergeOutcome, output: &Path) {
    println!(
        "Merged {} files ({} pages) into {}",
        outcome.files,
        outcome.pages,
        output.display()
    );
}
