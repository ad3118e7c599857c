use super::log_progress;
use crate::ops;
use crate::pdf::LopdfLibrary;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    let pages = ops::extract_text(
        &LopdfLibrary,
        input.as_ref(),
        output.as_ref(),
        &mut log_progress,
    )?;

    println!(
        "Extracted text of {} page(s) to {}",
        pages,
        output.as_ref().display()
    );

    Ok(())
}
