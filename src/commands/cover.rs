use super::log_progress;
use crate::ops;
use crate::pdf::LopdfLibrary;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(cover: P, body: P, output: Q) -> Result<()> {
    let outcome = ops::add_cover(
        &LopdfLibrary,
        cover.as_ref(),
        body.as_ref(),
        output.as_ref(),
        &mut log_progress,
    )?;

    println!(
        "Added cover; {} pages written to {}",
        outcome.pages,
        output.as_ref().display()
    );

    Ok(())
}
