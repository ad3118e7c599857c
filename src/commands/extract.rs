use crate::ops;
use crate::pdf::LopdfLibrary;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, pages: &str, output: Q) -> Result<()> {
    let parsed = ops::extract_pages(&LopdfLibrary, input.as_ref(), pages, output.as_ref())?;

    for token in &parsed.dropped {
        println!("Skipped '{}': outside the document", token);
    }
    println!(
        "Extracted {} page(s) to {}",
        parsed.pages.len(),
        output.as_ref().display()
    );

    Ok(())
}
