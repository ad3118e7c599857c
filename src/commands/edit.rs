use crate::directive::Markers;
use crate::ops;
use crate::pdf::LopdfLibrary;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    directive: &str,
    markers: &Markers,
    output: Q,
) -> Result<()> {
    let plan = ops::edit_pages(
        &LopdfLibrary,
        input.as_ref(),
        directive,
        markers,
        output.as_ref(),
    )?;

    for page in &plan.skipped {
        println!("Skipped page {}: outside the document", page);
    }
    println!(
        "Deleted {} page(s); wrote pages {} to {}",
        plan.deleted,
        plan.pages,
        output.as_ref().display()
    );

    Ok(())
}
