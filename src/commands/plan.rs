use crate::directive::Markers;
use crate::ops;
use crate::pdf::LopdfLibrary;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(input: P, directive: &str, markers: &Markers) -> Result<()> {
    let plan = ops::plan_edit(&LopdfLibrary, input.as_ref(), directive, markers)?;

    for page in &plan.skipped {
        println!("Skipped page {}: outside the document", page);
    }
    println!("Pages: {}", plan.pages);
    println!("Count: {} ({} deleted)", plan.pages.len(), plan.deleted);

    Ok(())
}
