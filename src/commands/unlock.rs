use crate::ops::{self, UnlockOutcome};
use crate::pdf::LopdfLibrary;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, password: &str, output: Q) -> Result<()> {
    match ops::unlock(&LopdfLibrary, input.as_ref(), password, output.as_ref())? {
        UnlockOutcome::Unlocked { pages } => println!(
            "Unlocked {} pages to {}",
            pages,
            output.as_ref().display()
        ),
        UnlockOutcome::NotEncrypted => println!(
            "{} is not encrypted; nothing written",
            input.as_ref().display()
        ),
    }

    Ok(())
}
