use super::require_destination;
use crate::error::{EditError, Result};
use crate::library::{DocumentLibrary, Progress};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub files: usize,
    pub pages: u32,
}

/// Concatenate whole documents in the order given.
pub fn merge_files<L, P>(
    lib: &L,
    inputs: &[P],
    dest: &Path,
    progress: &mut dyn Progress,
) -> Result<MergeOutcome>
where
    L: DocumentLibrary,
    P: AsRef<Path>,
{
    let [first, rest @ ..] = inputs else {
        return Err(EditError::NotEnoughInputs { found: 0 });
    };
    if rest.is_empty() {
        return Err(EditError::NotEnoughInputs { found: 1 });
    }
    require_destination(dest)?;

    let total = inputs.len();
    progress.step(1, total, &first.as_ref().display().to_string());
    let mut merged = lib.open(first.as_ref())?;

    for (n, input) in rest.iter().enumerate() {
        let input = input.as_ref();
        progress.step(n + 2, total, &input.display().to_string());
        let doc = lib.open(input)?;
        merged = lib.append_whole(merged, doc)?;
    }

    let pages = lib.page_count(&merged);
    lib.write(&mut merged, dest)?;

    log::info!(
        "merged {} file(s), {} page(s), into {}",
        total,
        pages,
        dest.display()
    );
    Ok(MergeOutcome {
        files: total,
        pages,
    })
}

/// Merge every PDF found under `folder`, in path order.
pub fn merge_folder<L: DocumentLibrary>(
    lib: &L,
    folder: &Path,
    dest: &Path,
    progress: &mut dyn Progress,
) -> Result<MergeOutcome> {
    let files = find_pdf_files(folder)?;
    if files.is_empty() {
        return Err(EditError::NoPdfFound(folder.to_path_buf()));
    }
    log::info!("found {} PDF file(s) under {}", files.len(), folder.display());
    merge_files(lib, &files, dest, progress)
}

/// Put `cover` in front of `body`.
pub fn add_cover<L: DocumentLibrary>(
    lib: &L,
    cover: &Path,
    body: &Path,
    dest: &Path,
    progress: &mut dyn Progress,
) -> Result<MergeOutcome> {
    merge_files(lib, &[cover, body], dest, progress)
}

/// All `.pdf` files (any case) below `folder`, sorted by path.
pub fn find_pdf_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(io::Error::from)?;
        let is_pdf = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_pdf {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::fake::{FakeDoc, FakeLibrary};
    use crate::library::NoProgress;
    use std::fs;

    fn library() -> FakeLibrary {
        FakeLibrary::with(&[
            ("a.pdf", FakeDoc::new(&["a1", "a2"])),
            ("b.pdf", FakeDoc::new(&["b1"])),
            ("c.pdf", FakeDoc::new(&["c1", "c2", "c3"])),
        ])
    }

    #[test]
    fn test_merge_keeps_input_order() {
        let lib = library();
        let outcome =
            merge_files(&lib, &["a.pdf", "b.pdf"], Path::new("ab.pdf"), &mut NoProgress).unwrap();
        assert_eq!(outcome, MergeOutcome { files: 2, pages: 3 });
        merge_files(&lib, &["b.pdf", "a.pdf"], Path::new("ba.pdf"), &mut NoProgress).unwrap();

        assert_eq!(lib.pages_of("ab.pdf").unwrap(), vec!["a1", "a2", "b1"]);
        assert_eq!(lib.pages_of("ba.pdf").unwrap(), vec!["b1", "a1", "a2"]);
    }

    #[test]
    fn test_merge_reports_each_file() {
        let lib = library();
        let mut seen = Vec::new();
        let mut progress = |current: usize, total: usize, label: &str| {
            seen.push(format!("{}/{} {}", current, total, label));
        };
        merge_files(
            &lib,
            &["a.pdf", "b.pdf", "c.pdf"],
            Path::new("abc.pdf"),
            &mut progress,
        )
        .unwrap();
        assert_eq!(seen, vec!["1/3 a.pdf", "2/3 b.pdf", "3/3 c.pdf"]);
    }

    #[test]
    fn test_merge_needs_two_inputs() {
        let lib = library();
        let err = merge_files(&lib, &["a.pdf"], Path::new("out.pdf"), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, EditError::NotEnoughInputs { found: 1 }));
        let none: [&str; 0] = [];
        let err = merge_files(&lib, &none, Path::new("out.pdf"), &mut NoProgress).unwrap_err();
        assert!(matches!(err, EditError::NotEnoughInputs { found: 0 }));
        assert!(lib.written.borrow().is_empty());
    }

    #[test]
    fn test_merge_needs_destination() {
        let lib = library();
        let err = merge_files(&lib, &["a.pdf", "b.pdf"], Path::new(""), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, EditError::MissingDestination));
    }

    #[test]
    fn test_merge_unreadable_input_writes_nothing() {
        let lib = library();
        let err = merge_files(
            &lib,
            &["a.pdf", "missing.pdf"],
            Path::new("out.pdf"),
            &mut NoProgress,
        )
        .unwrap_err();
        assert!(matches!(err, EditError::Library { .. }));
        assert!(lib.written.borrow().is_empty());
    }

    #[test]
    fn test_cover_goes_first() {
        let lib = library();
        add_cover(
            &lib,
            Path::new("b.pdf"),
            Path::new("c.pdf"),
            Path::new("covered.pdf"),
            &mut NoProgress,
        )
        .unwrap();
        assert_eq!(
            lib.pages_of("covered.pdf").unwrap(),
            vec!["b1", "c1", "c2", "c3"]
        );
    }

    #[test]
    fn test_find_pdf_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        for name in ["b.pdf", "A.PDF", "notes.txt", "sub/c.pdf", "sub/readme"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let files = find_pdf_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("A.PDF"),
                PathBuf::from("b.pdf"),
                PathBuf::from("sub").join("c.pdf"),
            ]
        );
    }

    #[test]
    fn test_merge_folder_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("2.pdf");
        let first = dir.path().join("1.pdf");
        fs::write(&second, b"").unwrap();
        fs::write(&first, b"").unwrap();

        let lib = FakeLibrary::default();
        lib.files
            .borrow_mut()
            .insert(second.clone(), FakeDoc::new(&["two"]));
        lib.files
            .borrow_mut()
            .insert(first.clone(), FakeDoc::new(&["one"]));

        let outcome =
            merge_folder(&lib, dir.path(), Path::new("all.pdf"), &mut NoProgress).unwrap();
        assert_eq!(outcome.files, 2);
        assert_eq!(lib.pages_of("all.pdf").unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_merge_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        let lib = FakeLibrary::default();
        let err = merge_folder(&lib, dir.path(), Path::new("all.pdf"), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, EditError::NoPdfFound(_)));
    }
}
