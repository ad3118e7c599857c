use crate::error::{EditError, Result};
use crate::library::{write_atomically, DocumentLibrary};
use crate::page_range::{PageIndex, PageSequence};
use lopdf::encryption::DecryptionError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use regex::bytes::Regex;
use std::cell::OnceCell;
use std::path::Path;
use std::sync::LazyLock;

/// Page attributes a page may take from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page trees deeper than this are treated as cyclic.
const MAX_TREE_DEPTH: usize = 64;

/// `/Encrypt` as a dictionary key, not as the prefix of `/EncryptMetadata`.
static ENCRYPT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)/Encrypt(?:[\x00\t\n\x0C\r ()<>\[\]{}/%]|\z)")
        .expect("encrypt key pattern is valid")
});

/// Same length as `/Encrypt`, so xref offsets stay valid.
const HIDDEN_ENCRYPT_KEY: &[u8] = b"/NoCrypt";

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
    /// Raw file, kept while the objects still wait for a password to be parsed
    locked: Option<Vec<u8>>,
    page_texts: OnceCell<Vec<String>>,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let context = || format!("Failed to open PDF: {}", path_str);
        let bytes = std::fs::read(&path).map_err(|e| EditError::library(context(), e))?;
        let doc = Document::load_mem(&bytes).map_err(|e| EditError::library(context(), e))?;

        let mut pdf = PdfDocument::new(doc, path_str);
        // lopdf only tries the empty password while loading
        if pdf.doc.is_encrypted() && pdf.doc.encryption_state.is_none() {
            log::debug!("{} needs a password before its pages can be read", pdf.path);
            pdf.locked = Some(bytes);
        }
        Ok(pdf)
    }

    pub fn new(doc: Document, path: String) -> Self {
        PdfDocument {
            doc,
            path,
            locked: None,
            page_texts: OnceCell::new(),
        }
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Page object IDs in page order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// Copy the given pages, in the given order, to a new document
    pub fn extract_pages(&self, pages: &PageSequence) -> Result<PdfDocument> {
        let all_pages = self.page_ids();
        let total = all_pages.len();

        let ordered = pages
            .iter()
            .map(|i| {
                all_pages.get(i as usize).copied().ok_or_else(|| {
                    EditError::library(
                        self.path.clone(),
                        format!("Page {} is out of range (1-{})", i + 1, total),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut new_doc = self.doc.clone();
        let pages_id = root_pages_id(&new_doc).map_err(|e| self.error(e))?;
        for &page_id in &ordered {
            pull_inherited_attributes(&mut new_doc, page_id).map_err(|e| self.error(e))?;
        }
        set_page_tree(&mut new_doc, pages_id, &ordered).map_err(|e| self.error(e))?;
        new_doc.prune_objects();

        Ok(PdfDocument::new(new_doc, self.path.clone()))
    }

    /// All pages of `self` followed by all pages of `tail`
    pub fn append(self, tail: PdfDocument) -> Result<PdfDocument> {
        let path = format!("{} + {}", self.path, tail.path);
        let mut merged = Document::with_version("1.5");
        let mut ordered = Vec::new();

        for part in [self, tail] {
            let mut doc = part.doc;
            doc.renumber_objects_with(merged.max_id + 1);

            let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
            for &page_id in &page_ids {
                pull_inherited_attributes(&mut doc, page_id)
                    .map_err(|e| EditError::library(part.path.clone(), e))?;
            }

            let highest = doc.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
            merged.max_id = merged.max_id.max(highest);
            merged.objects.extend(doc.objects);
            ordered.extend(page_ids);
        }

        let pages_id = merged.new_object_id();
        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        merged.objects.insert(pages_id, Object::Dictionary(pages_dict));
        set_page_tree(&mut merged, pages_id, &ordered)
            .map_err(|e| EditError::library(path.clone(), e))?;

        let catalog_id = merged.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        merged.trailer.set("Root", Object::Reference(catalog_id));
        merged.prune_objects();

        Ok(PdfDocument::new(merged, path))
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Try `password`; `Ok(false)` means it was refused. On success the
    /// document is fully readable and no longer carries encryption.
    pub fn decrypt(&mut self, password: &str) -> Result<bool> {
        match self.doc.authenticate_password(password) {
            Ok(()) => {}
            Err(lopdf::Error::Decryption(DecryptionError::IncorrectPassword)) => {
                log::debug!("password refused for {}", self.path);
                return Ok(false);
            }
            Err(e) => return Err(self.error(e)),
        }

        if let Some(bytes) = self.locked.take() {
            let encrypt_id = self
                .doc
                .trailer
                .get(b"Encrypt")
                .and_then(Object::as_reference)
                .map_err(|e| self.error(e))?;
            self.doc = load_locked(&bytes, encrypt_id, password).map_err(|e| self.error(e))?;
        } else if self.doc.encryption_state.is_some() {
            // Objects were already decrypted with the empty user password
            if let Some(Ok(id)) = self.doc.trailer.remove(b"Encrypt").map(|o| o.as_reference()) {
                self.doc.objects.remove(&id);
            }
        } else {
            return Err(self.error("encrypted objects were never loaded"));
        }
        self.doc.encryption_state = None;
        self.page_texts = OnceCell::new();

        if self.page_count() == 0 {
            return Err(self.error("no pages could be read after decryption"));
        }
        Ok(true)
    }

    /// Text of one page, extracted once per document
    pub fn page_text(&self, page: PageIndex) -> Result<String> {
        if self.page_texts.get().is_none() {
            let texts = super::text::page_texts(&self.doc)
                .map_err(|e| self.error(format!("{:#}", e)))?;
            let _ = self.page_texts.set(texts);
        }
        self.page_texts
            .get()
            .and_then(|texts| texts.get(page as usize))
            .cloned()
            .ok_or_else(|| {
                EditError::library(
                    self.path.clone(),
                    format!("Page {} is out of range (1-{})", page + 1, self.page_count()),
                )
            })
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        write_atomically(path, |file| {
            self.doc.save_to(file).map_err(|e| {
                EditError::library(format!("Failed to save PDF: {}", path.display()), e)
            })
        })
    }

    fn error(&self, err: impl std::fmt::Display) -> EditError {
        EditError::library(self.path.clone(), err)
    }
}

/// Load a document whose objects can only be parsed with `password`.
///
/// The trailer's `/Encrypt` key is renamed in a copy of the file so lopdf
/// loads the objects still encrypted, then lopdf decrypts them in place.
fn load_locked(bytes: &[u8], encrypt_id: ObjectId, password: &str) -> lopdf::Result<Document> {
    let mut hidden = bytes.to_vec();
    for m in ENCRYPT_KEY.find_iter(bytes) {
        hidden[m.start()..m.start() + HIDDEN_ENCRYPT_KEY.len()].copy_from_slice(HIDDEN_ENCRYPT_KEY);
    }

    let mut doc = Document::load_mem(&hidden)?;
    doc.trailer.remove(&HIDDEN_ENCRYPT_KEY[1..]);
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    doc.decrypt(password)?;
    Ok(doc)
}

fn root_pages_id(doc: &Document) -> lopdf::Result<ObjectId> {
    doc.catalog()?.get(b"Pages")?.as_reference()
}

/// Copy attributes the page inherits from its ancestors onto the page itself,
/// so it can be re-parented without changing how it renders.
fn pull_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> lopdf::Result<()> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    let mut next = doc
        .get_dictionary(page_id)?
        .get(b"Parent")
        .and_then(Object::as_reference)
        .ok();

    let mut depth = 0;
    while let Some(node_id) = next {
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        for key in INHERITABLE {
            if inherited.iter().all(|(k, _)| *k != key) {
                if let Ok(value) = node.get(key) {
                    inherited.push((key, value.clone()));
                }
            }
        }

        depth += 1;
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        next = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        if !page.has(key) {
            page.set(key.to_vec(), value);
        }
    }
    Ok(())
}

/// Make `pages_id` the single parent of `ordered`, in that order.
fn set_page_tree(doc: &mut Document, pages_id: ObjectId, ordered: &[ObjectId]) -> lopdf::Result<()> {
    for &page_id in ordered {
        doc.get_dictionary_mut(page_id)?
            .set("Parent", Object::Reference(pages_id));
    }

    let kids = ordered.iter().map(|&id| Object::Reference(id)).collect();
    let node = doc.get_dictionary_mut(pages_id)?;
    node.set("Kids", Object::Array(kids));
    node.set("Count", Object::Integer(ordered.len() as i64));
    Ok(())
}

/// [`DocumentLibrary`] backed by lopdf and pdf-extract.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfLibrary;

impl DocumentLibrary for LopdfLibrary {
    type Document = PdfDocument;

    fn open(&self, path: &Path) -> Result<PdfDocument> {
        PdfDocument::open(path)
    }

    fn page_count(&self, doc: &PdfDocument) -> u32 {
        doc.page_count()
    }

    fn copy_pages(&self, doc: &PdfDocument, pages: &PageSequence) -> Result<PdfDocument> {
        doc.extract_pages(pages)
    }

    fn append_whole(&self, head: PdfDocument, tail: PdfDocument) -> Result<PdfDocument> {
        head.append(tail)
    }

    fn is_encrypted(&self, doc: &PdfDocument) -> bool {
        doc.is_encrypted()
    }

    fn decrypt(&self, doc: &mut PdfDocument, password: &str) -> Result<bool> {
        doc.decrypt(password)
    }

    fn extract_page_text(&self, doc: &PdfDocument, page: PageIndex) -> Result<String> {
        doc.page_text(page)
    }

    fn write(&self, doc: &mut PdfDocument, path: &Path) -> Result<()> {
        doc.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Markers;
    use crate::library::NoProgress;
    use crate::ops;
    use lopdf::{content::Content, content::Operation, Stream};

    /// In-memory PDF whose page `i` draws the text "{prefix}{i}".
    fn create_test_pdf(prefix: &str, num_pages: u32) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut page_ids = Vec::new();
        for i in 0..num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                    ),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("{}{}", prefix, i + 1).into_bytes(),
                            lopdf::StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        // MediaBox only on the root node, so pages inherit it
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc
    }

    fn save_test_pdf(dir: &Path, name: &str, prefix: &str, num_pages: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        create_test_pdf(prefix, num_pages).save(&path).unwrap();
        path
    }

    /// Two-page "P" document encrypted with RC4, saved under `dir`.
    fn save_encrypted_pdf(dir: &Path, name: &str, owner: &str, user: &str) -> std::path::PathBuf {
        let mut doc = create_test_pdf("P", 2);
        doc.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(b"0123456789abcdef".to_vec(), lopdf::StringFormat::Literal),
                Object::String(b"fedcba9876543210".to_vec(), lopdf::StringFormat::Literal),
            ]),
        );
        let version = lopdf::EncryptionVersion::V2 {
            document: &doc,
            owner_password: owner,
            user_password: user,
            key_length: 128,
            permissions: lopdf::Permissions::all(),
        };
        let state = lopdf::EncryptionState::try_from(version).unwrap();
        doc.encrypt(&state).unwrap();

        let path = dir.join(name);
        doc.save(&path).unwrap();
        path
    }

    /// The text each page draws, in page order.
    fn page_labels(doc: &Document) -> Vec<String> {
        doc.get_pages()
            .into_values()
            .map(|page_id| {
                let content = doc.get_page_content(page_id).unwrap();
                let text = String::from_utf8_lossy(&content).to_string();
                let start = text.find('(').unwrap() + 1;
                let end = text.find(')').unwrap();
                text[start..end].to_string()
            })
            .collect()
    }

    #[test]
    fn test_extract_pages_in_given_order() {
        let source = PdfDocument::new(create_test_pdf("P", 5), "test".into());
        let out = source
            .extract_pages(&PageSequence::from_indices(vec![4, 0, 2]))
            .unwrap();
        assert_eq!(out.page_count(), 3);
        assert_eq!(page_labels(&out.doc), vec!["P5", "P1", "P3"]);
    }

    #[test]
    fn test_extracted_pages_keep_inherited_media_box() {
        let source = PdfDocument::new(create_test_pdf("P", 3), "test".into());
        let out = source
            .extract_pages(&PageSequence::from_indices(vec![2]))
            .unwrap();
        let page_id = out.page_ids()[0];
        let page = out.doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
    }

    #[test]
    fn test_extract_page_past_end_fails() {
        let source = PdfDocument::new(create_test_pdf("P", 2), "test".into());
        assert!(source
            .extract_pages(&PageSequence::from_indices(vec![2]))
            .is_err());
    }

    #[test]
    fn test_append_keeps_order() {
        let a = PdfDocument::new(create_test_pdf("A", 2), "a".into());
        let b = PdfDocument::new(create_test_pdf("B", 3), "b".into());
        let merged = a.append(b).unwrap();
        assert_eq!(merged.page_count(), 5);
        assert_eq!(page_labels(&merged.doc), vec!["A1", "A2", "B1", "B2", "B3"]);
    }

    #[test]
    fn test_plain_document_is_not_encrypted() {
        let doc = PdfDocument::new(create_test_pdf("P", 1), "test".into());
        assert!(!doc.is_encrypted());
    }

    #[test]
    fn test_edit_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = save_test_pdf(dir.path(), "in.pdf", "P", 5);
        let dest = dir.path().join("out.pdf");

        let plan = ops::edit_pages(
            &LopdfLibrary,
            &source,
            "delete: 2,4 / reorder: 3,1,2",
            &Markers::ENGLISH,
            &dest,
        )
        .unwrap();
        assert_eq!(plan.pages.as_slice(), &[4, 0, 2]);

        let written = Document::load(&dest).unwrap();
        assert_eq!(page_labels(&written), vec!["P5", "P1", "P3"]);
    }

    #[test]
    fn test_merge_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let a = save_test_pdf(dir.path(), "a.pdf", "A", 1);
        let b = save_test_pdf(dir.path(), "b.pdf", "B", 2);
        let dest = dir.path().join("merged.pdf");

        let outcome = ops::merge_files(&LopdfLibrary, &[&b, &a], &dest, &mut NoProgress).unwrap();
        assert_eq!(outcome.pages, 3);

        let written = Document::load(&dest).unwrap();
        assert_eq!(page_labels(&written), vec!["B1", "B2", "A1"]);
    }

    #[test]
    fn test_unlock_plain_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = save_test_pdf(dir.path(), "in.pdf", "P", 1);
        let dest = dir.path().join("open.pdf");

        let outcome = ops::unlock(&LopdfLibrary, &source, "secret", &dest).unwrap();
        assert_eq!(outcome, ops::UnlockOutcome::NotEncrypted);
        assert!(!dest.exists());
    }

    #[test]
    fn test_unlock_with_user_password() {
        let dir = tempfile::tempdir().unwrap();
        let source = save_encrypted_pdf(dir.path(), "locked.pdf", "owner", "pw");
        let dest = dir.path().join("open.pdf");

        let locked = PdfDocument::open(&source).unwrap();
        assert!(locked.is_encrypted());

        let outcome = ops::unlock(&LopdfLibrary, &source, "pw", &dest).unwrap();
        assert_eq!(outcome, ops::UnlockOutcome::Unlocked { pages: 2 });

        let written = Document::load(&dest).unwrap();
        assert!(!written.is_encrypted());
        assert_eq!(page_labels(&written), vec!["P1", "P2"]);
    }

    #[test]
    fn test_unlock_with_owner_password() {
        let dir = tempfile::tempdir().unwrap();
        let source = save_encrypted_pdf(dir.path(), "locked.pdf", "owner", "");
        let dest = dir.path().join("open.pdf");

        let outcome = ops::unlock(&LopdfLibrary, &source, "owner", &dest).unwrap();
        assert_eq!(outcome, ops::UnlockOutcome::Unlocked { pages: 2 });

        let written = Document::load(&dest).unwrap();
        assert!(!written.is_encrypted());
        assert_eq!(page_labels(&written), vec!["P1", "P2"]);
    }

    #[test]
    fn test_unlock_with_wrong_password() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("open.pdf");

        for (name, user) in [("user.pdf", "pw"), ("owner.pdf", "")] {
            let source = save_encrypted_pdf(dir.path(), name, "owner", user);
            let err = ops::unlock(&LopdfLibrary, &source, "guess", &dest).unwrap_err();
            assert!(matches!(err, EditError::WrongPassword), "{}: {:?}", name, err);
            assert!(!dest.exists());
        }
    }

    #[test]
    fn test_decrypt_without_loaded_objects_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = save_encrypted_pdf(dir.path(), "locked.pdf", "owner", "pw");

        // Built without the raw file, so the objects cannot be reloaded
        let loaded = Document::load(&source).unwrap();
        let mut doc = PdfDocument::new(loaded, "locked".into());
        assert!(matches!(doc.decrypt("pw"), Err(EditError::Library { .. })));
    }

    #[test]
    fn test_failed_save_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing-dir").join("out.pdf");
        let mut doc = PdfDocument::new(create_test_pdf("P", 1), "test".into());
        assert!(doc.save(&dest).is_err());
        assert!(!dest.exists());
    }
}
