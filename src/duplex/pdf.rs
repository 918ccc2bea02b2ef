use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::info;

use super::{sequence, CardDocument};
use crate::error::{Error, Result};

/// Attributes a page may inherit from its ancestors in the page tree. Copied onto each page
/// before the tree is flattened.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// A4 in points, for documents that don't say.
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 595, 842];

// guards against cyclic Parent links in broken files
const MAX_TREE_DEPTH: usize = 64;

/// A rendered card PDF, held as a flat list of page objects under the root page tree node.
pub struct PdfCardDocument {
    doc: Document,
    root_pages: ObjectId,
    pages: Vec<ObjectId>,
}

fn inherited(doc: &Document, page: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

impl PdfCardDocument {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_document(Document::load(path)?)
    }

    pub fn from_document(mut doc: Document) -> Result<Self> {
        let root_pages = doc.catalog()?.get(b"Pages")?.as_reference()?;
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        for &page in &pages {
            let attrs: Vec<(&[u8], Object)> = INHERITABLE
                .iter()
                .filter_map(|&key| inherited(&doc, page, key).map(|v| (key, v)))
                .collect();
            let dict = doc.get_object_mut(page)?.as_dict_mut()?;
            for (key, value) in attrs {
                dict.set(key, value);
            }
            dict.set("Parent", root_pages);
        }

        let mut card_doc = Self {
            doc,
            root_pages,
            pages,
        };
        card_doc.write_page_tree()?;
        Ok(card_doc)
    }

    fn write_page_tree(&mut self) -> Result<()> {
        let kids: Vec<Object> = self.pages.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;
        let root = self.doc.get_object_mut(self.root_pages)?.as_dict_mut()?;
        root.set("Kids", kids);
        root.set("Count", count);
        Ok(())
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        // intermediate page tree nodes are unreachable once flattened
        self.doc.prune_objects();
        self.doc
            .save(path)
            .map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

impl CardDocument for PdfCardDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn append_blank_page(&mut self) -> Result<()> {
        let media_box = self
            .pages
            .first()
            .and_then(|&first| inherited(&self.doc, first, b"MediaBox"))
            .unwrap_or_else(|| {
                Object::Array(DEFAULT_MEDIA_BOX.iter().map(|&v| v.into()).collect())
            });
        let contents = self.doc.add_object(Stream::new(Dictionary::new(), vec![]));
        let page = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.root_pages,
            "MediaBox" => media_box,
            "Resources" => Dictionary::new(),
            "Contents" => contents,
        });
        self.pages.push(page);
        self.write_page_tree()
    }

    fn reorder(&mut self, order: &[usize]) -> Result<()> {
        let count = self.pages.len();
        let pages = order
            .iter()
            .map(|&index| {
                self.pages
                    .get(index)
                    .copied()
                    .ok_or(Error::PageOutOfRange { index, count })
            })
            .collect::<Result<Vec<_>>>()?;
        self.pages = pages;
        self.write_page_tree()
    }
}

/// Default output path: `cards.pdf` becomes `cards.duplex.pdf` next to it.
pub fn duplex_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cards".into());
    source.with_file_name(format!("{stem}.duplex.pdf"))
}

/// `path` with symlinks and `.`/`..` resolved. A file that doesn't exist yet resolves through
/// its parent directory.
fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(real) = fs::canonicalize(path) {
        return Some(real);
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Some(fs::canonicalize(parent).ok()?.join(path.file_name()?))
}

#[cfg(unix)]
fn same_inode(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_inode(_: &Path, _: &Path) -> bool {
    false
}

/// Whether writing to `output` would clobber `source`, through any alias or hard link.
fn is_same_file(source: &Path, output: &Path) -> bool {
    if same_inode(source, output) {
        return true;
    }
    match (resolve(source), resolve(output)) {
        (Some(a), Some(b)) => a == b,
        _ => source == output,
    }
}

/// Read a rendered card PDF, pad and reorder it for duplex printing, and write the result to
/// `output` (or next to the source). The source file is never modified.
pub fn reorder_pdf(source: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let output = output.map_or_else(|| duplex_path(source), Path::to_path_buf);
    if is_same_file(source, &output) {
        return Err(Error::Config(format!(
            "refusing to overwrite source document {}",
            source.display()
        )));
    }

    let mut doc = PdfCardDocument::load(source)?;
    let before = doc.page_count();
    sequence(&mut doc)?;
    doc.save(&output)?;
    info!(
        "reordered {} ({} pages, {} after padding) into {}",
        source.display(),
        before,
        doc.page_count(),
        output.display()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A PDF whose page `i` has the content stream `% card i`.
    fn numbered_pdf(n: usize) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..n)
            .map(|i| {
                let content = doc.add_object(Stream::new(
                    Dictionary::new(),
                    format!("% card {i}").into_bytes(),
                ));
                Object::Reference(doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content,
                }))
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => n as i64,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(420),
                    Object::Integer(297),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn labels(doc: &Document) -> Vec<String> {
        doc.get_pages()
            .into_values()
            .map(|id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
            .collect()
    }

    #[test]
    fn reorders_and_pads_in_memory() {
        let mut doc = PdfCardDocument::from_document(numbered_pdf(6)).unwrap();
        sequence(&mut doc).unwrap();
        assert_eq!(doc.page_count(), 8);

        let doc = doc.into_document();
        assert_eq!(
            labels(&doc),
            vec!["% card 0", "% card 2", "% card 1", "% card 3", "% card 4", "", "% card 5", ""]
        );
    }

    #[test]
    fn blank_pages_inherit_media_box() {
        let mut doc = PdfCardDocument::from_document(numbered_pdf(1)).unwrap();
        doc.append_blank_page().unwrap();
        let doc = doc.into_document();
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let media_box = doc
            .get_dictionary(pages[1])
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(media_box.len(), 4);
        assert_eq!(media_box[2].as_i64().unwrap(), 420);
    }

    #[test]
    fn writes_a_new_file_and_keeps_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("grade-5.pdf");
        numbered_pdf(8).save(&source).unwrap();
        let original = std::fs::read(&source).unwrap();

        let output = reorder_pdf(&source, None).unwrap();
        assert_eq!(output, dir.path().join("grade-5.duplex.pdf"));
        assert_eq!(std::fs::read(&source).unwrap(), original);

        let reordered = Document::load(&output).unwrap();
        assert_eq!(
            labels(&reordered),
            vec![
                "% card 0", "% card 2", "% card 1", "% card 3", "% card 4", "% card 6",
                "% card 5", "% card 7"
            ]
        );
    }

    #[test]
    fn refuses_to_overwrite_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cards.pdf");
        numbered_pdf(4).save(&source).unwrap();
        assert!(matches!(
            reorder_pdf(&source, Some(source.as_path())),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn refuses_aliases_of_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("cards");
        std::fs::create_dir(&sub).unwrap();
        let source = sub.join("cards.pdf");
        numbered_pdf(4).save(&source).unwrap();
        let original = std::fs::read(&source).unwrap();

        let dotted = sub.join("..").join("cards").join("cards.pdf");
        assert!(matches!(
            reorder_pdf(&source, Some(dotted.as_path())),
            Err(Error::Config(_))
        ));
        assert_eq!(std::fs::read(&source).unwrap(), original);
    }

    #[cfg(unix)]
    #[test]
    fn refuses_links_to_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cards.pdf");
        numbered_pdf(4).save(&source).unwrap();

        let soft = dir.path().join("soft.pdf");
        std::os::unix::fs::symlink(&source, &soft).unwrap();
        let hard = dir.path().join("hard.pdf");
        std::fs::hard_link(&source, &hard).unwrap();
        for link in [soft, hard] {
            assert!(matches!(
                reorder_pdf(&source, Some(link.as_path())),
                Err(Error::Config(_))
            ));
        }
    }

    #[test]
    fn empty_pdf_is_rejected() {
        let mut doc = PdfCardDocument::from_document(numbered_pdf(0)).unwrap();
        assert!(matches!(sequence(&mut doc), Err(Error::EmptyDocument)));
    }
}
