//! Best-effort metadata extraction for imported files
//!
//! Extraction never decides whether an import succeeds. Results come back as
//! an explicit [`Extraction`]; the catalog applies filename/"Unknown"
//! defaults when extraction fails or comes back empty.
//!
//! - **PDF**: regex scan of the first 50 000 bytes for info-dictionary
//!   `/Title (...)` and `/Author (...)` entries plus a `/Type /Page` object
//!   count. Cheap and wrong for compressed dictionaries, which is accepted.
//! - **EPUB**: real container/OPF parsing through the `epub` crate, including
//!   cover lookup.
//! - **TXT**: file stem as the title, nothing else to extract.

use crate::error::Result;
use crate::storage::models::BookType;
use epub::doc::EpubDoc;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// How many leading bytes of a PDF are scanned for metadata
const PDF_SCAN_WINDOW: usize = 50_000;

/// Metadata pulled out of a book file; all fields optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub pages: Option<i64>,
}

/// Outcome of an extraction attempt
///
/// `Failed` carries the reason for logging; callers fall back to defaults
/// either way.
#[derive(Debug, Clone)]
pub enum Extraction {
    Extracted(BookMetadata),
    Failed(String),
}

/// Extract metadata from a book file, dispatching on its type
pub async fn extract(path: &Path, book_type: BookType) -> Extraction {
    let result = match book_type {
        BookType::Pdf => extract_pdf(path).await,
        BookType::Epub => extract_epub(path),
        BookType::Txt => extract_txt(path),
    };

    match result {
        Ok(meta) => {
            debug!(path = %path.display(), ?meta, "extracted metadata");
            Extraction::Extracted(meta)
        }
        Err(e) => Extraction::Failed(e.to_string()),
    }
}

/// Scan a PDF header window for info-dictionary entries and page objects
async fn extract_pdf(path: &Path) -> Result<BookMetadata> {
    let bytes = tokio::fs::read(path).await?;
    let window = &bytes[..bytes.len().min(PDF_SCAN_WINDOW)];
    let text = String::from_utf8_lossy(window);

    let title_re = Regex::new(r"/Title\s*\(([^)]+)\)").unwrap();
    let author_re = Regex::new(r"/Author\s*\(([^)]+)\)").unwrap();
    // `$` keeps a page object at the very end of the scan window countable
    let page_re = Regex::new(r"/Type\s*/Page(?:[^s]|$)").unwrap();

    let title = title_re
        .captures(&text)
        .map(|c| c[1].trim().to_string())
        .filter(|t| !t.is_empty());
    let author = author_re
        .captures(&text)
        .map(|c| c[1].trim().to_string())
        .filter(|a| !a.is_empty());

    let page_count = page_re.find_iter(&text).count() as i64;
    let pages = (page_count > 0).then_some(page_count);

    Ok(BookMetadata {
        title,
        author,
        pages,
    })
}

/// Parse EPUB container/OPF metadata (dc:title, dc:creator)
fn extract_epub(path: &Path) -> Result<BookMetadata> {
    let doc = EpubDoc::new(path)
        .map_err(|e| crate::error::ShelfError::InvalidInput(format!("EPUB parse failed: {}", e)))?;

    let title = doc
        .mdata("title")
        .map(|m| m.value.trim().to_string())
        .filter(|t| !t.is_empty());
    let author = doc
        .mdata("creator")
        .map(|m| m.value.trim().to_string())
        .filter(|a| !a.is_empty());

    Ok(BookMetadata {
        title,
        author,
        pages: None,
    })
}

/// Plain text files carry no metadata beyond their name
fn extract_txt(path: &Path) -> Result<BookMetadata> {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string());

    Ok(BookMetadata {
        title,
        author: None,
        pages: None,
    })
}

/// Pull the cover image out of an EPUB
///
/// Three-tier fallback: the declared cover (EPUB3 `cover-image` property or
/// EPUB2 `meta[name=cover]`, resolved by the `epub` crate), then any manifest
/// image whose id contains "cover", then any manifest entry whose filename is
/// `cover.(jpg|png|gif)`. Returns `None` when the file doesn't parse or no
/// tier matches; cover absence is never an error.
pub fn extract_epub_cover(path: &Path) -> Option<Vec<u8>> {
    let mut doc = EpubDoc::new(path).ok()?;

    if let Some((bytes, _mime)) = doc.get_cover() {
        if !bytes.is_empty() {
            return Some(bytes);
        }
    }

    let by_id = doc
        .resources
        .iter()
        .find(|(id, item)| id.to_lowercase().contains("cover") && item.mime.starts_with("image/"))
        .map(|(id, _)| id.clone());
    if let Some(id) = by_id {
        if let Some((bytes, _mime)) = doc.get_resource(&id) {
            if !bytes.is_empty() {
                return Some(bytes);
            }
        }
    }

    let filename_re = Regex::new(r"(?i)^cover\.(jpg|png|gif)$").unwrap();
    let by_name = doc
        .resources
        .values()
        .find(|item| {
            item.path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| filename_re.is_match(n))
        })
        .map(|item| item.path.clone());
    if let Some(resource_path) = by_name {
        if let Some(bytes) = doc.get_resource_by_path(&resource_path) {
            if !bytes.is_empty() {
                return Some(bytes);
            }
        }
    }

    None
}
