//! Pull the text layer out of a grade's exam documents.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// The pages of one source document that are worth mining.
pub fn select_pages(pages: Vec<String>, drop_first_and_last: bool) -> Vec<String> {
    if !drop_first_and_last {
        return pages;
    }
    let n = pages.len();
    if n <= 2 {
        return vec![];
    }
    pages.into_iter().skip(1).take(n - 2).collect()
}

pub fn pdf_pages(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| Error::Extract {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// `*.pdf` and `*.txt` files directly under `dir`, sorted by name.
pub fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| e.eq_ignore_ascii_case("pdf") || e.eq_ignore_ascii_case("txt"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// All text for one grade, concatenated in file-name order. Plain text files are taken whole;
/// PDFs lose their cover and back pages when `drop_first_and_last` is set.
pub fn read_grade_text(dir: &Path, drop_first_and_last: bool) -> Result<String> {
    let files = source_files(dir)?;
    if files.is_empty() {
        warn!("no source documents in {}", dir.display());
    }

    let mut text = String::new();
    for file in &files {
        let is_pdf = file
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            let pages = select_pages(pdf_pages(file)?, drop_first_and_last);
            debug!("{}: {} pages kept", file.display(), pages.len());
            for page in pages {
                text.push_str(&page);
            }
        } else {
            text.push_str(&fs::read_to_string(file).map_err(|e| Error::io(file, e))?);
        }
        text.push('\n');
    }
    info!(
        "read {} documents ({} bytes of text) from {}",
        files.len(),
        text.len(),
        dir.display()
    );
    Ok(text)
}
