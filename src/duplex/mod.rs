//! Page order for printing cards two-up on both sides of a sheet.
//!
//! Rendered card documents alternate front, back, front, back. Each physical sheet holds four
//! of those pages: two fronts on one side, their two backs on the other, so after duplex
//! printing and cutting the sheet in half every card's back lands behind its front.
use tracing::info;

use crate::error::{Error, Result};

mod pdf;

pub use pdf::{reorder_pdf, PdfCardDocument};

/// Source pages per physical sheet (two per side).
pub const PAGES_PER_SHEET: usize = 4;

/// Smallest multiple of [`PAGES_PER_SHEET`] that holds `n` pages.
pub fn padded_len(n: usize) -> usize {
    n.div_ceil(PAGES_PER_SHEET) * PAGES_PER_SHEET
}

/// Print order for an `n`-page document, after padding it to whole sheets. Fronts go in pairs
/// (`0, 2`), followed by the matching backs (`1, 3`), one sheet at a time.
pub fn print_order(n: usize) -> Vec<usize> {
    let n = padded_len(n);
    let evens: Vec<usize> = (0..n).step_by(2).collect();
    let odds: Vec<usize> = (1..n).step_by(2).collect();

    evens
        .chunks(2)
        .zip(odds.chunks(2))
        .flat_map(|(fronts, backs)| fronts.iter().chain(backs).copied())
        .collect()
}

/// The page-level operations the sequencer needs from a rendered document.
pub trait CardDocument {
    fn page_count(&self) -> usize;

    /// Append an empty page sized like the first one.
    fn append_blank_page(&mut self) -> Result<()>;

    /// Rearrange pages so the new page `i` is the old page `order[i]`.
    fn reorder(&mut self, order: &[usize]) -> Result<()>;
}

/// Pad `doc` to whole sheets and put its pages in print order. Returns the order applied.
pub fn sequence<D: CardDocument>(doc: &mut D) -> Result<Vec<usize>> {
    let count = doc.page_count();
    if count == 0 {
        return Err(Error::EmptyDocument);
    }

    let padded = padded_len(count);
    for _ in count..padded {
        doc.append_blank_page()?;
    }
    if padded > count {
        info!("padded {} pages with {} blanks", count, padded - count);
    }

    let order = print_order(padded);
    doc.reorder(&order)?;
    Ok(order)
}
