//! # Quire
//!
//! A page-oriented document builder.
//!
//! Components (text, tables, images, barcodes, separators, shapes, bordered
//! boxes) are flowed onto fixed-size pages by a cursor that always knows how much
//! room is left. Anything that does not fit continues on a new physical page,
//! with the header and footer replayed and open borders carried over, so a
//! table cell or a box can cross any number of pages and still be drawn
//! correctly on each of them.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [document]  - Pages, regions, fonts; virtual passes then the real pass
//!       ↓
//!   [context]   - Cursor, height budget, wrap bounds, page breaks
//!       ↓
//!   [component] - Text, Image, Barcode, SplitLine, Container, Table, shapes
//!       ↓
//!   [surface]   - Display lists, one per physical page, watermarks first
//!
//! Bookmarks resolve to logical pages after the real pass ([outline]).
//! ```

pub mod border;
pub mod component;
pub mod context;
pub mod document;
pub mod error;
pub mod font;
pub mod outline;
pub mod page;
pub mod paging;
pub mod region;
pub mod style;
pub mod surface;
pub mod table;
pub mod watermark;

pub use document::{Document, PageSpec, RenderedDocument, RenderedPage};
pub use error::LayoutError;

/// Lay out a document into one display list per physical page.
///
/// This is the primary entry point. Total-page placeholders are resolved
/// before anything is drawn.
pub fn render(document: &Document) -> Result<RenderedDocument, LayoutError> {
    document.render()
}

/// Lay out a document described as JSON.
pub fn render_json(json: &str) -> Result<RenderedDocument, LayoutError> {
    let document = Document::from_json(json)?;
    render(&document)
}

/// Count the physical pages a document needs without drawing it.
pub fn virtual_page_count(document: &Document) -> Result<usize, LayoutError> {
    document.page_count()
}
