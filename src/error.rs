//! Structured error types for the layout engine.
//!
//! Overflow is not an error: running out of room is what triggers pagination.
//! The variants here cover the cases where layout cannot continue at all.

use thiserror::Error;

/// The unified error type returned by all public Quire API functions.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A required setting is missing or out of range.
    #[error("invalid configuration: {what}")]
    Config { what: String },

    /// A header or footer is taller than the page content box.
    #[error("{region} height {height:.2} exceeds the page content height {available:.2}")]
    RegionTooTall {
        region: &'static str,
        height: f64,
        available: f64,
    },

    /// Content that cannot fit even on a completely empty page.
    #[error("content needs {needed:.2}pt but an empty page only offers {available:.2}pt")]
    ComponentTooTall { needed: f64, available: f64 },

    /// Content that does not fit inside a header or footer, where paging is disabled.
    #[error("region content needs {needed:.2}pt but only {available:.2}pt remain")]
    RegionOverflow { needed: f64, available: f64 },

    /// Two cells claim the same grid slot.
    #[error(
        "table slot ({row}, {col}) belongs to cell ({owner_row}, {owner_col}) \
         but cell ({claimant_row}, {claimant_col}) also claims it"
    )]
    SpanOverlap {
        row: usize,
        col: usize,
        owner_row: usize,
        owner_col: usize,
        claimant_row: usize,
        claimant_col: usize,
    },

    /// A grid slot marked as spanned that no cell actually covers.
    #[error("table slot ({row}, {col}) is empty but no span covers it")]
    UnclaimedSlot { row: usize, col: usize },

    /// A span reaching past the last row or column.
    #[error("cell ({row}, {col}) spans {row_span}x{col_span} past the table bounds")]
    SpanOutOfBounds {
        row: usize,
        col: usize,
        row_span: usize,
        col_span: usize,
    },

    /// A row with more entries than the table has columns.
    #[error("row {row} has {entries} entries but the table has {columns} columns")]
    RowTooWide {
        row: usize,
        entries: usize,
        columns: usize,
    },

    /// A repeated header row whose span reaches into the body.
    #[error("header cell ({row}, {col}) spans beyond the repeated header rows")]
    HeaderSpan { row: usize, col: usize },

    /// The real pass paginated differently from the virtual pass.
    #[error("virtual pass produced {expected} pages but the real pass produced {actual}")]
    PassDivergence { expected: usize, actual: usize },

    /// Custom font data that could not be decoded or parsed.
    #[error("font error: {0}")]
    Font(String),

    /// The barcode generator rejected the content.
    #[error("barcode error: {0}")]
    Barcode(String),

    /// JSON input failed to parse as a valid document.
    #[error("failed to parse document: {0}")]
    Json(#[from] serde_json::Error),
}

impl LayoutError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        LayoutError::Config { what: what.into() }
    }
}
