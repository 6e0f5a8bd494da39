//! Grid ownership for row/column spans.
//!
//! Row entries map to columns by position. A `Some` entry starts a cell and
//! claims `row_span x col_span` slots; a `None` entry marks a slot that an
//! earlier span must already have claimed. Missing trailing entries count as
//! `None`. Every slot ends up owned by exactly one cell.

use crate::error::LayoutError;
use crate::table::TableRow;

/// Grid coordinate of the cell that starts a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    owners: Vec<CellPos>,
}

impl Grid {
    pub fn build(columns: usize, rows: &[TableRow]) -> Result<Self, LayoutError> {
        let mut owners: Vec<Option<CellPos>> = vec![None; rows.len() * columns];

        for (r, row) in rows.iter().enumerate() {
            if row.cells.len() > columns {
                return Err(LayoutError::RowTooWide {
                    row: r,
                    entries: row.cells.len(),
                    columns,
                });
            }
            for c in 0..columns {
                let Some(cell) = row.cells.get(c).and_then(Option::as_ref) else {
                    if owners[r * columns + c].is_none() {
                        return Err(LayoutError::UnclaimedSlot { row: r, col: c });
                    }
                    continue;
                };

                let (row_span, col_span) = (cell.row_span, cell.col_span);
                if row_span == 0 || col_span == 0 {
                    return Err(LayoutError::config(format!(
                        "cell ({r}, {c}) has a zero span"
                    )));
                }
                if r + row_span > rows.len() || c + col_span > columns {
                    return Err(LayoutError::SpanOutOfBounds {
                        row: r,
                        col: c,
                        row_span,
                        col_span,
                    });
                }
                for rr in r..r + row_span {
                    for cc in c..c + col_span {
                        let slot = &mut owners[rr * columns + cc];
                        if let Some(owner) = slot {
                            return Err(LayoutError::SpanOverlap {
                                row: rr,
                                col: cc,
                                owner_row: owner.row,
                                owner_col: owner.col,
                                claimant_row: r,
                                claimant_col: c,
                            });
                        }
                        *slot = Some(CellPos { row: r, col: c });
                    }
                }
            }
        }

        // every slot was either claimed or rejected above
        let owners = owners.into_iter().flatten().collect();
        Ok(Grid {
            rows: rows.len(),
            cols: columns,
            owners,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The cell that owns slot (`row`, `col`).
    pub fn owner(&self, row: usize, col: usize) -> Option<CellPos> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.owners.get(row * self.cols + col).copied()
    }
}
