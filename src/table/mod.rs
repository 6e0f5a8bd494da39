//! # Tables
//!
//! Fixed column widths, cells spanning rows and columns, and rows that flow
//! across pages.
//!
//! Rows are placed whole: a row that does not fit the rest of the page moves
//! to the next page. A row taller than an empty page is split instead, each
//! cell flowing down the page chain on its own. Every cell's border is an
//! open [`BorderInfo`] for as many rows as it spans, so spans cut by a break
//! are drawn open at the cut and continue on the next page.
//!
//! Row heights: a row is as tall as its declared height and its tallest
//! single-row cell. A spanning cell that still needs more room than the rows
//! it covers adds the shortfall to its first row.

pub mod grid;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::border::BorderConfiguration;
use crate::component::{stacked_height, Block, Component};
use crate::context::{Context, EPSILON};
use crate::error::LayoutError;
use crate::paging::{BorderId, BorderInfo, FragmentEdge, PagingEvent};
use crate::style::{Color, Edges};

pub use grid::{CellPos, Grid};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default = "one")]
    pub row_span: usize,
    #[serde(default = "one")]
    pub col_span: usize,
    /// Content width, when narrower than the spanned columns.
    #[serde(default)]
    pub width: Option<f64>,
    /// Minimum height.
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default = "default_padding")]
    pub padding: Edges,
    /// Overrides the table's border.
    #[serde(default)]
    pub border: Option<BorderConfiguration>,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub is_paging_border: bool,
    #[serde(default)]
    pub components: Vec<Block>,
}

fn one() -> usize {
    1
}

fn default_padding() -> Edges {
    Edges::uniform(2.0)
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            row_span: 1,
            col_span: 1,
            width: None,
            height: None,
            padding: default_padding(),
            border: None,
            background: None,
            is_paging_border: false,
            components: Vec::new(),
        }
    }
}

impl TableCell {
    pub fn new(components: Vec<Block>) -> Self {
        Self {
            components,
            ..Self::default()
        }
    }

    pub fn with_span(mut self, row_span: usize, col_span: usize) -> Self {
        self.row_span = row_span;
        self.col_span = col_span;
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// Minimum height.
    #[serde(default)]
    pub height: Option<f64>,
    /// One entry per column; `None` where an earlier span covers the slot.
    #[serde(default)]
    pub cells: Vec<Option<TableCell>>,
}

impl TableRow {
    pub fn new(cells: Vec<Option<TableCell>>) -> Self {
        Self {
            height: None,
            cells,
        }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }
}

/// The unvalidated table description, as written in document input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    pub column_widths: Vec<f64>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
    #[serde(default = "BorderConfiguration::all")]
    pub border: BorderConfiguration,
    /// Leading rows drawn again at the top of every new page.
    #[serde(default)]
    pub repeat_header_rows: usize,
    #[serde(default)]
    pub margin: Edges,
}

impl TableSpec {
    pub fn new(column_widths: Vec<f64>, rows: Vec<TableRow>) -> Self {
        Self {
            column_widths,
            rows,
            border: BorderConfiguration::all(),
            repeat_header_rows: 0,
            margin: Edges::default(),
        }
    }
}

/// A validated table: every grid slot has exactly one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TableSpec", into = "TableSpec")]
pub struct Table {
    spec: TableSpec,
    grid: Grid,
    column_offsets: Vec<f64>,
}

impl TryFrom<TableSpec> for Table {
    type Error = LayoutError;

    fn try_from(spec: TableSpec) -> Result<Self, Self::Error> {
        Table::new(spec)
    }
}

impl From<Table> for TableSpec {
    fn from(table: Table) -> Self {
        table.spec
    }
}

/// A cell whose border is still open, waiting for its last row.
#[derive(Debug, Clone, Copy)]
struct OpenCell {
    id: BorderId,
    last_row: usize,
}

impl Table {
    pub fn new(spec: TableSpec) -> Result<Self, LayoutError> {
        if spec.column_widths.is_empty() {
            return Err(LayoutError::config("a table needs at least one column"));
        }
        if let Some(w) = spec.column_widths.iter().find(|w| **w <= 0.0) {
            return Err(LayoutError::config(format!(
                "column widths must be positive, got {w}"
            )));
        }
        spec.border.validate()?;
        spec.margin.validate("table margin")?;

        let grid = Grid::build(spec.column_widths.len(), &spec.rows)?;

        for (r, row) in spec.rows.iter().enumerate() {
            if row.height.is_some_and(|h| h < 0.0) {
                return Err(LayoutError::config(format!(
                    "row {r} height must not be negative"
                )));
            }
        }
        for (r, c, cell) in cells(&spec.rows) {
            cell.padding.validate("cell padding")?;
            if let Some(border) = &cell.border {
                border.validate()?;
            }
            if cell.height.is_some_and(|h| h < 0.0) {
                return Err(LayoutError::config(format!(
                    "cell ({r}, {c}) height must not be negative"
                )));
            }
        }

        let header_rows = spec.repeat_header_rows;
        if header_rows > spec.rows.len() {
            return Err(LayoutError::config(format!(
                "{header_rows} header rows requested but the table has {}",
                spec.rows.len()
            )));
        }
        for (r, c, cell) in cells(&spec.rows[..header_rows]) {
            if r + cell.row_span > header_rows {
                return Err(LayoutError::HeaderSpan { row: r, col: c });
            }
        }

        let column_offsets = spec
            .column_widths
            .iter()
            .scan(0.0, |x, w| {
                let start = *x;
                *x += w;
                Some(start)
            })
            .collect();

        Ok(Self {
            spec,
            grid,
            column_offsets,
        })
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.spec.rows
    }

    pub fn column_widths(&self) -> &[f64] {
        &self.spec.column_widths
    }

    pub fn total_width(&self) -> f64 {
        self.spec.column_widths.iter().sum()
    }

    fn span_width(&self, col: usize, col_span: usize) -> f64 {
        self.spec.column_widths[col..col + col_span].iter().sum()
    }

    fn content_width(&self, col: usize, cell: &TableCell) -> f64 {
        let span = self.span_width(col, cell.col_span);
        cell.width.map_or(span, |w| w.min(span)) - cell.padding.horizontal()
    }

    fn cell_height(
        &self,
        ctx: &mut Context,
        col: usize,
        cell: &TableCell,
    ) -> Result<f64, LayoutError> {
        let width = self.content_width(col, cell);
        let x = ctx.wrap_begin_x();
        let content = ctx.with_wrap(x, width, |ctx| stacked_height(&cell.components, ctx))?;
        let needed = content + cell.padding.vertical();
        Ok(cell.height.map_or(needed, |h| h.max(needed)))
    }

    /// Height of every row at the table's column widths.
    pub fn row_heights(&self, ctx: &mut Context) -> Result<Vec<f64>, LayoutError> {
        let mut heights: Vec<f64> = self
            .spec
            .rows
            .iter()
            .map(|row| row.height.unwrap_or(0.0))
            .collect();

        let mut spanning = Vec::new();
        for (r, c, cell) in cells(&self.spec.rows) {
            let needed = self.cell_height(ctx, c, cell)?;
            if cell.row_span == 1 {
                heights[r] = heights[r].max(needed);
            } else {
                spanning.push((r, cell.row_span, needed));
            }
        }
        for (r, row_span, needed) in spanning {
            let covered: f64 = heights[r..r + row_span].iter().sum();
            if needed > covered {
                heights[r] += needed - covered;
            }
        }
        Ok(heights)
    }

    /// A table made of the repeated header rows only.
    fn header_table(&self) -> Result<Table, LayoutError> {
        let rows = self.spec.rows[..self.spec.repeat_header_rows].to_vec();
        Table::new(TableSpec {
            rows,
            repeat_header_rows: 0,
            ..self.spec.clone()
        })
    }

    /// Place row `r` at the cursor.
    ///
    /// With `allow_break`, a row that does not fit moves to the next page,
    /// or is split across pages when even an empty page is too short.
    /// Without it, a row that does not fit is an error.
    fn render_row(
        &self,
        ctx: &mut Context,
        heights: &[f64],
        left: f64,
        r: usize,
        open: &mut Vec<OpenCell>,
        allow_break: bool,
    ) -> Result<(), LayoutError> {
        let height = heights[r];
        let mut split = false;
        if !ctx.fits(height) {
            if !allow_break {
                return Err(LayoutError::ComponentTooTall {
                    needed: height,
                    available: ctx.remaining_height(),
                });
            }
            if height <= ctx.empty_page_height() + EPSILON {
                ctx.ensure_room(height)?;
            }
            split = !ctx.fits(height);
        }
        if split {
            log::debug!("splitting table row {r} ({height:.2}pt) across pages");
            for cell in open.iter() {
                ctx.set_border_edge(cell.id, FragmentEdge::PageBottom);
            }
        }
        let edge = if split {
            FragmentEdge::PageBottom
        } else {
            FragmentEdge::Cursor
        };

        let row_top = ctx.flow_point();
        let mut furthest = row_top;
        for (c, cell) in self.row_cells(r) {
            ctx.goto(row_top);
            let x = left + self.column_offsets[c];
            let span_height: f64 = heights[r..r + cell.row_span].iter().sum();
            let border = cell.border.as_ref().unwrap_or(&self.spec.border);
            let width = self.span_width(c, cell.col_span);
            let info = BorderInfo::new(border.snapshot(), x, row_top.y, width)
                .with_background(cell.background)
                .with_height(span_height)
                .with_edge(edge)
                .paging_border(cell.is_paging_border);
            let id = ctx.open_border(info);

            ctx.with_wrap(x + cell.padding.left, self.content_width(c, cell), |ctx| {
                ctx.advance_flow(cell.padding.top)?;
                cell.components
                    .iter()
                    .try_for_each(|component| component.render(ctx))
            })?;

            // a span's content past this row belongs to the rows below it
            let here = ctx.flow_point();
            if cell.row_span == 1 && here.is_after(&furthest) {
                furthest = here;
            }
            open.push(OpenCell {
                id,
                last_row: r + cell.row_span - 1,
            });
        }

        ctx.goto(row_top);
        ctx.advance_flow(height)?;
        let here = ctx.flow_point();
        if here.is_after(&furthest) {
            furthest = here;
        }
        ctx.goto(furthest);

        if split {
            for cell in open.iter() {
                ctx.set_border_edge(cell.id, FragmentEdge::Cursor);
            }
        }
        let mut still_open = Vec::with_capacity(open.len());
        for cell in open.drain(..) {
            if cell.last_row == r {
                ctx.close_border(cell.id)?;
            } else {
                still_open.push(cell);
            }
        }
        *open = still_open;
        Ok(())
    }

    /// Cells that start in row `r`, found through the slot owners.
    fn row_cells(&self, r: usize) -> impl Iterator<Item = (usize, &TableCell)> + '_ {
        (0..self.grid.cols()).filter_map(move |c| {
            let origin = self.grid.owner(r, c)?;
            if origin != (CellPos { row: r, col: c }) {
                return None;
            }
            self.spec.rows[r].cells.get(c)?.as_ref().map(|cell| (c, cell))
        })
    }

    fn render_rows(
        &self,
        ctx: &mut Context,
        heights: &[f64],
        left: f64,
        header: Option<&Rc<dyn PagingEvent>>,
    ) -> Result<(), LayoutError> {
        let mut open = Vec::new();
        for r in 0..self.spec.rows.len() {
            if r == self.spec.repeat_header_rows {
                if let Some(event) = header {
                    ctx.add_paging_event(Rc::clone(event));
                }
            }
            self.render_row(ctx, heights, left, r, &mut open, true)?;
        }
        Ok(())
    }
}

/// Every cell that starts a span, with its grid coordinate.
fn cells(rows: &[TableRow]) -> impl Iterator<Item = (usize, usize, &TableCell)> {
    rows.iter().enumerate().flat_map(|(r, row)| {
        row.cells
            .iter()
            .enumerate()
            .filter_map(move |(c, cell)| cell.as_ref().map(|cell| (r, c, cell)))
    })
}

impl Component for Table {
    fn required_height(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        let rows: f64 = self.row_heights(ctx)?.iter().sum();
        Ok(rows + self.spec.margin.vertical())
    }

    fn required_width(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        Ok(self.total_width() + self.spec.margin.horizontal())
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        let heights = self.row_heights(ctx)?;
        let left = ctx.wrap_begin_x() + self.spec.margin.left;
        if self.total_width() > ctx.wrap_width() - self.spec.margin.horizontal() + EPSILON {
            log::warn!(
                "table is {:.2}pt wide but only {:.2}pt are available",
                self.total_width(),
                ctx.wrap_width() - self.spec.margin.horizontal()
            );
        }
        let margin = &self.spec.margin;
        let total: f64 = heights.iter().sum::<f64>() + margin.vertical();
        let moves_whole = !ctx.fits(total)
            && ctx.fits(total - margin.bottom)
            && total <= ctx.empty_page_height() + EPSILON;
        ctx.ensure_room(if moves_whole { total } else { margin.top })?;
        ctx.consume(margin.top);

        let header_rows = self.spec.repeat_header_rows;
        let header: Option<Rc<dyn PagingEvent>> =
            if header_rows > 0 && header_rows < self.spec.rows.len() {
                Some(Rc::new(RepeatHeader {
                    table: self.header_table()?,
                    heights: heights[..header_rows].to_vec(),
                    left,
                }))
            } else {
                None
            };

        let result = self.render_rows(ctx, &heights, left, header.as_ref());
        if let Some(event) = &header {
            ctx.remove_paging_event(event);
        }
        result?;

        ctx.consume(self.spec.margin.bottom);
        Ok(())
    }
}

/// Draws the header rows again at the top of each new page.
#[derive(Debug)]
struct RepeatHeader {
    table: Table,
    heights: Vec<f64>,
    left: f64,
}

impl PagingEvent for RepeatHeader {
    fn before(&self, _ctx: &mut Context) -> Result<(), LayoutError> {
        Ok(())
    }

    fn after(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        if !ctx.is_fresh_page() {
            return Ok(());
        }
        let mut open = Vec::new();
        for r in 0..self.table.rows().len() {
            self.table
                .render_row(ctx, &self.heights, self.left, r, &mut open, false)?;
        }
        Ok(())
    }
}
