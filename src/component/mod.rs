//! # Components
//!
//! Everything drawable implements [`Component`]: it can report the height and
//! width it needs under the current wrap bounds, and render itself against the
//! shared [`Context`]. The layout core only ever talks to this trait.
//!
//! [`Block`] is the serializable tagged form used in document input.

mod barcode;
mod bookmark;
mod container;
mod image;
mod line;
mod shape;
mod text;

pub use barcode::Barcode;
pub use bookmark::Bookmark;
pub use container::{Container, PageBreak};
pub use image::Image;
pub use line::SplitLine;
pub use shape::{Circle, DiagonalLine, Rectangle, Slope};
pub use text::{break_lines, Line, Text, TextAlign};

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::LayoutError;
use crate::table::Table;

pub trait Component {
    /// Vertical space the component needs at the current wrap width.
    fn required_height(&self, ctx: &mut Context) -> Result<f64, LayoutError>;

    /// Horizontal space the component needs, capped by the wrap width.
    fn required_width(&self, ctx: &mut Context) -> Result<f64, LayoutError>;

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError>;

    /// Lay out exactly as `render` would, drawing nothing.
    fn virtual_render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        let was_virtual = ctx.is_virtual_render();
        ctx.set_virtual_render(true);
        let result = self.render(ctx);
        ctx.set_virtual_render(was_virtual);
        result
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    Text(Text),
    Image(Image),
    Barcode(Barcode),
    SplitLine(SplitLine),
    Container(Container),
    PageBreak,
    Table(Table),
    Rectangle(Rectangle),
    Circle(Circle),
    DiagonalLine(DiagonalLine),
    Bookmark(Bookmark),
}

impl Block {
    pub fn as_component(&self) -> &dyn Component {
        match self {
            Block::Text(c) => c,
            Block::Image(c) => c,
            Block::Barcode(c) => c,
            Block::SplitLine(c) => c,
            Block::Container(c) => c,
            Block::PageBreak => &PageBreak,
            Block::Table(c) => c,
            Block::Rectangle(c) => c,
            Block::Circle(c) => c,
            Block::DiagonalLine(c) => c,
            Block::Bookmark(c) => c,
        }
    }
}

impl Component for Block {
    fn required_height(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        self.as_component().required_height(ctx)
    }

    fn required_width(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        self.as_component().required_width(ctx)
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        self.as_component().render(ctx)
    }
}

impl From<Text> for Block {
    fn from(c: Text) -> Self {
        Block::Text(c)
    }
}

impl From<Image> for Block {
    fn from(c: Image) -> Self {
        Block::Image(c)
    }
}

impl From<Barcode> for Block {
    fn from(c: Barcode) -> Self {
        Block::Barcode(c)
    }
}

impl From<SplitLine> for Block {
    fn from(c: SplitLine) -> Self {
        Block::SplitLine(c)
    }
}

impl From<Container> for Block {
    fn from(c: Container) -> Self {
        Block::Container(c)
    }
}

impl From<PageBreak> for Block {
    fn from(_: PageBreak) -> Self {
        Block::PageBreak
    }
}

impl From<Table> for Block {
    fn from(c: Table) -> Self {
        Block::Table(c)
    }
}

impl From<Rectangle> for Block {
    fn from(c: Rectangle) -> Self {
        Block::Rectangle(c)
    }
}

impl From<Circle> for Block {
    fn from(c: Circle) -> Self {
        Block::Circle(c)
    }
}

impl From<DiagonalLine> for Block {
    fn from(c: DiagonalLine) -> Self {
        Block::DiagonalLine(c)
    }
}

impl From<Bookmark> for Block {
    fn from(c: Bookmark) -> Self {
        Block::Bookmark(c)
    }
}

/// Sum of the heights of `blocks` stacked at the current wrap width.
pub(crate) fn stacked_height(blocks: &[Block], ctx: &mut Context) -> Result<f64, LayoutError> {
    blocks
        .iter()
        .map(|b| b.required_height(ctx))
        .sum::<Result<f64, LayoutError>>()
}

/// Widest of `blocks` at the current wrap width.
pub(crate) fn widest(blocks: &[Block], ctx: &mut Context) -> Result<f64, LayoutError> {
    blocks
        .iter()
        .map(|b| b.required_width(ctx))
        .try_fold(0.0_f64, |acc, w| w.map(|w| acc.max(w)))
}
