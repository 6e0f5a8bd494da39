//! QR barcodes, drawn as one filled square per dark module.

use qrcode::QrCode;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::context::Context;
use crate::error::LayoutError;
use crate::style::{Color, Edges, Rect};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barcode {
    pub content: String,
    /// Side length of the square symbol in points.
    pub size: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub margin: Edges,
}

impl Barcode {
    pub fn new(content: impl Into<String>, size: f64) -> Self {
        Self {
            content: content.into(),
            size,
            color: Color::BLACK,
            margin: Edges::default(),
        }
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.size <= 0.0 {
            return Err(LayoutError::config(format!(
                "barcode size must be positive, got {}",
                self.size
            )));
        }
        self.margin.validate("barcode margin")
    }

    fn encode(&self) -> Result<QrCode, LayoutError> {
        QrCode::new(self.content.as_bytes()).map_err(|e| LayoutError::Barcode(e.to_string()))
    }
}

impl Component for Barcode {
    fn required_height(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        Ok(self.size + self.margin.vertical())
    }

    fn required_width(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        Ok(self.size + self.margin.horizontal())
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        self.validate()?;
        let code = self.encode()?;
        ctx.ensure_room(self.size + self.margin.vertical())?;
        ctx.consume(self.margin.top);

        let modules = code.width();
        let module = self.size / modules as f64;
        let left = ctx.wrap_begin_x() + self.margin.left;
        let top = ctx.cursor().y;
        let surface = ctx.surface();
        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color != qrcode::Color::Dark {
                continue;
            }
            let (col, row) = (i % modules, i / modules);
            let rect = Rect::new(
                left + col as f64 * module,
                top - (row + 1) as f64 * module,
                module,
                module,
            );
            surface.fill_rect(rect, self.color);
        }
        ctx.consume(self.size);
        ctx.consume(self.margin.bottom);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontBook;
    use crate::style::PageGeometry;
    use crate::surface::DrawOp;
    use std::rc::Rc;

    #[test]
    fn test_modules_fill_the_square() {
        let mut ctx = Context::new(Rc::new(FontBook::new()));
        let geometry = PageGeometry::new(200.0, 200.0, Edges::uniform(10.0));
        ctx.begin_page(geometry, None, None).unwrap();
        Barcode::new("https://example.com", 42.0)
            .render(&mut ctx)
            .unwrap();
        assert_eq!(ctx.cursor().y, 148.0);

        let pages = ctx.take_pages().into_pages();
        let rects: Vec<Rect> = pages[0]
            .display
            .foreground
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert!(!rects.is_empty());
        for r in &rects {
            assert!(r.x >= 10.0 - 1e-9 && r.right() <= 52.0 + 1e-9);
            assert!(r.y >= 148.0 - 1e-9 && r.top() <= 190.0 + 1e-9);
        }
    }

    #[test]
    fn test_non_positive_size_is_rejected() {
        let mut ctx = Context::new(Rc::new(FontBook::new()));
        assert!(Barcode::new("x", 0.0).required_height(&mut ctx).is_err());
    }
}
