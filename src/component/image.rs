//! Image placement. Decoding is left to whatever consumes the display list;
//! the layout only needs the box.

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::context::Context;
use crate::error::LayoutError;
use crate::style::{Edges, Rect};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Path, URL or data URI, passed through to the surface.
    pub source: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub margin: Edges,
}

impl Image {
    pub fn new(source: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            source: source.into(),
            width,
            height,
            margin: Edges::default(),
        }
    }

    pub fn with_margin(mut self, margin: Edges) -> Self {
        self.margin = margin;
        self
    }

    /// Placed size: scaled down to the wrap width, keeping the aspect ratio.
    fn size(&self, ctx: &Context) -> Result<(f64, f64), LayoutError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LayoutError::config(format!(
                "image {} needs a positive size, got {}x{}",
                self.source, self.width, self.height
            )));
        }
        self.margin.validate("image margin")?;
        let available = ctx.wrap_width() - self.margin.horizontal();
        if self.width > available && available > 0.0 {
            let scale = available / self.width;
            Ok((available, self.height * scale))
        } else {
            Ok((self.width, self.height))
        }
    }
}

impl Component for Image {
    fn required_height(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        let (_, height) = self.size(ctx)?;
        Ok(height + self.margin.vertical())
    }

    fn required_width(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        let (width, _) = self.size(ctx)?;
        Ok(width + self.margin.horizontal())
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        let (width, height) = self.size(ctx)?;
        ctx.ensure_room(self.margin.top + height + self.margin.bottom)?;
        ctx.consume(self.margin.top);

        let x = ctx.wrap_begin_x() + self.margin.left;
        let y = ctx.cursor().y - height;
        ctx.surface().draw_image(Rect::new(x, y, width, height), &self.source);
        ctx.consume(height);
        ctx.consume(self.margin.bottom);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontBook;
    use crate::style::PageGeometry;
    use std::rc::Rc;

    fn page_context() -> Context {
        let mut ctx = Context::new(Rc::new(FontBook::new()));
        let geometry = PageGeometry::new(120.0, 220.0, Edges::uniform(10.0));
        ctx.begin_page(geometry, None, None).unwrap();
        ctx
    }

    #[test]
    fn test_wide_image_is_scaled_to_wrap_width() {
        let mut ctx = page_context();
        let image = Image::new("logo.png", 200.0, 50.0);
        assert_eq!(image.required_width(&mut ctx).unwrap(), 100.0);
        assert_eq!(image.required_height(&mut ctx).unwrap(), 25.0);
    }

    #[test]
    fn test_render_places_box_under_cursor() {
        let mut ctx = page_context();
        Image::new("a.png", 40.0, 30.0).render(&mut ctx).unwrap();
        assert_eq!(ctx.cursor().y, 180.0);
        let pages = ctx.take_pages().into_pages();
        assert_eq!(
            pages[0].display.foreground[0],
            crate::surface::DrawOp::Image {
                rect: Rect::new(10.0, 180.0, 40.0, 30.0),
                source: "a.png".to_string(),
                angle: 0.0,
            }
        );
    }

    #[test]
    fn test_bottom_margin_counts_toward_the_break() {
        // 100pt left: 95 + 10 below does not fit, 90 + 10 does
        let mut ctx = page_context();
        ctx.consume(100.0);
        let spaced = |height| {
            Image::new("a.png", 40.0, height).with_margin(Edges {
                bottom: 10.0,
                ..Edges::default()
            })
        };
        spaced(90.0).render(&mut ctx).unwrap();
        assert_eq!(ctx.page_count(), 1);

        let mut ctx = page_context();
        ctx.consume(100.0);
        spaced(95.0).render(&mut ctx).unwrap();
        assert_eq!(ctx.page_count(), 2);
        assert_eq!(ctx.cursor().y, 105.0);
    }

    #[test]
    fn test_missing_size_is_config_error() {
        let mut ctx = page_context();
        let image = Image::new("a.png", 0.0, 30.0);
        assert!(matches!(
            image.render(&mut ctx),
            Err(LayoutError::Config { .. })
        ));
    }
}
