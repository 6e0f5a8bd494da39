//! Plain shapes placed in the flow: rectangles, ellipses and diagonal lines.
//!
//! Each shape occupies a fixed box under the cursor and moves to the next
//! page whole when the box and its margins do not fit.

use serde::{Deserialize, Serialize};

use crate::border::{draw_box, BorderConfiguration};
use crate::component::Component;
use crate::context::Context;
use crate::error::LayoutError;
use crate::style::{Color, Edges, Point, Rect};

fn positive(what: &str, value: f64) -> Result<(), LayoutError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::config(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

/// Width capped by the wrap width, or all of it when unset.
fn fitted_width(ctx: &Context, width: Option<f64>, margin: &Edges) -> f64 {
    let available = ctx.wrap_width() - margin.horizontal();
    width.map_or(available, |w| w.min(available))
}

/// Claim `height` plus margins under the cursor and return the placed box.
fn place(ctx: &mut Context, width: f64, height: f64, margin: &Edges) -> Result<Rect, LayoutError> {
    ctx.ensure_room(height + margin.vertical())?;
    ctx.consume(margin.top);
    let x = ctx.wrap_begin_x() + margin.left;
    let rect = Rect::new(x, ctx.cursor().y - height, width, height);
    ctx.consume(height);
    ctx.consume(margin.bottom);
    Ok(rect)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub width: f64,
    pub height: f64,
    #[serde(default = "BorderConfiguration::all")]
    pub border: BorderConfiguration,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub margin: Edges,
}

impl Rectangle {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            border: BorderConfiguration::all(),
            background: None,
            margin: Edges::default(),
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    fn validate(&self) -> Result<(), LayoutError> {
        positive("rectangle width", self.width)?;
        positive("rectangle height", self.height)?;
        self.border.validate()?;
        self.margin.validate("rectangle margin")
    }
}

impl Component for Rectangle {
    fn required_height(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        Ok(self.height + self.margin.vertical())
    }

    fn required_width(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        Ok(fitted_width(ctx, Some(self.width), &self.margin) + self.margin.horizontal())
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        self.validate()?;
        let width = fitted_width(ctx, Some(self.width), &self.margin);
        let rect = place(ctx, width, self.height, &self.margin)?;
        draw_box(ctx.surface(), rect, &self.border.snapshot(), self.background);
        Ok(())
    }
}

/// An ellipse inscribed in its box; a circle when the box is square.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    /// Defaults to the full wrap width.
    #[serde(default)]
    pub width: Option<f64>,
    pub height: f64,
    #[serde(default = "default_line_width")]
    pub border_width: f64,
    #[serde(default)]
    pub border_color: Color,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub margin: Edges,
}

fn default_line_width() -> f64 {
    1.0
}

impl Circle {
    pub fn new(diameter: f64) -> Self {
        Self {
            width: Some(diameter),
            height: diameter,
            border_width: default_line_width(),
            border_color: Color::BLACK,
            background: None,
            margin: Edges::default(),
        }
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if let Some(width) = self.width {
            positive("circle width", width)?;
        }
        positive("circle height", self.height)?;
        if self.border_width < 0.0 {
            return Err(LayoutError::config("circle border width must not be negative"));
        }
        self.margin.validate("circle margin")
    }
}

impl Component for Circle {
    fn required_height(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        Ok(self.height + self.margin.vertical())
    }

    fn required_width(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        Ok(fitted_width(ctx, self.width, &self.margin) + self.margin.horizontal())
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        self.validate()?;
        let width = fitted_width(ctx, self.width, &self.margin);
        let rect = place(ctx, width, self.height, &self.margin)?;
        ctx.surface()
            .draw_ellipse(rect, self.background, self.border_width, self.border_color);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slope {
    /// Top-left to bottom-right.
    #[default]
    Falling,
    /// Bottom-left to top-right.
    Rising,
}

/// A straight line across its box, corner to corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagonalLine {
    /// Defaults to the full wrap width.
    #[serde(default)]
    pub width: Option<f64>,
    pub height: f64,
    #[serde(default)]
    pub slope: Slope,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub margin: Edges,
}

impl DiagonalLine {
    pub fn new(width: f64, height: f64, slope: Slope) -> Self {
        Self {
            width: Some(width),
            height,
            slope,
            line_width: default_line_width(),
            color: Color::BLACK,
            margin: Edges::default(),
        }
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if let Some(width) = self.width {
            positive("diagonal line width", width)?;
        }
        if self.height < 0.0 {
            return Err(LayoutError::config(format!(
                "diagonal line height must not be negative, got {}",
                self.height
            )));
        }
        positive("line width", self.line_width)?;
        self.margin.validate("diagonal line margin")
    }
}

impl Component for DiagonalLine {
    fn required_height(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        Ok(self.height + self.margin.vertical())
    }

    fn required_width(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        Ok(fitted_width(ctx, self.width, &self.margin) + self.margin.horizontal())
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        self.validate()?;
        let width = fitted_width(ctx, self.width, &self.margin);
        let rect = place(ctx, width, self.height, &self.margin)?;
        let (from, to) = match self.slope {
            Slope::Falling => (
                Point::new(rect.x, rect.top()),
                Point::new(rect.right(), rect.y),
            ),
            Slope::Rising => (
                Point::new(rect.x, rect.y),
                Point::new(rect.right(), rect.top()),
            ),
        };
        ctx.surface()
            .stroke_line(from, to, self.line_width, self.color);
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

    fn page_context(body_height: f64) -> Context {
        let mut ctx = Context::new(Rc::new(FontBook::new()));
        let geometry = PageGeometry::new(120.0, body_height + 20.0, Edges::uniform(10.0));
        ctx.begin_page(geometry, None, None).unwrap();
        ctx
    }

    #[test]
    fn test_rectangle_draws_box_under_cursor() {
        let mut ctx = page_context(100.0);
        Rectangle::new(40.0, 30.0)
            .with_background(Color::WHITE)
            .render(&mut ctx)
            .unwrap();
        assert_eq!(ctx.cursor().y, 80.0);

        let pages = ctx.take_pages().into_pages();
        let display = &pages[0].display;
        assert_eq!(
            display.background[0],
            DrawOp::Rect {
                rect: Rect::new(10.0, 80.0, 40.0, 30.0),
                color: Color::WHITE,
            }
        );
        assert_eq!(display.lines().len(), 4);
    }

    #[test]
    fn test_circle_defaults_to_wrap_width() {
        let mut ctx = page_context(100.0);
        let mut circle = Circle::new(20.0);
        circle.width = None;
        assert_eq!(circle.required_width(&mut ctx).unwrap(), 100.0);
        circle.render(&mut ctx).unwrap();

        let pages = ctx.take_pages().into_pages();
        assert!(matches!(
            pages[0].display.foreground[0],
            DrawOp::Ellipse { rect, stroke_width, .. }
                if rect == Rect::new(10.0, 90.0, 100.0, 20.0) && stroke_width == 1.0
        ));
    }

    #[test]
    fn test_shape_moves_whole_when_margin_does_not_fit() {
        let mut ctx = page_context(100.0);
        ctx.consume(70.0);
        let mut rect = Rectangle::new(20.0, 25.0);
        rect.margin.bottom = 10.0;
        rect.render(&mut ctx).unwrap();
        assert_eq!(ctx.page_count(), 2);
        let pages = ctx.take_pages().into_pages();
        assert!(pages[0].display.is_empty());
    }

    #[test]
    fn test_diagonal_slopes() {
        let mut ctx = page_context(100.0);
        DiagonalLine::new(50.0, 20.0, Slope::Falling)
            .render(&mut ctx)
            .unwrap();
        DiagonalLine::new(50.0, 20.0, Slope::Rising)
            .render(&mut ctx)
            .unwrap();
        let pages = ctx.take_pages().into_pages();
        assert_eq!(
            pages[0].display.lines(),
            vec![
                (Point::new(10.0, 110.0), Point::new(60.0, 90.0)),
                (Point::new(10.0, 70.0), Point::new(60.0, 90.0)),
            ]
        );
    }

    #[test]
    fn test_zero_size_is_config_error() {
        let mut ctx = page_context(100.0);
        assert!(matches!(
            Rectangle::new(0.0, 10.0).render(&mut ctx),
            Err(LayoutError::Config { .. })
        ));
        assert!(DiagonalLine::new(10.0, -1.0, Slope::Rising)
            .required_height(&mut ctx)
            .is_err());
    }
}
