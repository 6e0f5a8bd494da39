//! # Drawing Surface
//!
//! The sink components draw into. The layout core never touches it directly;
//! it only tells components where they may write. The real pass records into a
//! page's [`DisplayList`], the virtual pass draws into a [`NullSurface`].

use serde::Serialize;

use crate::style::{Color, Point, Rect};

/// Path, text and image placement primitives at absolute page coordinates.
pub trait Surface {
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fill beneath everything drawn on the page so far. Box backgrounds are
    /// only known once their content has been laid out.
    fn fill_background(&mut self, rect: Rect, color: Color);

    fn show_text(&mut self, origin: Point, text: &str, font: &str, size: f64, color: Color) {
        self.show_text_rotated(origin, text, font, size, color, 0.0);
    }

    /// Text turned `angle` degrees counterclockwise around its origin.
    fn show_text_rotated(
        &mut self,
        origin: Point,
        text: &str,
        font: &str,
        size: f64,
        color: Color,
        angle: f64,
    );

    fn draw_image(&mut self, rect: Rect, source: &str) {
        self.draw_image_rotated(rect, source, 0.0);
    }

    /// Image turned `angle` degrees counterclockwise around its center.
    fn draw_image_rotated(&mut self, rect: Rect, source: &str, angle: f64);

    /// Ellipse inscribed in `rect`, filled and then outlined.
    fn draw_ellipse(&mut self, rect: Rect, fill: Option<Color>, stroke_width: f64, stroke: Color);
}

fn is_upright(angle: &f64) -> bool {
    *angle == 0.0
}

/// One recorded drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all_fields = "camelCase")]
pub enum DrawOp {
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Color,
    },
    Rect {
        rect: Rect,
        color: Color,
    },
    Text {
        origin: Point,
        text: String,
        font: String,
        size: f64,
        color: Color,
        #[serde(skip_serializing_if = "is_upright")]
        angle: f64,
    },
    Image {
        rect: Rect,
        source: String,
        #[serde(skip_serializing_if = "is_upright")]
        angle: f64,
    },
    Ellipse {
        rect: Rect,
        fill: Option<Color>,
        stroke_width: f64,
        stroke: Color,
    },
}

/// The ops recorded for one physical page, split into a background layer and
/// a foreground layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayList {
    pub background: Vec<DrawOp>,
    pub foreground: Vec<DrawOp>,
}

impl DisplayList {
    pub fn is_empty(&self) -> bool {
        self.background.is_empty() && self.foreground.is_empty()
    }

    /// Background ops followed by foreground ops, in paint order.
    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.background.iter().chain(self.foreground.iter())
    }

    /// All text shown on the page, in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.foreground
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All stroked lines as (from, to) pairs.
    pub fn lines(&self) -> Vec<(Point, Point)> {
        self.foreground
            .iter()
            .filter_map(|op| match op {
                DrawOp::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for DisplayList {
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        self.foreground.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.foreground.push(DrawOp::Rect { rect, color });
    }

    fn fill_background(&mut self, rect: Rect, color: Color) {
        self.background.push(DrawOp::Rect { rect, color });
    }

    fn show_text_rotated(
        &mut self,
        origin: Point,
        text: &str,
        font: &str,
        size: f64,
        color: Color,
        angle: f64,
    ) {
        self.foreground.push(DrawOp::Text {
            origin,
            text: text.to_string(),
            font: font.to_string(),
            size,
            color,
            angle,
        });
    }

    fn draw_image_rotated(&mut self, rect: Rect, source: &str, angle: f64) {
        self.foreground.push(DrawOp::Image {
            rect,
            source: source.to_string(),
            angle,
        });
    }

    fn draw_ellipse(&mut self, rect: Rect, fill: Option<Color>, stroke_width: f64, stroke: Color) {
        self.foreground.push(DrawOp::Ellipse {
            rect,
            fill,
            stroke_width,
            stroke,
        });
    }
}

/// Discards everything. Used while the layout is only being measured.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn stroke_line(&mut self, _: Point, _: Point, _: f64, _: Color) {}
    fn fill_rect(&mut self, _: Rect, _: Color) {}
    fn fill_background(&mut self, _: Rect, _: Color) {}
    fn show_text_rotated(&mut self, _: Point, _: &str, _: &str, _: f64, _: Color, _: f64) {}
    fn draw_image_rotated(&mut self, _: Rect, _: &str, _: f64) {}
    fn draw_ellipse(&mut self, _: Rect, _: Option<Color>, _: f64, _: Color) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backgrounds_paint_first() {
        let mut list = DisplayList::default();
        list.show_text(Point::new(0.0, 0.0), "hi", "Helvetica", 12.0, Color::BLACK);
        list.fill_background(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        let first = list.ops().next();
        assert!(matches!(first, Some(DrawOp::Rect { .. })));
        assert_eq!(list.texts(), vec!["hi"]);
    }
}
