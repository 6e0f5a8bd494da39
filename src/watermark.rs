//! # Watermarks
//!
//! Text or image marks stamped onto every physical page, continuation pages
//! included, before anything else is drawn on it. They are placed in absolute
//! page coordinates and never touch the cursor or the height budget.
//!
//! A mark is tiled: `rows` rows of `columns` copies, starting at the top-left
//! of the page unless `beginX`/`beginY` say otherwise.

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::LayoutError;
use crate::font::DEFAULT_FONT;
use crate::style::{Color, Point, Rect};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Watermark {
    Text(TextWatermark),
    Image(ImageWatermark),
}

impl Watermark {
    pub fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        match self {
            Watermark::Text(mark) => mark.render(ctx),
            Watermark::Image(mark) => mark.render(ctx),
        }
    }
}

impl From<TextWatermark> for Watermark {
    fn from(mark: TextWatermark) -> Self {
        Watermark::Text(mark)
    }
}

impl From<ImageWatermark> for Watermark {
    fn from(mark: ImageWatermark) -> Self {
        Watermark::Image(mark)
    }
}

fn one() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextWatermark {
    /// Drawn top-down as one block per copy.
    pub lines: Vec<String>,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_text_color")]
    pub color: Color,
    #[serde(default)]
    pub begin_x: Option<f64>,
    #[serde(default)]
    pub begin_y: Option<f64>,
    #[serde(default = "one")]
    pub rows: usize,
    #[serde(default = "one")]
    pub columns: usize,
    /// Horizontal gap between copies in a row.
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    /// Extra gap between rows.
    #[serde(default)]
    pub leading: f64,
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,
    /// Degrees, counterclockwise.
    #[serde(default)]
    pub angle: f64,
}

fn default_font() -> String {
    DEFAULT_FONT.to_string()
}

fn default_font_size() -> f64 {
    12.0
}

fn default_text_color() -> Color {
    Color::rgb(0.8, 0.8, 0.8)
}

fn default_spacing() -> f64 {
    50.0
}

fn default_tab_size() -> usize {
    4
}

impl TextWatermark {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            font: default_font(),
            font_size: default_font_size(),
            color: default_text_color(),
            begin_x: None,
            begin_y: None,
            rows: 1,
            columns: 1,
            spacing: default_spacing(),
            leading: 0.0,
            tab_size: default_tab_size(),
            angle: 0.0,
        }
    }

    pub fn with_font(mut self, font: &str, size: f64) -> Self {
        self.font = font.to_string();
        self.font_size = size;
        self
    }

    pub fn tiled(mut self, rows: usize, columns: usize) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        if self.lines.is_empty() {
            return Err(LayoutError::config("text watermark needs at least one line"));
        }
        if self.font_size <= 0.0 {
            return Err(LayoutError::config(format!(
                "watermark font size must be positive, got {}",
                self.font_size
            )));
        }

        let tab = " ".repeat(self.tab_size);
        let lines: Vec<String> = self.lines.iter().map(|l| l.replace('\t', &tab)).collect();
        let widest = lines
            .iter()
            .map(|l| ctx.string_width(&self.font, l, self.font_size))
            .fold(0.0, f64::max);

        let begin_x = self.begin_x.unwrap_or(0.0);
        let mut y = self
            .begin_y
            .unwrap_or(ctx.geometry().height() - self.font_size);
        for _ in 0..self.rows {
            let row_top = y;
            let mut x = begin_x;
            for _ in 0..self.columns {
                y = row_top;
                for line in &lines {
                    ctx.surface().show_text_rotated(
                        Point::new(x, y),
                        line,
                        &self.font,
                        self.font_size,
                        self.color,
                        self.angle,
                    );
                    y -= self.font_size;
                }
                x += widest + self.spacing;
            }
            y -= self.leading;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageWatermark {
    pub source: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub begin_x: Option<f64>,
    #[serde(default)]
    pub begin_y: Option<f64>,
    #[serde(default = "one")]
    pub rows: usize,
    #[serde(default = "one")]
    pub columns: usize,
    /// Horizontal gap between copies. Defaults to the image width.
    #[serde(default)]
    pub spacing: Option<f64>,
    /// Vertical gap between rows. Defaults to the image height.
    #[serde(default)]
    pub leading: Option<f64>,
    #[serde(default)]
    pub angle: f64,
}

impl ImageWatermark {
    pub fn new(source: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            source: source.into(),
            width,
            height,
            begin_x: None,
            begin_y: None,
            rows: 1,
            columns: 1,
            spacing: None,
            leading: None,
            angle: 0.0,
        }
    }

    pub fn tiled(mut self, rows: usize, columns: usize) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LayoutError::config(format!(
                "watermark image {} needs a positive size, got {}x{}",
                self.source, self.width, self.height
            )));
        }
        let spacing = self.spacing.unwrap_or(self.width);
        let leading = self.leading.unwrap_or(self.height);

        let begin_x = self.begin_x.unwrap_or(0.0);
        let mut y = self
            .begin_y
            .unwrap_or(ctx.geometry().height() - self.height);
        for _ in 0..self.rows {
            let mut x = begin_x;
            for _ in 0..self.columns {
                let rect = Rect::new(x, y, self.width, self.height);
                ctx.surface()
                    .draw_image_rotated(rect, &self.source, self.angle);
                x += self.width + spacing;
            }
            y -= self.height + leading;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontBook;
    use crate::style::{Edges, PageGeometry};
    use crate::surface::DrawOp;
    use std::rc::Rc;

    fn page_context() -> Context {
        let mut ctx = Context::new(Rc::new(FontBook::new()));
        let geometry = PageGeometry::new(200.0, 300.0, Edges::uniform(10.0));
        ctx.begin_page(geometry, None, None).unwrap();
        ctx
    }

    fn origins(ctx: &mut Context) -> Vec<(String, f64, f64)> {
        ctx.take_pages().into_pages()[0]
            .display
            .ops()
            .filter_map(|op| match op {
                DrawOp::Text { origin, text, .. } => Some((text.clone(), origin.x, origin.y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_text_mark_tiles_from_top_left() {
        let mut ctx = page_context();
        // Courier 10pt: "ab" is 12pt wide, so columns are 62pt apart
        let mark = TextWatermark::new(vec!["ab".into(), "c".into()])
            .with_font("Courier", 10.0)
            .tiled(2, 2);
        Watermark::from(mark).render(&mut ctx).unwrap();
        assert_eq!(
            origins(&mut ctx),
            vec![
                ("ab".to_string(), 0.0, 290.0),
                ("c".to_string(), 0.0, 280.0),
                ("ab".to_string(), 62.0, 290.0),
                ("c".to_string(), 62.0, 280.0),
                ("ab".to_string(), 0.0, 270.0),
                ("c".to_string(), 0.0, 260.0),
                ("ab".to_string(), 62.0, 270.0),
                ("c".to_string(), 62.0, 260.0),
            ]
        );
        // the flow is untouched
        assert_eq!(ctx.cursor().y, 290.0);
    }

    #[test]
    fn test_tabs_expand_before_drawing() {
        let mut ctx = page_context();
        let mut mark = TextWatermark::new(vec!["a\tb".into()]);
        mark.tab_size = 2;
        mark.render(&mut ctx).unwrap();
        assert_eq!(origins(&mut ctx)[0].0, "a  b");
    }

    #[test]
    fn test_image_mark_keeps_angle() {
        let mut ctx = page_context();
        let mut mark = ImageWatermark::new("seal.png", 40.0, 20.0).tiled(2, 1);
        mark.angle = 45.0;
        mark.render(&mut ctx).unwrap();
        let pages = ctx.take_pages().into_pages();
        let rects: Vec<(Rect, f64)> = pages[0]
            .display
            .ops()
            .filter_map(|op| match op {
                DrawOp::Image { rect, angle, .. } => Some((*rect, *angle)),
                _ => None,
            })
            .collect();
        assert_eq!(
            rects,
            vec![
                (Rect::new(0.0, 280.0, 40.0, 20.0), 45.0),
                (Rect::new(0.0, 240.0, 40.0, 20.0), 45.0),
            ]
        );
    }

    #[test]
    fn test_empty_text_mark_is_rejected() {
        let mut ctx = page_context();
        let mark = Watermark::Text(TextWatermark::new(Vec::new()));
        assert!(matches!(
            mark.render(&mut ctx),
            Err(LayoutError::Config { .. })
        ));
    }
}
