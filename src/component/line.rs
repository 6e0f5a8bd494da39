//! Horizontal separators, solid or dotted.

use serde::{Deserialize, Serialize};

use crate::border::{segments, BorderConfiguration, BorderStyle};
use crate::component::Component;
use crate::context::Context;
use crate::error::LayoutError;
use crate::style::{Color, Edges, Rect};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitLine {
    /// Defaults to the full wrap width.
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default)]
    pub style: BorderStyle,
    #[serde(default = "default_dash")]
    pub line_length: f64,
    #[serde(default = "default_dash")]
    pub line_spacing: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub margin: Edges,
}

fn default_line_width() -> f64 {
    1.0
}

fn default_dash() -> f64 {
    2.0
}

impl Default for SplitLine {
    fn default() -> Self {
        Self {
            length: None,
            line_width: default_line_width(),
            style: BorderStyle::Solid,
            line_length: default_dash(),
            line_spacing: default_dash(),
            color: Color::BLACK,
            margin: Edges::default(),
        }
    }
}

impl SplitLine {
    pub fn dotted(line_length: f64, line_spacing: f64) -> Self {
        Self {
            style: BorderStyle::Dotted,
            line_length,
            line_spacing,
            ..Self::default()
        }
    }

    fn border(&self) -> Result<BorderConfiguration, LayoutError> {
        let border = BorderConfiguration {
            top: true,
            top_color: self.color,
            width: self.line_width,
            style: self.style,
            line_length: self.line_length,
            line_spacing: self.line_spacing,
            ..BorderConfiguration::default()
        };
        border.validate()?;
        self.margin.validate("line margin")?;
        Ok(border)
    }

    fn length(&self, ctx: &Context) -> f64 {
        let available = ctx.wrap_width() - self.margin.horizontal();
        self.length.map_or(available, |l| l.min(available))
    }
}

impl Component for SplitLine {
    fn required_height(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        self.border()?;
        Ok(self.line_width + self.margin.vertical())
    }

    fn required_width(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        self.border()?;
        Ok(self.length(ctx) + self.margin.horizontal())
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        let border = self.border()?;
        ctx.ensure_room(self.line_width + self.margin.vertical())?;
        ctx.consume(self.margin.top);

        // stroke centered in the line's own band
        let y = ctx.cursor().y - self.line_width / 2.0;
        let rect = Rect::new(ctx.wrap_begin_x() + self.margin.left, y, self.length(ctx), 0.0);
        let surface = ctx.surface();
        for seg in segments(rect, &border.snapshot()) {
            surface.stroke_line(seg.from, seg.to, seg.width, seg.color);
        }
        ctx.consume(self.line_width);
        ctx.consume(self.margin.bottom);
        Ok(())
    }
}
