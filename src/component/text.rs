//! Text blocks: UAX#14 line breaking within the wrap width, one line at a
//! time through the pagination check.

use serde::{Deserialize, Serialize};
use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::component::Component;
use crate::context::{Context, EPSILON};
use crate::error::LayoutError;
use crate::font::DEFAULT_FONT;
use crate::style::{Color, Edges, Point};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A run of text in one font.
///
/// `{{page}}` is replaced by the logical page number, `{{sheet}}` by the
/// physical page number and `{{pages}}` by the total page count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub content: String,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Extra space between lines.
    #[serde(default)]
    pub leading: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub margin: Edges,
}

fn default_font() -> String {
    DEFAULT_FONT.to_string()
}

fn default_font_size() -> f64 {
    12.0
}

/// A line of text after line-breaking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub text: String,
    pub width: f64,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font: default_font(),
            font_size: default_font_size(),
            leading: 0.0,
            color: Color::BLACK,
            align: TextAlign::Left,
            margin: Edges::default(),
        }
    }

    pub fn with_font(mut self, font: &str, size: f64) -> Self {
        self.font = font.to_string();
        self.font_size = size;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_margin(mut self, margin: Edges) -> Self {
        self.margin = margin;
        self
    }

    pub fn line_height(&self) -> f64 {
        self.font_size + self.leading
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.font_size <= 0.0 {
            return Err(LayoutError::config(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if self.leading < 0.0 {
            return Err(LayoutError::config(format!(
                "line spacing must not be negative, got {}",
                self.leading
            )));
        }
        self.margin.validate("text margin")
    }

    fn resolve(&self, ctx: &Context) -> String {
        if !self.content.contains("{{") {
            return self.content.clone();
        }
        self.content
            .replace("{{page}}", &ctx.logical_page_number().to_string())
            .replace("{{sheet}}", &(ctx.current_page().0 + 1).to_string())
            .replace("{{pages}}", &ctx.total_pages().to_string())
    }

    fn layout(&self, ctx: &mut Context) -> Result<(Vec<Line>, f64), LayoutError> {
        self.validate()?;
        let width = ctx.wrap_width() - self.margin.horizontal();
        let text = self.resolve(ctx);
        let lines = break_lines(ctx, &text, &self.font, self.font_size, width);
        Ok((lines, width))
    }
}

impl Component for Text {
    fn required_height(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        let (lines, _) = self.layout(ctx)?;
        Ok(self.margin.vertical() + lines.len() as f64 * self.line_height())
    }

    fn required_width(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        let (lines, _) = self.layout(ctx)?;
        let widest = lines.iter().map(|l| l.width).fold(0.0, f64::max);
        Ok(widest + self.margin.horizontal())
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        let (lines, width) = self.layout(ctx)?;
        let line_height = self.line_height();

        // the bottom margin travels with the last line
        let last = lines.len().saturating_sub(1);
        let tail = |i: usize| if i == last { self.margin.bottom } else { 0.0 };
        ctx.ensure_room(self.margin.top + line_height + tail(0))?;
        ctx.consume(self.margin.top);
        for (i, line) in lines.iter().enumerate() {
            ctx.ensure_room(line_height + tail(i))?;
            let offset = match self.align {
                TextAlign::Left => 0.0,
                TextAlign::Center => (width - line.width) / 2.0,
                TextAlign::Right => width - line.width,
            };
            let x = ctx.wrap_begin_x() + self.margin.left + offset.max(0.0);
            let baseline = ctx.cursor().y - self.font_size;
            ctx.surface().show_text(
                Point::new(x, baseline),
                &line.text,
                &self.font,
                self.font_size,
                self.color,
            );
            ctx.consume(line_height);
        }
        ctx.consume(self.margin.bottom);
        Ok(())
    }
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// UAX#14 break opportunities indexed by char position: entry `i` says
/// whether a line may (or must) end before char `i`.
fn break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        // a break at the very end is implied
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }
    result
}

/// Greedily break `text` into lines no wider than `max_width`.
///
/// Lines end at the last break opportunity that fits. A word wider than the
/// whole line is split between characters.
pub fn break_lines(
    ctx: &mut Context,
    text: &str,
    font: &str,
    size: f64,
    max_width: f64,
) -> Vec<Line> {
    if text.is_empty() {
        return vec![Line::default()];
    }

    let chars: Vec<char> = text.chars().collect();
    let widths: Vec<f64> = chars
        .iter()
        .map(|&ch| {
            if is_newline(ch) {
                0.0
            } else {
                ctx.char_width(font, ch, size)
            }
        })
        .collect();
    let opportunities = break_opportunities(text);

    let make_line = |start: usize, end: usize| {
        let slice: String = chars[start..end].iter().collect();
        let text = slice.trim_end().to_string();
        let kept = text.chars().count();
        Line {
            width: widths[start..start + kept].iter().sum(),
            text,
        }
    };

    let mut lines = Vec::new();
    let mut start = 0;
    let mut width = 0.0;
    let mut last_break: Option<usize> = None;

    for i in 0..chars.len() {
        if i > start {
            match opportunities[i] {
                Some(BreakOpportunity::Mandatory) => {
                    lines.push(make_line(start, i));
                    start = i;
                    width = 0.0;
                    last_break = None;
                }
                Some(BreakOpportunity::Allowed) => last_break = Some(i),
                None => {}
            }
        }

        if is_newline(chars[i]) {
            continue;
        }

        if width + widths[i] > max_width + EPSILON && i > start {
            match last_break.filter(|&b| b > start) {
                Some(b) => {
                    lines.push(make_line(start, b));
                    start = b;
                    width = widths[b..=i].iter().sum();
                }
                None => {
                    lines.push(make_line(start, i));
                    start = i;
                    width = widths[i];
                }
            }
            last_break = None;
            continue;
        }

        width += widths[i];
    }

    if start < chars.len() {
        lines.push(make_line(start, chars.len()));
    }
    lines
}
