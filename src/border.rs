//! # Border Geometry
//!
//! Pure arithmetic that turns a rectangle and a [`BorderData`] snapshot into
//! stroke segments. Horizontal sides run left to right, vertical sides top
//! down. Dotted sides center their dash pattern so that no side ends in a
//! truncated dash.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::style::{Color, Point, Rect};
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderStyle {
    #[default]
    Solid,
    Dotted,
}

/// Live, mutable border settings owned by a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BorderConfiguration {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
    pub top_color: Color,
    pub bottom_color: Color,
    pub left_color: Color,
    pub right_color: Color,
    pub width: f64,
    pub style: BorderStyle,
    /// Dash length for dotted borders.
    pub line_length: f64,
    /// Gap between dashes for dotted borders.
    pub line_spacing: f64,
}

impl Default for BorderConfiguration {
    fn default() -> Self {
        Self {
            top: false,
            bottom: false,
            left: false,
            right: false,
            top_color: Color::BLACK,
            bottom_color: Color::BLACK,
            left_color: Color::BLACK,
            right_color: Color::BLACK,
            width: 1.0,
            style: BorderStyle::Solid,
            line_length: 1.0,
            line_spacing: 1.0,
        }
    }
}

impl BorderConfiguration {
    /// All four sides on, solid black.
    pub fn all() -> Self {
        Self {
            top: true,
            bottom: true,
            left: true,
            right: true,
            ..Self::default()
        }
    }

    pub fn dotted(line_length: f64, line_spacing: f64) -> Self {
        Self {
            style: BorderStyle::Dotted,
            line_length,
            line_spacing,
            ..Self::all()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.top_color = color;
        self.bottom_color = color;
        self.left_color = color;
        self.right_color = color;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.width < 0.0 {
            return Err(LayoutError::config("border width must not be negative"));
        }
        if self.style == BorderStyle::Dotted {
            if self.line_length <= 0.0 {
                return Err(LayoutError::config("dotted line length must be positive"));
            }
            if self.line_spacing < 0.0 {
                return Err(LayoutError::config("dotted line spacing must not be negative"));
            }
        }
        Ok(())
    }

    /// Copy the current settings into an immutable snapshot for one draw call.
    pub fn snapshot(&self) -> BorderData {
        BorderData {
            config: self.clone(),
        }
    }
}

/// An immutable copy of a [`BorderConfiguration`] taken at draw time.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderData {
    config: BorderConfiguration,
}

impl BorderData {
    pub fn config(&self) -> &BorderConfiguration {
        &self.config
    }

    /// Same snapshot with the top and bottom sides forced on or off.
    pub fn with_vertical_ends(&self, top: bool, bottom: bool) -> BorderData {
        let mut config = self.config.clone();
        config.top = top;
        config.bottom = bottom;
        BorderData { config }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub width: f64,
    pub color: Color,
}

/// Start offsets of each dash along a side of length `length`, and the dash
/// length to use.
pub fn dash_layout(length: f64, line_length: f64, line_spacing: f64) -> (Vec<f64>, f64) {
    let unit = line_length + line_spacing;
    let count = ((length / unit).floor() as usize).max(1);
    let (dash, offset) = if line_length > length {
        (length, 0.0)
    } else {
        (
            line_length,
            ((length - count as f64 * unit + line_spacing) / 2.0).abs(),
        )
    };
    let starts = (0..count).map(|i| offset + i as f64 * unit).collect();
    (starts, dash)
}

fn side(from: Point, to: Point, data: &BorderConfiguration, color: Color) -> Vec<Segment> {
    let width = data.width;
    match data.style {
        BorderStyle::Solid => vec![Segment {
            from,
            to,
            width,
            color,
        }],
        BorderStyle::Dotted => {
            let dx = to.x - from.x;
            let dy = to.y - from.y;
            let length = (dx * dx + dy * dy).sqrt();
            if length <= 0.0 {
                return Vec::new();
            }
            let (ux, uy) = (dx / length, dy / length);
            let (starts, dash) = dash_layout(length, data.line_length, data.line_spacing);
            starts
                .into_iter()
                .map(|s| Segment {
                    from: Point::new(from.x + ux * s, from.y + uy * s),
                    to: Point::new(from.x + ux * (s + dash), from.y + uy * (s + dash)),
                    width,
                    color,
                })
                .collect()
        }
    }
}

/// Stroke segments for every enabled side of `rect`.
pub fn segments(rect: Rect, data: &BorderData) -> Vec<Segment> {
    let c = &data.config;
    let top_left = Point::new(rect.x, rect.top());
    let top_right = Point::new(rect.right(), rect.top());
    let bottom_left = Point::new(rect.x, rect.y);
    let bottom_right = Point::new(rect.right(), rect.y);

    let mut out = Vec::new();
    if c.top {
        out.extend(side(top_left, top_right, c, c.top_color));
    }
    if c.bottom {
        out.extend(side(bottom_left, bottom_right, c, c.bottom_color));
    }
    if c.left {
        out.extend(side(top_left, bottom_left, c, c.left_color));
    }
    if c.right {
        out.extend(side(top_right, bottom_right, c, c.right_color));
    }
    out
}

/// Paint an optional background then the border of `rect`.
pub fn draw_box(
    surface: &mut dyn Surface,
    rect: Rect,
    data: &BorderData,
    background: Option<Color>,
) {
    if let Some(color) = background {
        surface.fill_background(rect, color);
    }
    if data.config.width <= 0.0 {
        return;
    }
    for seg in segments(rect, data) {
        surface.stroke_line(seg.from, seg.to, seg.width, seg.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DisplayList;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_dotted_side_is_centered() {
        let (starts, dash) = dash_layout(100.0, 8.0, 4.0);
        assert_eq!(starts.len(), 8);
        assert!(approx(dash, 8.0));
        assert!(approx(starts[0], 4.0));
        assert!(approx(starts[7], 88.0));
        // symmetric: 4pt before the first dash and after the last one
        assert!(approx(100.0 - (starts[7] + dash), 4.0));
    }

    #[test]
    fn test_dotted_horizontal_segments() {
        let data = BorderConfiguration {
            bottom: false,
            left: false,
            right: false,
            ..BorderConfiguration::dotted(8.0, 4.0)
        }
        .snapshot();
        let segs = segments(Rect::new(10.0, 0.0, 100.0, 20.0), &data);
        assert_eq!(segs.len(), 8);
        assert!(approx(segs[0].from.x, 14.0));
        assert!(approx(segs[0].to.x, 22.0));
        for s in &segs {
            assert!(approx(s.to.x - s.from.x, 8.0));
            assert!(approx(s.from.y, 20.0));
        }
    }

    #[test]
    fn test_dash_longer_than_side_is_clamped() {
        let (starts, dash) = dash_layout(5.0, 8.0, 4.0);
        assert_eq!(starts, vec![0.0]);
        assert!(approx(dash, 5.0));
    }

    #[test]
    fn test_vertical_sides_run_top_down() {
        let data = BorderConfiguration {
            top: false,
            bottom: false,
            right: false,
            ..BorderConfiguration::dotted(2.0, 2.0)
        }
        .snapshot();
        let segs = segments(Rect::new(0.0, 0.0, 10.0, 20.0), &data);
        assert!(segs[0].from.y > segs[1].from.y);
        assert!(segs[0].from.y < 20.0);
    }

    #[test]
    fn test_solid_sides_follow_flags_and_colors() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let config = BorderConfiguration {
            top: true,
            left: true,
            left_color: red,
            ..BorderConfiguration::default()
        };
        let segs = segments(Rect::new(0.0, 0.0, 50.0, 30.0), &config.snapshot());
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].from, Point::new(0.0, 30.0));
        assert_eq!(segs[0].to, Point::new(50.0, 30.0));
        assert_eq!(segs[1].color, red);
    }

    #[test]
    fn test_snapshot_is_detached_from_config() {
        let mut config = BorderConfiguration::all();
        let data = config.snapshot();
        config.top = false;
        assert!(data.config().top);
    }

    #[test]
    fn test_draw_box_paints_background_underneath() {
        let mut list = DisplayList::default();
        let data = BorderConfiguration::all().snapshot();
        draw_box(&mut list, Rect::new(0.0, 0.0, 10.0, 10.0), &data, Some(Color::WHITE));
        assert_eq!(list.background.len(), 1);
        assert_eq!(list.lines().len(), 4);
    }

    #[test]
    fn test_validate_rejects_bad_dots() {
        assert!(BorderConfiguration::dotted(0.0, 1.0).validate().is_err());
        assert!(BorderConfiguration::dotted(1.0, -1.0).validate().is_err());
        let negative = BorderConfiguration {
            width: -1.0,
            ..BorderConfiguration::all()
        };
        assert!(negative.validate().is_err());
    }
}
