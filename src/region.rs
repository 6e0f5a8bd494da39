//! # Page Header / Footer
//!
//! A fixed-height band at the top or bottom of every physical page of a
//! logical page. It is rendered once per physical page, with its own cursor,
//! height budget and wrap bounds, and paging disabled: content that does not
//! fit is an error instead of a page break.

use serde::{Deserialize, Serialize};

use crate::border::{draw_box, BorderConfiguration};
use crate::component::{Block, Component};
use crate::context::{Context, RegionKind};
use crate::error::LayoutError;
use crate::style::{Color, Edges, PageGeometry};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRegion {
    /// Required. The band's outer height in points.
    #[serde(default)]
    pub height: Option<f64>,
    /// Inset of the content box inside the band.
    #[serde(default)]
    pub margin: Edges,
    #[serde(default)]
    pub border: Option<BorderConfiguration>,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub components: Vec<Block>,
}

impl PageRegion {
    pub fn new(height: f64) -> Self {
        Self {
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn with_component(mut self, component: impl Into<Block>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn with_border(mut self, border: BorderConfiguration) -> Self {
        self.border = Some(border);
        self
    }

    pub(crate) fn validated_height(
        &self,
        name: &'static str,
        geometry: &PageGeometry,
    ) -> Result<f64, LayoutError> {
        let height = self
            .height
            .ok_or_else(|| LayoutError::config(format!("{name} height is required")))?;
        if height <= 0.0 {
            return Err(LayoutError::config(format!("{name} height must be positive")));
        }
        if height > geometry.content_height() {
            return Err(LayoutError::RegionTooTall {
                region: name,
                height,
                available: geometry.content_height(),
            });
        }
        self.margin.validate(name)?;
        if self.margin.vertical() > height {
            return Err(LayoutError::config(format!(
                "{name} margins are taller than the {name}"
            )));
        }
        if let Some(border) = &self.border {
            border.validate()?;
        }
        Ok(height)
    }

    /// Draw the band on the current page unless it is already there.
    pub(crate) fn render(&self, ctx: &mut Context, kind: RegionKind) -> Result<(), LayoutError> {
        if ctx.region_rendered(kind) {
            return Ok(());
        }
        log::debug!("rendering {} on page {}", kind.name(), ctx.current_page().0 + 1);

        let saved = ctx.save_state();
        ctx.enter_region(kind);
        let result = self
            .components
            .iter()
            .try_for_each(|component| component.render(ctx));
        if result.is_ok() && (self.border.is_some() || self.background.is_some()) {
            let rect = ctx.region_rect(kind);
            let data = self.border.clone().unwrap_or_default().snapshot();
            draw_box(ctx.surface(), rect, &data, self.background);
        }
        ctx.restore_state(saved);
        result?;

        ctx.mark_region_rendered(kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Text;
    use crate::font::FontBook;
    use crate::style::Edges;
    use std::rc::Rc;

    fn geometry() -> PageGeometry {
        PageGeometry::new(200.0, 200.0, Edges::uniform(10.0))
    }

    #[test]
    fn test_header_renders_once_per_page() {
        let mut ctx = Context::new(Rc::new(FontBook::new()));
        let header = Rc::new(
            PageRegion::new(30.0)
                .with_component(Text::new("Title"))
                .with_border(BorderConfiguration::all()),
        );
        ctx.begin_page(geometry(), Some(Rc::clone(&header)), None)
            .unwrap();
        header.render(&mut ctx, RegionKind::Header).unwrap();

        let pages = ctx.take_pages().into_pages();
        assert_eq!(pages[0].display.texts(), vec!["Title"]);
        assert_eq!(pages[0].display.lines().len(), 4);
    }

    #[test]
    fn test_header_text_sits_inside_band() {
        let mut ctx = Context::new(Rc::new(FontBook::new()));
        let mut region = PageRegion::new(30.0).with_component(Text::new("Title"));
        region.margin = Edges::symmetric(5.0, 8.0);
        ctx.begin_page(geometry(), Some(Rc::new(region)), None).unwrap();
        // body cursor is untouched by the header render
        assert_eq!(ctx.cursor().x, 10.0);
        assert_eq!(ctx.cursor().y, 160.0);

        let pages = ctx.take_pages().into_pages();
        match pages[0].display.foreground.first() {
            Some(crate::surface::DrawOp::Text { origin, .. }) => {
                assert_eq!(origin.x, 18.0);
                assert!(origin.y < 185.0 && origin.y > 160.0);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_height_is_rejected() {
        let region = PageRegion::new(0.0);
        assert!(region.validated_height("footer", &geometry()).is_err());
    }
}
