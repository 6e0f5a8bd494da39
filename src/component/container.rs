//! Bordered boxes around child blocks, and explicit page breaks.
//!
//! A container opens a border before its children render and closes it after.
//! When a child pages, the border paging event cuts the box at the bottom of
//! the page and continues it at the top of the next one.

use serde::{Deserialize, Serialize};

use crate::border::BorderConfiguration;
use crate::component::{stacked_height, widest, Block, Component};
use crate::context::{Context, EPSILON};
use crate::error::LayoutError;
use crate::paging::{BorderInfo, FragmentEdge};
use crate::style::{Color, Edges};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default)]
    pub components: Vec<Block>,
    #[serde(default = "BorderConfiguration::all")]
    pub border: BorderConfiguration,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub padding: Edges,
    #[serde(default)]
    pub margin: Edges,
    /// Defaults to the full wrap width.
    #[serde(default)]
    pub width: Option<f64>,
    /// Close the box at the bottom of each page and reopen it on the next.
    #[serde(default)]
    pub is_paging_border: bool,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            border: BorderConfiguration::all(),
            background: None,
            padding: Edges::default(),
            margin: Edges::default(),
            width: None,
            is_paging_border: false,
        }
    }
}

impl Container {
    pub fn new(components: Vec<Block>) -> Self {
        Self {
            components,
            ..Self::default()
        }
    }

    pub fn with_padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn paging_border(mut self, is_paging_border: bool) -> Self {
        self.is_paging_border = is_paging_border;
        self
    }

    fn validate(&self) -> Result<(), LayoutError> {
        self.border.validate()?;
        self.padding.validate("container padding")?;
        self.margin.validate("container margin")
    }

    fn outer_width(&self, ctx: &Context) -> f64 {
        let available = ctx.wrap_width() - self.margin.horizontal();
        self.width.map_or(available, |w| w.min(available))
    }

    /// Run `f` with the wrap bounds set to the content box.
    fn inside<R>(&self, ctx: &mut Context, f: impl FnOnce(&mut Context) -> R) -> R {
        let x = ctx.wrap_begin_x() + self.margin.left + self.padding.left;
        let width = self.outer_width(ctx) - self.padding.horizontal();
        ctx.with_wrap(x, width, f)
    }

    fn content_height(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        let children = self.inside(ctx, |ctx| stacked_height(&self.components, ctx))?;
        Ok(children + self.padding.vertical())
    }
}

impl Component for Container {
    fn required_height(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        Ok(self.content_height(ctx)? + self.margin.vertical())
    }

    fn required_width(&self, ctx: &mut Context) -> Result<f64, LayoutError> {
        self.validate()?;
        if self.width.is_some() {
            return Ok(self.outer_width(ctx) + self.margin.horizontal());
        }
        let children = self.inside(ctx, |ctx| widest(&self.components, ctx))?;
        Ok(children + self.padding.horizontal() + self.margin.horizontal())
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        self.validate()?;
        let height = self.content_height(ctx)?;
        // a box that fits here but leaves no room for its bottom margin moves whole
        let total = height + self.margin.vertical();
        let moves_whole = !ctx.fits(total)
            && ctx.fits(total - self.margin.bottom)
            && total <= ctx.empty_page_height() + EPSILON;
        if moves_whole {
            ctx.ensure_room(total)?;
        } else {
            ctx.ensure_room(self.margin.top + self.padding.top)?;
        }
        ctx.consume(self.margin.top);

        let info = BorderInfo::new(
            self.border.snapshot(),
            ctx.wrap_begin_x() + self.margin.left,
            ctx.cursor().y,
            self.outer_width(ctx),
        )
        .with_background(self.background)
        .with_height(height)
        .with_edge(FragmentEdge::PageBottom)
        .paging_border(self.is_paging_border);
        let id = ctx.open_border(info);

        self.inside(ctx, |ctx| {
            ctx.advance_flow(self.padding.top)?;
            for component in &self.components {
                component.render(ctx)?;
            }
            ctx.advance_flow(self.padding.bottom)
        })?;

        ctx.close_border(id)?;
        ctx.consume(self.margin.bottom);
        Ok(())
    }
}

/// Forces the following content onto a continuation page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageBreak;

impl Component for PageBreak {
    fn required_height(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        Ok(0.0)
    }

    fn required_width(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        Ok(0.0)
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        ctx.break_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Text;
    use crate::font::FontBook;
    use crate::paging::FnPagingEvent;
    use crate::style::PageGeometry;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn page_context(body_height: f64) -> Context {
        let mut ctx = Context::new(Rc::new(FontBook::new()));
        let geometry = PageGeometry::new(120.0, body_height + 20.0, Edges::uniform(10.0));
        ctx.begin_page(geometry, None, None).unwrap();
        ctx
    }

    fn lines(n: usize) -> Block {
        let content: Vec<String> = (1..=n).map(|i| format!("line {i}")).collect();
        Text::new(content.join("\n"))
            .with_font("Courier", 10.0)
            .into()
    }

    fn horizontal_at(ops: &[(crate::style::Point, crate::style::Point)], y: f64) -> bool {
        ops.iter().any(|(a, b)| a.y == y && b.y == y)
    }

    #[test]
    fn test_box_fits_on_one_page() {
        let mut ctx = page_context(100.0);
        let container = Container::new(vec![lines(3)]).with_padding(Edges::uniform(5.0));
        assert_eq!(container.required_height(&mut ctx).unwrap(), 40.0);
        container.render(&mut ctx).unwrap();
        assert_eq!(ctx.cursor().y, 70.0);
        assert!(ctx.open_borders().is_empty());

        let pages = ctx.take_pages().into_pages();
        let ops = pages[0].display.lines();
        assert_eq!(ops.len(), 4);
        assert!(horizontal_at(&ops, 110.0));
        assert!(horizontal_at(&ops, 70.0));
    }

    #[test]
    fn test_box_continues_across_pages() {
        // 5 lines per page, 12 lines total: three pages
        let mut ctx = page_context(50.0);
        Container::new(vec![lines(12)]).render(&mut ctx).unwrap();
        assert_eq!(ctx.page_count(), 3);

        let pages = ctx.take_pages().into_pages();
        let first = pages[0].display.lines();
        assert!(horizontal_at(&first, 60.0));
        assert!(!horizontal_at(&first, 10.0));
        let middle = pages[1].display.lines();
        assert_eq!(middle.len(), 2);
        let last = pages[2].display.lines();
        assert!(!horizontal_at(&last, 60.0));
        assert!(horizontal_at(&last, 40.0));
    }

    #[test]
    fn test_bottom_margin_moves_box_to_next_page() {
        let spaced = |bottom| {
            let mut container =
                Container::new(vec![lines(3)]).with_padding(Edges::uniform(5.0));
            container.margin.bottom = bottom;
            container
        };

        // 40pt left: the 40pt box fits alone
        let mut ctx = page_context(50.0);
        ctx.consume(10.0);
        spaced(0.0).render(&mut ctx).unwrap();
        assert_eq!(ctx.page_count(), 1);

        // but not with 5pt below it
        let mut ctx = page_context(50.0);
        ctx.consume(10.0);
        spaced(5.0).render(&mut ctx).unwrap();
        assert_eq!(ctx.page_count(), 2);
        assert_eq!(ctx.cursor().y, 15.0);
        let pages = ctx.take_pages().into_pages();
        assert!(pages[0].display.is_empty());
        assert_eq!(pages[1].display.lines().len(), 4);
    }

    #[test]
    fn test_tall_box_reports_further_paging() {
        // 12 lines in 50pt pages: the box is cut twice
        let seen = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&seen);
        let mut ctx = page_context(50.0);
        ctx.add_paging_event(Rc::new(FnPagingEvent::new(
            move |ctx| {
                let flags = ctx.open_borders().iter().map(|b| b.needs_further_paging);
                record.borrow_mut().extend(flags);
                Ok(())
            },
            |_| Ok(()),
        )));
        Container::new(vec![lines(12)]).render(&mut ctx).unwrap();
        assert_eq!(ctx.page_count(), 3);
        // seen while leaving pages 1 and 2
        assert_eq!(*seen.borrow(), vec![false, true]);
    }

    #[test]
    fn test_paging_border_closes_each_fragment() {
        let mut ctx = page_context(50.0);
        Container::new(vec![lines(8)])
            .paging_border(true)
            .render(&mut ctx)
            .unwrap();
        let pages = ctx.take_pages().into_pages();
        assert!(horizontal_at(&pages[0].display.lines(), 10.0));
        assert!(horizontal_at(&pages[1].display.lines(), 60.0));
    }

    #[test]
    fn test_page_break_starts_continuation() {
        let mut ctx = page_context(50.0);
        PageBreak.render(&mut ctx).unwrap();
        assert_eq!(ctx.page_count(), 2);
        assert_eq!(ctx.logical_page_number(), 1);
        assert_eq!(ctx.cursor().y, 60.0);
    }
}
