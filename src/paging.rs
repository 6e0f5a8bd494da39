//! # Paging Events
//!
//! Strategies invoked around every page break. `before` runs while the
//! context still points at the page being left, `after` runs once the cursor
//! sits at the top of the continuation page.
//!
//! Border continuation is one such strategy: [`DefaultBorderPaging`] closes
//! every open [`BorderInfo`] on the page being left with a partial border and
//! re-anchors it on the new page, so one logical box can span any number of
//! physical pages.

use std::fmt;

use crate::border::{draw_box, BorderData};
use crate::context::{Context, EPSILON};
use crate::error::LayoutError;
use crate::page::PageIndex;
use crate::style::{Color, Rect};

pub trait PagingEvent: fmt::Debug {
    fn before(&self, ctx: &mut Context) -> Result<(), LayoutError>;
    fn after(&self, ctx: &mut Context) -> Result<(), LayoutError>;
}

type Hook = Box<dyn Fn(&mut Context) -> Result<(), LayoutError>>;

/// A paging event built from a pair of closures.
pub struct FnPagingEvent {
    before: Hook,
    after: Hook,
}

impl FnPagingEvent {
    pub fn new<B, A>(before: B, after: A) -> Self
    where
        B: Fn(&mut Context) -> Result<(), LayoutError> + 'static,
        A: Fn(&mut Context) -> Result<(), LayoutError> + 'static,
    {
        Self {
            before: Box::new(before),
            after: Box::new(after),
        }
    }
}

impl fmt::Debug for FnPagingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnPagingEvent")
    }
}

impl PagingEvent for FnPagingEvent {
    fn before(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        (self.before)(ctx)
    }

    fn after(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        (self.after)(ctx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderId(pub(crate) usize);

/// Where a border fragment ends when a break cuts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FragmentEdge {
    /// At the cursor: the box ended with the last content placed on the page.
    Cursor,
    /// At the bottom of the page's body: the box runs off the page.
    #[default]
    PageBottom,
}

/// Continuation state for one open border.
#[derive(Debug, Clone)]
pub struct BorderInfo {
    pub id: BorderId,
    pub data: BorderData,
    pub background: Option<Color>,
    pub begin_x: f64,
    pub begin_y: f64,
    pub width: f64,
    /// Height still to be drawn, when known up front.
    pub remaining: Option<f64>,
    pub paging_count: usize,
    /// Close and reopen the box on every page instead of leaving it open.
    pub is_paging_border: bool,
    pub edge: FragmentEdge,
    /// The page the current fragment starts on.
    pub page: PageIndex,
    /// Fragmented on the page being left, waiting to be re-anchored.
    pub pending: bool,
    /// The remaining height does not fit the page it was re-anchored on.
    pub needs_further_paging: bool,
}

impl BorderInfo {
    pub fn new(data: BorderData, begin_x: f64, begin_y: f64, width: f64) -> Self {
        Self {
            id: BorderId(0),
            data,
            background: None,
            begin_x,
            begin_y,
            width,
            remaining: None,
            paging_count: 0,
            is_paging_border: false,
            edge: FragmentEdge::PageBottom,
            page: PageIndex(0),
            pending: false,
            needs_further_paging: false,
        }
    }

    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.remaining = Some(height);
        self
    }

    pub fn with_edge(mut self, edge: FragmentEdge) -> Self {
        self.edge = edge;
        self
    }

    pub fn paging_border(mut self, is_paging_border: bool) -> Self {
        self.is_paging_border = is_paging_border;
        self
    }

    /// Side flags for a fragment cut by a page break.
    pub(crate) fn fragment_data(&self) -> BorderData {
        if self.is_paging_border {
            self.data.with_vertical_ends(true, true)
        } else {
            let top = self.data.config().top && self.paging_count == 0;
            self.data.with_vertical_ends(top, false)
        }
    }

    /// Side flags for the fragment that finishes the box.
    pub(crate) fn final_data(&self) -> BorderData {
        let config = self.data.config();
        let top = if self.paging_count == 0 {
            config.top
        } else {
            self.is_paging_border
        };
        self.data.with_vertical_ends(top, config.bottom)
    }

    /// Cut this border at `bottom`, returning the fragment to draw.
    pub(crate) fn cut(&mut self, bottom: f64) -> (Rect, BorderData) {
        let consumed = (self.begin_y - bottom).abs();
        let rect = Rect::new(self.begin_x, self.begin_y - consumed, self.width, consumed);
        let data = self.fragment_data();
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = (*remaining - consumed).max(0.0);
        }
        self.paging_count += 1;
        (rect, data)
    }
}

/// Splits open borders at a page break and continues them on the next page.
#[derive(Debug, Default)]
pub struct DefaultBorderPaging;

impl PagingEvent for DefaultBorderPaging {
    fn before(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        let page = ctx.current_page();
        let floor = ctx.floor();
        let cursor_y = ctx.cursor().y;

        let mut fragments = Vec::new();
        for info in ctx
            .borders_mut()
            .iter_mut()
            .filter(|info| info.page == page && !info.pending)
        {
            let bottom = match info.edge {
                FragmentEdge::Cursor => cursor_y.max(floor),
                FragmentEdge::PageBottom => floor,
            };
            let (rect, data) = info.cut(bottom);
            info.pending = true;
            fragments.push((rect, data, info.background));
        }

        let surface = ctx.surface();
        for (rect, data, background) in &fragments {
            draw_box(surface, *rect, data, *background);
        }
        Ok(())
    }

    fn after(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        let page = ctx.current_page();
        let begin_y = ctx.cursor().y;
        let available = ctx.remaining_height();
        for info in ctx.borders_mut().iter_mut().filter(|info| info.pending) {
            info.page = page;
            info.begin_y = begin_y;
            info.pending = false;
            info.needs_further_paging = info
                .remaining
                .is_some_and(|remaining| remaining > available + EPSILON);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::BorderConfiguration;

    #[test]
    fn test_fragment_leaves_bottom_open() {
        let mut info = BorderInfo::new(BorderConfiguration::all().snapshot(), 10.0, 100.0, 50.0);
        let (rect, data) = info.cut(40.0);
        assert_eq!(rect, Rect::new(10.0, 40.0, 50.0, 60.0));
        assert!(data.config().top);
        assert!(!data.config().bottom);

        // the second fragment is open at both ends
        info.begin_y = 200.0;
        let (_, data) = info.cut(40.0);
        assert!(!data.config().top);
        assert!(!data.config().bottom);

        let last = info.final_data();
        assert!(!last.config().top);
        assert!(last.config().bottom);
    }

    #[test]
    fn test_paging_border_closes_every_fragment() {
        let mut info = BorderInfo::new(BorderConfiguration::all().snapshot(), 0.0, 100.0, 50.0)
            .paging_border(true);
        info.cut(0.0);
        let (_, data) = info.cut(0.0);
        assert!(data.config().top && data.config().bottom);
        assert!(info.final_data().config().top);
    }

    #[test]
    fn test_cut_tracks_remaining_height() {
        let mut info = BorderInfo::new(BorderConfiguration::all().snapshot(), 0.0, 100.0, 50.0)
            .with_height(150.0);
        info.cut(20.0);
        assert_eq!(info.remaining, Some(70.0));
        assert_eq!(info.paging_count, 1);
    }
}
