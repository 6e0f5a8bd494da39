//! # Layout Context
//!
//! The mutable layout state threaded through every component call: the
//! cursor, the current page and its regions, the vertical budget, the
//! horizontal wrap bounds, page counters and the open borders.
//!
//! Space accounting is cursor based. The region being rendered has a top
//! (set by [`Context::reset_cursor`]) and a height budget (set by
//! [`Context::reset_height`]); their difference is the floor, and the room
//! left is the distance from the cursor down to that floor.
//!
//! Every region transition re-derives the cursor, the height budget and the
//! wrap bounds through the four `reset_*` methods. Passing `None` derives the
//! value from the current page and region, passing a value uses it verbatim.

use std::collections::HashMap;
use std::rc::Rc;

use crate::border::draw_box;
use crate::error::LayoutError;
use crate::font::{FontBook, FontMetrics, UNKNOWN_GLYPH_WIDTH};
use crate::page::{Page, PageArena, PageIndex};
use crate::paging::{BorderId, BorderInfo, DefaultBorderPaging, FragmentEdge, PagingEvent};
use crate::outline::OutlineItem;
use crate::region::PageRegion;
use crate::style::{Edges, PageGeometry, Rect};
use crate::surface::{NullSurface, Surface};
use crate::watermark::Watermark;

/// Tolerance for floating point comparisons against the remaining budget.
pub const EPSILON: f64 = 1e-6;

/// The pen position, in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Body,
    Header,
    Footer,
}

impl RegionKind {
    pub fn name(&self) -> &'static str {
        match self {
            RegionKind::Body => "body",
            RegionKind::Header => "header",
            RegionKind::Footer => "footer",
        }
    }
}

/// A header or footer attached to the current page, with its validated height.
#[derive(Debug, Clone)]
struct RegionSlot {
    region: Rc<PageRegion>,
    height: f64,
}

/// A position in the flow: a page of the current chain and a y on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowPoint {
    pub page: PageIndex,
    pub depth: usize,
    pub y: f64,
}

impl FlowPoint {
    /// Whether `self` lies further down the flow than `other`.
    pub fn is_after(&self, other: &FlowPoint) -> bool {
        self.depth > other.depth || (self.depth == other.depth && self.y < other.y)
    }
}

/// The parts of the state a nested region overrides and must give back.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SavedState {
    cursor: Cursor,
    region: RegionKind,
    region_top: f64,
    height: f64,
    wrap_begin_x: f64,
    wrap_width: f64,
}

pub struct Context {
    pages: PageArena,
    current: PageIndex,
    geometry: PageGeometry,
    cursor: Cursor,
    header: Option<RegionSlot>,
    footer: Option<RegionSlot>,
    region: RegionKind,
    region_top: f64,
    height: f64,
    wrap_begin_x: f64,
    wrap_width: f64,
    page_count: usize,
    total_pages: usize,
    is_virtual_render: bool,
    is_already_paging: bool,
    fresh_page: bool,
    borders: Vec<BorderInfo>,
    next_border_id: usize,
    events: Vec<Rc<dyn PagingEvent>>,
    border_event: Rc<dyn PagingEvent>,
    watermarks: Rc<[Watermark]>,
    bookmarks: Vec<OutlineItem>,
    fonts: Rc<FontBook>,
    font_cache: HashMap<String, Option<Rc<FontMetrics>>>,
    null_surface: NullSurface,
}

impl Context {
    pub fn new(fonts: Rc<FontBook>) -> Self {
        Self {
            pages: PageArena::new(),
            current: PageIndex(0),
            geometry: PageGeometry::default(),
            cursor: Cursor::default(),
            header: None,
            footer: None,
            region: RegionKind::Body,
            region_top: 0.0,
            height: 0.0,
            wrap_begin_x: 0.0,
            wrap_width: 0.0,
            page_count: 0,
            total_pages: 0,
            is_virtual_render: false,
            is_already_paging: false,
            fresh_page: false,
            borders: Vec::new(),
            next_border_id: 0,
            events: Vec::new(),
            border_event: Rc::new(DefaultBorderPaging),
            watermarks: Rc::from(Vec::new()),
            bookmarks: Vec::new(),
            fonts,
            font_cache: HashMap::new(),
            null_surface: NullSurface,
        }
    }

    /// Start a layout pass from an empty page arena. The font cache survives.
    pub fn start_pass(&mut self, is_virtual_render: bool, total_pages: usize) {
        self.pages = PageArena::new();
        self.current = PageIndex(0);
        self.page_count = 0;
        self.total_pages = total_pages;
        self.is_virtual_render = is_virtual_render;
        self.is_already_paging = false;
        self.fresh_page = false;
        self.borders.clear();
        self.bookmarks.clear();
        self.watermarks = Rc::from(Vec::new());
        self.header = None;
        self.footer = None;
        self.region = RegionKind::Body;
    }

    /// Drop everything the context references and flush the font cache.
    pub fn clear(&mut self) {
        self.font_cache.clear();
        self.borders.clear();
        self.events.clear();
        self.bookmarks.clear();
        self.watermarks = Rc::from(Vec::new());
        self.header = None;
        self.footer = None;
    }

    pub fn take_pages(&mut self) -> PageArena {
        std::mem::take(&mut self.pages)
    }

    pub fn add_bookmark(&mut self, item: OutlineItem) {
        self.bookmarks.push(item);
    }

    /// Bookmarks recorded in this pass, in layout order.
    pub fn bookmarks(&self) -> &[OutlineItem] {
        &self.bookmarks
    }

    pub fn take_bookmarks(&mut self) -> Vec<OutlineItem> {
        std::mem::take(&mut self.bookmarks)
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn pages(&self) -> &PageArena {
        &self.pages
    }

    pub fn current_page(&self) -> PageIndex {
        self.current
    }

    pub fn page(&self) -> &Page {
        self.pages.get(self.current)
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn region(&self) -> RegionKind {
        self.region
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn wrap_begin_x(&self) -> f64 {
        self.wrap_begin_x
    }

    pub fn wrap_width(&self) -> f64 {
        self.wrap_width
    }

    /// Physical pages created so far in this pass.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Total physical pages, as measured by the virtual pass.
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Number of the logical page the cursor is on, continuation pages included.
    pub fn logical_page_number(&self) -> usize {
        self.page().id
    }

    pub fn is_virtual_render(&self) -> bool {
        self.is_virtual_render
    }

    pub fn set_virtual_render(&mut self, is_virtual_render: bool) {
        self.is_virtual_render = is_virtual_render;
    }

    pub fn is_already_paging(&self) -> bool {
        self.is_already_paging
    }

    /// Whether the break in progress created the page it moved to.
    pub fn is_fresh_page(&self) -> bool {
        self.fresh_page
    }

    /// Mark the start of a top-level component.
    pub fn begin_component(&mut self) {
        self.is_already_paging = false;
    }

    /// Body height of a page with nothing on it yet.
    pub fn empty_page_height(&self) -> f64 {
        self.body_height()
    }

    pub fn header_height(&self) -> f64 {
        self.header.as_ref().map_or(0.0, |slot| slot.height)
    }

    pub fn footer_height(&self) -> f64 {
        self.footer.as_ref().map_or(0.0, |slot| slot.height)
    }

    // ── Reset protocol ─────────────────────────────────────────

    fn region_margin(&self) -> Edges {
        let slot = match self.region {
            RegionKind::Body => None,
            RegionKind::Header => self.header.as_ref(),
            RegionKind::Footer => self.footer.as_ref(),
        };
        slot.map_or(Edges::default(), |slot| slot.region.margin)
    }

    fn body_top(&self) -> f64 {
        self.geometry.height() - self.geometry.margin.top - self.header_height()
    }

    fn body_height(&self) -> f64 {
        self.geometry.content_height() - self.header_height() - self.footer_height()
    }

    fn body_floor(&self) -> f64 {
        self.geometry.margin.bottom + self.footer_height()
    }

    /// Move the cursor to the content-box origin of the current region.
    pub fn reset_cursor(&mut self) {
        let g = self.geometry;
        let m = self.region_margin();
        let (x, y) = match self.region {
            RegionKind::Body => (g.margin.left, self.body_top()),
            RegionKind::Header => (g.margin.left + m.left, g.height() - g.margin.top - m.top),
            RegionKind::Footer => (
                g.margin.left + m.left,
                g.margin.bottom + self.footer_height() - m.top,
            ),
        };
        self.cursor = Cursor { x, y };
        self.region_top = y;
    }

    pub fn reset_height(&mut self, height: Option<f64>) {
        self.height = height.unwrap_or_else(|| match self.region {
            RegionKind::Body => self.body_height(),
            RegionKind::Header => self.header_height() - self.region_margin().vertical(),
            RegionKind::Footer => self.footer_height() - self.region_margin().vertical(),
        });
    }

    pub fn reset_wrap_width(&mut self, width: Option<f64>) {
        self.wrap_width = width.unwrap_or_else(|| {
            self.geometry.content_width() - self.region_margin().horizontal()
        });
    }

    pub fn reset_wrap_begin_x(&mut self, begin_x: Option<f64>) {
        self.wrap_begin_x =
            begin_x.unwrap_or_else(|| self.geometry.margin.left + self.region_margin().left);
    }

    fn reset_all(&mut self) {
        self.reset_height(None);
        self.reset_cursor();
        self.reset_wrap_width(None);
        self.reset_wrap_begin_x(None);
    }

    // ── Space accounting ───────────────────────────────────────

    /// The lowest y content of the current region may reach.
    pub fn floor(&self) -> f64 {
        self.region_top - self.height
    }

    pub fn remaining_height(&self) -> f64 {
        self.cursor.y - self.floor()
    }

    pub fn fits(&self, height: f64) -> bool {
        height <= self.remaining_height() + EPSILON
    }

    /// Move the cursor down by `dy` without paging, stopping at the floor.
    pub fn consume(&mut self, dy: f64) {
        self.cursor.y = (self.cursor.y - dy).max(self.floor());
    }

    pub fn set_cursor_x(&mut self, x: f64) {
        self.cursor.x = x;
    }

    /// Make sure `height` fits below the cursor, breaking to a new page once
    /// if it does not. Returns whether a break happened.
    pub fn ensure_room(&mut self, height: f64) -> Result<bool, LayoutError> {
        if self.fits(height) {
            return Ok(false);
        }
        if self.region != RegionKind::Body {
            return Err(LayoutError::RegionOverflow {
                needed: height,
                available: self.remaining_height(),
            });
        }
        let empty = self.body_height();
        if height > empty + EPSILON {
            return Err(LayoutError::ComponentTooTall {
                needed: height,
                available: empty,
            });
        }
        self.break_page()?;
        if !self.fits(height) {
            return Err(LayoutError::ComponentTooTall {
                needed: height,
                available: self.remaining_height(),
            });
        }
        Ok(true)
    }

    /// Move down the flow by `dy`, continuing onto further pages as needed.
    pub fn advance_flow(&mut self, dy: f64) -> Result<(), LayoutError> {
        let mut left = dy;
        loop {
            let room = self.remaining_height();
            if left <= room + EPSILON {
                self.consume(left);
                return Ok(());
            }
            if self.region != RegionKind::Body {
                return Err(LayoutError::RegionOverflow {
                    needed: left,
                    available: room,
                });
            }
            left -= room.max(0.0);
            self.break_page()?;
            if self.remaining_height() <= EPSILON {
                return Err(LayoutError::ComponentTooTall {
                    needed: left,
                    available: 0.0,
                });
            }
        }
    }

    pub fn flow_point(&self) -> FlowPoint {
        FlowPoint {
            page: self.current,
            depth: self.pages.depth(self.current),
            y: self.cursor.y,
        }
    }

    /// Return to an earlier position of the current page chain.
    pub fn goto(&mut self, point: FlowPoint) {
        self.current = point.page;
        self.cursor.y = point.y;
    }

    /// Run `f` with the wrap bounds narrowed to `begin_x`/`width`.
    pub fn with_wrap<R>(&mut self, begin_x: f64, width: f64, f: impl FnOnce(&mut Self) -> R) -> R {
        let (saved_x, saved_width) = (self.wrap_begin_x, self.wrap_width);
        self.reset_wrap_begin_x(Some(begin_x));
        self.reset_wrap_width(Some(width));
        self.cursor.x = begin_x;
        let result = f(self);
        self.wrap_begin_x = saved_x;
        self.wrap_width = saved_width;
        self.cursor.x = saved_x;
        result
    }

    // ── Pages ──────────────────────────────────────────────────

    /// Open a new logical page and render its header and footer.
    pub fn begin_page(
        &mut self,
        geometry: PageGeometry,
        header: Option<Rc<PageRegion>>,
        footer: Option<Rc<PageRegion>>,
    ) -> Result<(), LayoutError> {
        geometry.validate()?;
        let header = header
            .map(|region| slot(region, RegionKind::Header, &geometry))
            .transpose()?;
        let footer = footer
            .map(|region| slot(region, RegionKind::Footer, &geometry))
            .transpose()?;
        let reserved = header.as_ref().map_or(0.0, |s| s.height)
            + footer.as_ref().map_or(0.0, |s| s.height);
        if reserved >= geometry.content_height() {
            return Err(LayoutError::RegionTooTall {
                region: "header and footer",
                height: reserved,
                available: geometry.content_height(),
            });
        }

        let index = self.pages.push_logical(geometry);
        self.page_count += 1;
        self.current = index;
        self.geometry = geometry;
        self.header = header;
        self.footer = footer;
        self.region = RegionKind::Body;
        self.is_already_paging = false;
        self.reset_all();
        log::debug!("page {} (logical {})", self.page_count, self.page().id);

        self.render_watermarks()?;
        self.render_regions()?;
        let top = self.cursor.y;
        self.pages.get_mut(index).flow_top = Some(top);
        Ok(())
    }

    /// Continue on the next page of the chain, creating it if needed.
    ///
    /// Runs the border event and user events around the transition, renders
    /// the header and footer on fresh pages, and keeps the current wrap
    /// bounds so nested content continues in the same column.
    pub fn break_page(&mut self) -> Result<(), LayoutError> {
        if self.region != RegionKind::Body {
            return Err(LayoutError::config(format!(
                "cannot break the page inside a {}",
                self.region.name()
            )));
        }
        let border_event = Rc::clone(&self.border_event);
        let events = self.events.clone();

        border_event.before(self)?;
        for event in &events {
            event.before(self)?;
        }

        let (next, fresh) = match self.pages.sub_page(self.current) {
            Some(sub) => (sub, false),
            None => (self.pages.create_sub_page(self.current), true),
        };
        if fresh {
            self.page_count += 1;
        }
        self.current = next;
        self.fresh_page = fresh;
        self.is_already_paging = true;
        log::debug!(
            "page break to physical page {} (logical {}, {})",
            next.0 + 1,
            self.page().id,
            if fresh { "new" } else { "reused" }
        );

        let (begin_x, width) = (self.wrap_begin_x, self.wrap_width);
        self.reset_height(None);
        self.reset_cursor();
        self.reset_wrap_begin_x(Some(begin_x));
        self.reset_wrap_width(Some(width));
        self.cursor.x = begin_x;

        if fresh {
            self.render_watermarks()?;
            self.render_regions()?;
            for event in &events {
                event.after(self)?;
            }
            let top = self.cursor.y;
            self.pages.get_mut(next).flow_top = Some(top);
        } else {
            if let Some(top) = self.page().flow_top {
                self.cursor.y = top;
            }
            for event in &events {
                event.after(self)?;
            }
        }
        border_event.after(self)?;
        self.fresh_page = false;
        Ok(())
    }

    /// Watermarks stamped on every physical page of the logical pages that
    /// follow, until replaced.
    pub fn set_watermarks(&mut self, watermarks: Rc<[Watermark]>) {
        self.watermarks = watermarks;
    }

    fn render_watermarks(&mut self) -> Result<(), LayoutError> {
        let watermarks = Rc::clone(&self.watermarks);
        watermarks.iter().try_for_each(|mark| mark.render(self))
    }

    fn render_regions(&mut self) -> Result<(), LayoutError> {
        if let Some(header) = self.header.as_ref().map(|s| Rc::clone(&s.region)) {
            header.render(self, RegionKind::Header)?;
        }
        if let Some(footer) = self.footer.as_ref().map(|s| Rc::clone(&s.region)) {
            footer.render(self, RegionKind::Footer)?;
        }
        Ok(())
    }

    pub(crate) fn region_rendered(&self, kind: RegionKind) -> bool {
        match kind {
            RegionKind::Body => false,
            RegionKind::Header => self.page().header_rendered,
            RegionKind::Footer => self.page().footer_rendered,
        }
    }

    pub(crate) fn mark_region_rendered(&mut self, kind: RegionKind) {
        let page = self.pages.get_mut(self.current);
        match kind {
            RegionKind::Body => {}
            RegionKind::Header => page.header_rendered = true,
            RegionKind::Footer => page.footer_rendered = true,
        }
    }

    /// The outer rectangle of a header or footer on the current page.
    pub(crate) fn region_rect(&self, kind: RegionKind) -> Rect {
        let g = &self.geometry;
        let width = g.content_width();
        match kind {
            RegionKind::Header => {
                let h = self.header_height();
                Rect::new(g.margin.left, g.height() - g.margin.top - h, width, h)
            }
            RegionKind::Footer => {
                Rect::new(g.margin.left, g.margin.bottom, width, self.footer_height())
            }
            RegionKind::Body => {
                Rect::new(g.margin.left, self.body_floor(), width, self.body_height())
            }
        }
    }

    pub(crate) fn save_state(&self) -> SavedState {
        SavedState {
            cursor: self.cursor,
            region: self.region,
            region_top: self.region_top,
            height: self.height,
            wrap_begin_x: self.wrap_begin_x,
            wrap_width: self.wrap_width,
        }
    }

    pub(crate) fn restore_state(&mut self, saved: SavedState) {
        self.cursor = saved.cursor;
        self.region = saved.region;
        self.region_top = saved.region_top;
        self.height = saved.height;
        self.wrap_begin_x = saved.wrap_begin_x;
        self.wrap_width = saved.wrap_width;
    }

    /// Switch to a header or footer and derive its cursor, budget and wrap.
    pub(crate) fn enter_region(&mut self, kind: RegionKind) {
        self.region = kind;
        self.reset_all();
    }

    // ── Paging events ──────────────────────────────────────────

    pub fn set_paging_events(&mut self, events: Vec<Rc<dyn PagingEvent>>) {
        self.events = events;
    }

    pub fn add_paging_event(&mut self, event: Rc<dyn PagingEvent>) {
        self.events.push(event);
    }

    /// Remove a previously added event, compared by identity.
    pub fn remove_paging_event(&mut self, event: &Rc<dyn PagingEvent>) {
        self.events.retain(|e| !Rc::ptr_eq(e, event));
    }

    /// Replace the border continuation strategy.
    pub fn set_border_paging(&mut self, event: Rc<dyn PagingEvent>) {
        self.border_event = event;
    }

    // ── Borders ────────────────────────────────────────────────

    /// Start tracking a border that may continue across page breaks.
    pub fn open_border(&mut self, mut info: BorderInfo) -> BorderId {
        let id = BorderId(self.next_border_id);
        self.next_border_id += 1;
        info.id = id;
        info.page = self.current;
        info.pending = false;
        self.borders.push(info);
        id
    }

    pub fn open_borders(&self) -> &[BorderInfo] {
        &self.borders
    }

    pub(crate) fn borders_mut(&mut self) -> &mut Vec<BorderInfo> {
        &mut self.borders
    }

    pub fn set_border_edge(&mut self, id: BorderId, edge: FragmentEdge) {
        if let Some(info) = self.borders.iter_mut().find(|b| b.id == id) {
            info.edge = edge;
        }
    }

    /// Finish a border at the cursor.
    ///
    /// A border left behind on an earlier page of the chain is first carried
    /// down page by page to the cursor's page.
    pub fn close_border(&mut self, id: BorderId) -> Result<(), LayoutError> {
        let Some(pos) = self.borders.iter().position(|b| b.id == id) else {
            return Ok(());
        };
        let mut info = self.borders.remove(pos);
        let floor = self.body_floor();
        let target_depth = self.pages.depth(self.current);

        while info.page != self.current && self.pages.depth(info.page) < target_depth {
            let Some(next) = self.pages.sub_page(info.page) else {
                break;
            };
            let (rect, data) = info.cut(floor);
            let page = info.page;
            draw_box(self.surface_on(page), rect, &data, info.background);
            info.page = next;
            info.begin_y = self.pages.get(next).flow_top.unwrap_or(self.body_top());
        }

        let bottom = self.cursor.y;
        let height = (info.begin_y - bottom).max(0.0);
        let rect = Rect::new(info.begin_x, bottom, info.width, height);
        let data = info.final_data();
        let page = info.page;
        draw_box(self.surface_on(page), rect, &data, info.background);
        Ok(())
    }

    // ── Drawing ────────────────────────────────────────────────

    /// The surface of the current page, or a sink during the virtual pass.
    pub fn surface(&mut self) -> &mut dyn Surface {
        let page = self.current;
        self.surface_on(page)
    }

    pub fn surface_on(&mut self, page: PageIndex) -> &mut dyn Surface {
        if self.is_virtual_render {
            &mut self.null_surface
        } else {
            &mut self.pages.get_mut(page).display
        }
    }

    // ── Fonts ──────────────────────────────────────────────────

    fn metrics(&mut self, font: &str) -> Option<Rc<FontMetrics>> {
        if let Some(cached) = self.font_cache.get(font) {
            return cached.clone();
        }
        let resolved = self.fonts.lookup(font).map(Rc::new);
        self.font_cache.insert(font.to_string(), resolved.clone());
        resolved
    }

    /// Width of `ch` in points: the requested font, then each special font,
    /// then the unknown glyph placeholder.
    pub fn char_width(&mut self, font: &str, ch: char, size: f64) -> f64 {
        if let Some(w) = self.metrics(font).and_then(|m| m.advance(ch)) {
            return w * size / 1000.0;
        }
        let book = Rc::clone(&self.fonts);
        for special in book.special_fonts() {
            if let Some(w) = self.metrics(special).and_then(|m| m.advance(ch)) {
                return w * size / 1000.0;
            }
        }
        log::trace!("no glyph for {ch:?} in {font} or fallbacks");
        UNKNOWN_GLYPH_WIDTH as f64 * size / 1000.0
    }

    pub fn string_width(&mut self, font: &str, text: &str, size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(font, ch, size)).sum()
    }
}

fn slot(
    region: Rc<PageRegion>,
    kind: RegionKind,
    geometry: &PageGeometry,
) -> Result<RegionSlot, LayoutError> {
    let height = region.validated_height(kind.name(), geometry)?;
    Ok(RegionSlot { region, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::BorderConfiguration;
    use crate::component::{Image, Text};

    fn context() -> Context {
        Context::new(Rc::new(FontBook::new()))
    }

    fn geometry() -> PageGeometry {
        // body: 100pt wide, 200pt tall, top at y = 220
        let margin = Edges {
            top: 80.0,
            right: 20.0,
            bottom: 20.0,
            left: 20.0,
        };
        PageGeometry::new(140.0, 300.0, margin)
    }

    fn header(height: f64) -> Rc<PageRegion> {
        Rc::new(PageRegion::new(height).with_component(Text::new("head")))
    }

    #[test]
    fn test_reset_derives_from_page() {
        let mut ctx = context();
        ctx.begin_page(geometry(), None, None).unwrap();
        assert_eq!(ctx.cursor(), Cursor { x: 20.0, y: 220.0 });
        assert_eq!(ctx.height(), 200.0);
        assert_eq!(ctx.wrap_width(), 100.0);
        assert_eq!(ctx.wrap_begin_x(), 20.0);
        assert_eq!(ctx.remaining_height(), 200.0);
        assert_eq!(ctx.floor(), 20.0);
    }

    #[test]
    fn test_explicit_reset_values_win() {
        let mut ctx = context();
        ctx.begin_page(geometry(), None, None).unwrap();
        ctx.reset_height(Some(50.0));
        ctx.reset_wrap_width(Some(30.0));
        ctx.reset_wrap_begin_x(Some(42.0));
        assert_eq!(ctx.height(), 50.0);
        assert_eq!(ctx.wrap_width(), 30.0);
        assert_eq!(ctx.wrap_begin_x(), 42.0);
        assert_eq!(ctx.remaining_height(), 50.0);
    }

    #[test]
    fn test_header_and_footer_narrow_the_body() {
        let mut ctx = context();
        let footer = Rc::new(PageRegion::new(30.0));
        ctx.begin_page(geometry(), Some(header(40.0)), Some(footer)).unwrap();
        assert_eq!(ctx.cursor().y, 180.0);
        assert_eq!(ctx.height(), 130.0);
        assert_eq!(ctx.floor(), 50.0);
        assert_eq!(ctx.region(), RegionKind::Body);
        assert!(ctx.page().header_rendered);
        assert!(ctx.page().footer_rendered);
    }

    #[test]
    fn test_transition_rederives_budget() {
        let mut ctx = context();
        ctx.begin_page(geometry(), Some(header(40.0)), None).unwrap();
        ctx.consume(100.0);
        ctx.reset_height(Some(10.0));
        ctx.break_page().unwrap();
        assert_eq!(ctx.height(), 160.0);
        assert_eq!(ctx.cursor().y, 180.0);
        assert_eq!(ctx.remaining_height(), 160.0);
        assert_eq!(ctx.page_count(), 2);
        assert!(ctx.page().header_rendered);
        assert!(ctx.is_already_paging());
    }

    #[test]
    fn test_break_keeps_wrap_bounds() {
        let mut ctx = context();
        ctx.begin_page(geometry(), None, None).unwrap();
        ctx.with_wrap(50.0, 40.0, |ctx| {
            ctx.break_page().unwrap();
            assert_eq!(ctx.wrap_begin_x(), 50.0);
            assert_eq!(ctx.wrap_width(), 40.0);
            assert_eq!(ctx.cursor().x, 50.0);
        });
        assert_eq!(ctx.wrap_begin_x(), 20.0);
    }

    #[test]
    fn test_pagination_threshold() {
        let mut ctx = context();
        ctx.begin_page(geometry(), None, None).unwrap();
        ctx.consume(100.0);
        assert_eq!(ctx.remaining_height(), 100.0);
        assert!(!ctx.ensure_room(100.0).unwrap());
        assert_eq!(ctx.page_count(), 1);
        assert!(ctx.ensure_room(100.01).unwrap());
        assert_eq!(ctx.page_count(), 2);
    }

    #[test]
    fn test_too_tall_for_empty_page() {
        let mut ctx = context();
        ctx.begin_page(geometry(), None, None).unwrap();
        let err = ctx.ensure_room(200.5).unwrap_err();
        assert!(matches!(err, LayoutError::ComponentTooTall { .. }));
        assert_eq!(ctx.page_count(), 1);
    }

    #[test]
    fn test_advance_flow_spans_pages() {
        let mut ctx = context();
        ctx.begin_page(geometry(), None, None).unwrap();
        ctx.consume(150.0);
        ctx.advance_flow(300.0).unwrap();
        // 50 on page 1, 200 on page 2, 50 on page 3
        assert_eq!(ctx.page_count(), 3);
        assert_eq!(ctx.cursor().y, 170.0);
    }

    #[test]
    fn test_break_reuses_existing_continuation() {
        let mut ctx = context();
        ctx.begin_page(geometry(), None, None).unwrap();
        let start = ctx.flow_point();
        ctx.break_page().unwrap();
        ctx.goto(start);
        ctx.break_page().unwrap();
        assert_eq!(ctx.page_count(), 2);
        assert_eq!(ctx.pages().len(), 2);
        assert_eq!(ctx.pages().depth(ctx.current_page()), 1);
    }

    #[test]
    fn test_border_continues_across_break() {
        let mut ctx = context();
        ctx.begin_page(geometry(), None, None).unwrap();
        ctx.consume(50.0);
        let id = ctx.open_border(BorderInfo::new(
            BorderConfiguration::all().snapshot(),
            20.0,
            170.0,
            100.0,
        ));
        ctx.break_page().unwrap();
        let info = &ctx.open_borders()[0];
        assert_eq!(info.begin_y, 220.0);
        assert_eq!(info.paging_count, 1);
        ctx.consume(20.0);
        ctx.close_border(id).unwrap();

        let pages = ctx.take_pages().into_pages();
        // page 1: top, left, right; no bottom at the floor
        let first = pages[0].display.lines();
        assert_eq!(first.len(), 3);
        assert!(!first.iter().any(|(a, b)| a.y == 20.0 && b.y == 20.0));
        // page 2: bottom, left, right; no top
        let second = pages[1].display.lines();
        assert_eq!(second.len(), 3);
        assert!(second.iter().any(|(a, b)| a.y == 200.0 && b.y == 200.0));
        assert!(!second.iter().any(|(a, b)| a.y == 220.0 && b.y == 220.0));
    }

    #[test]
    fn test_border_knows_whether_it_pages_again() {
        let mut ctx = context();
        ctx.begin_page(geometry(), None, None).unwrap();
        let info = BorderInfo::new(BorderConfiguration::all().snapshot(), 20.0, 220.0, 100.0)
            .with_height(450.0);
        let id = ctx.open_border(info);
        assert!(!ctx.open_borders()[0].needs_further_paging);

        // 250 left after the first page: more than one more page
        ctx.break_page().unwrap();
        assert_eq!(ctx.open_borders()[0].remaining, Some(250.0));
        assert!(ctx.open_borders()[0].needs_further_paging);

        // 50 left: the box ends on this page
        ctx.break_page().unwrap();
        assert_eq!(ctx.open_borders()[0].remaining, Some(50.0));
        assert!(!ctx.open_borders()[0].needs_further_paging);
        ctx.consume(50.0);
        ctx.close_border(id).unwrap();
        assert_eq!(ctx.page_count(), 3);
    }

    #[test]
    fn test_virtual_render_draws_nothing() {
        let mut ctx = context();
        ctx.set_virtual_render(true);
        ctx.begin_page(geometry(), Some(header(40.0)), None).unwrap();
        let pages = ctx.take_pages().into_pages();
        assert!(pages[0].display.is_empty());
    }

    #[test]
    fn test_missing_header_height_is_config_error() {
        let mut ctx = context();
        let region = Rc::new(PageRegion::default());
        let err = ctx.begin_page(geometry(), Some(region), None).unwrap_err();
        assert!(matches!(err, LayoutError::Config { .. }));
    }

    #[test]
    fn test_header_taller_than_page_is_rejected() {
        let mut ctx = context();
        let err = ctx
            .begin_page(geometry(), Some(header(250.0)), None)
            .unwrap_err();
        assert!(matches!(err, LayoutError::RegionTooTall { .. }));
    }

    #[test]
    fn test_header_content_cannot_page() {
        let mut ctx = context();
        let region = PageRegion::new(20.0).with_component(Image::new("x", 10.0, 30.0));
        let err = ctx
            .begin_page(geometry(), Some(Rc::new(region)), None)
            .unwrap_err();
        assert!(matches!(err, LayoutError::RegionOverflow { .. }));
    }

    #[test]
    fn test_font_fallback_chain() {
        let mut book = FontBook::new();
        book.add_special_font("Courier");
        let mut ctx = Context::new(Rc::new(book));
        assert_eq!(ctx.char_width("Helvetica", 'i', 10.0), 2.22);
        // unknown family falls through to Courier
        assert_eq!(ctx.char_width("Nope", 'i', 10.0), 6.0);
        // nothing covers it: placeholder width
        assert_eq!(ctx.char_width("Helvetica", '中', 10.0), 5.0);
    }
}
