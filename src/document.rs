//! # Document
//!
//! An ordered list of logical pages plus the fonts they use. Rendering runs
//! the layout in two phases: virtual passes that only count pages, repeated
//! until the total page count stops changing, then one real pass that draws
//! with that total substituted for `{{pages}}`.
//!
//! Layout is a pure function of the document, so the real pass must land on
//! exactly the page count the virtual passes settled on. If it does not, the
//! render fails with [`LayoutError::PassDivergence`] instead of emitting pages
//! whose placeholders are wrong.
//!
//! Watermarks declared on the document go on every sheet; those declared on a
//! page go on that page and its continuation sheets. Bookmarks come out of
//! the real pass: outline entries by logical page, in-flow markers where they
//! were laid out.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::component::{Block, Component};
use crate::context::Context;
use crate::error::LayoutError;
use crate::font::FontBook;
use crate::outline::{OutlineEntry, OutlineItem};
use crate::paging::PagingEvent;
use crate::region::PageRegion;
use crate::style::PageGeometry;
use crate::surface::DisplayList;
use crate::watermark::Watermark;

/// Upper bound on virtual passes while the page count settles.
const MAX_VIRTUAL_PASSES: usize = 5;

/// A complete document ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub pages: Vec<PageSpec>,

    /// Custom fonts to register before layout.
    #[serde(default)]
    pub fonts: Vec<FontSource>,

    /// Fallback fonts, tried in order for glyphs the requested font lacks.
    #[serde(default)]
    pub special_fonts: Vec<String>,

    /// Stamped on every physical page.
    #[serde(default)]
    pub watermarks: Vec<Watermark>,

    #[serde(default)]
    pub outline: Vec<OutlineEntry>,

    #[serde(skip)]
    font_book: FontBook,

    #[serde(skip)]
    events: Vec<Rc<dyn PagingEvent>>,
}

/// A custom font given as base64 data or a `data:` URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSource {
    pub family: String,
    pub src: String,
}

/// One logical page: its geometry, optional header and footer, and the
/// components flowed into its body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    #[serde(flatten)]
    pub geometry: PageGeometry,
    #[serde(default)]
    pub header: Option<PageRegion>,
    #[serde(default)]
    pub footer: Option<PageRegion>,
    #[serde(default)]
    pub components: Vec<Block>,
    /// Stamped on this page and its continuation sheets, after the
    /// document's own watermarks.
    #[serde(default)]
    pub watermarks: Vec<Watermark>,
}

impl PageSpec {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header: PageRegion) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: PageRegion) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn with_component(mut self, component: impl Into<Block>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn with_watermark(mut self, watermark: impl Into<Watermark>) -> Self {
        self.watermarks.push(watermark.into());
        self
    }
}

/// A laid-out physical page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    /// 1-based physical page number.
    pub number: usize,
    /// The logical page this page belongs to.
    pub logical: usize,
    pub width: f64,
    pub height: f64,
    pub display: DisplayList,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderedDocument {
    pub pages: Vec<RenderedPage>,
    /// Outline entries in declaration order, then in-flow bookmarks in page
    /// order.
    pub bookmarks: Vec<OutlineItem>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Per logical page state shared by every pass.
struct PageSetup {
    header: Option<Rc<PageRegion>>,
    footer: Option<Rc<PageRegion>>,
    watermarks: Rc<[Watermark]>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn append_page(&mut self, page: PageSpec) {
        self.pages.push(page);
    }

    /// Insert a logical page before position `index`.
    pub fn insert_page(&mut self, index: usize, page: PageSpec) -> Result<(), LayoutError> {
        if index > self.pages.len() {
            return Err(LayoutError::config(format!(
                "cannot insert a page at {index}, the document has {} pages",
                self.pages.len()
            )));
        }
        self.pages.insert(index, page);
        Ok(())
    }

    /// Register a TrueType/OpenType font from raw bytes.
    pub fn register_font(&mut self, family: &str, data: &[u8]) -> Result<(), LayoutError> {
        self.font_book.register(family, data)
    }

    /// Register a font from base64 data or a `data:` URI.
    pub fn register_font_base64(&mut self, family: &str, src: &str) -> Result<(), LayoutError> {
        self.font_book.register_base64(family, src)
    }

    pub fn add_special_font(&mut self, family: &str) {
        if !self.special_fonts.iter().any(|f| f == family) {
            self.special_fonts.push(family.to_string());
        }
    }

    pub fn add_watermark(&mut self, watermark: impl Into<Watermark>) {
        self.watermarks.push(watermark.into());
    }

    pub fn add_bookmark(&mut self, entry: OutlineEntry) {
        self.outline.push(entry);
    }

    /// Add a strategy run around every page break, in every pass.
    pub fn add_paging_event(&mut self, event: Rc<dyn PagingEvent>) {
        self.events.push(event);
    }

    /// Lay the document out once without drawing and return the number of
    /// physical pages, with `total_pages` substituted for `{{pages}}`.
    pub fn virtual_render(&self, total_pages: usize) -> Result<usize, LayoutError> {
        let mut ctx = Context::new(Rc::new(self.build_fonts()));
        let setups = self.setups();
        let count = self.run_pass(&mut ctx, &setups, true, total_pages);
        ctx.clear();
        count
    }

    /// The total number of physical pages, once the count has settled.
    pub fn page_count(&self) -> Result<usize, LayoutError> {
        let mut ctx = Context::new(Rc::new(self.build_fonts()));
        let setups = self.setups();
        let total = self.settle(&mut ctx, &setups);
        ctx.clear();
        total
    }

    pub fn render(&self) -> Result<RenderedDocument, LayoutError> {
        let mut ctx = Context::new(Rc::new(self.build_fonts()));
        let setups = self.setups();
        let result = self.render_with(&mut ctx, &setups);
        ctx.clear();
        result
    }

    fn render_with(
        &self,
        ctx: &mut Context,
        setups: &[PageSetup],
    ) -> Result<RenderedDocument, LayoutError> {
        let total = self.settle(ctx, setups)?;
        let actual = self.run_pass(ctx, setups, false, total)?;
        log::info!("real pass: {actual} pages");
        if actual != total {
            return Err(LayoutError::PassDivergence {
                expected: total,
                actual,
            });
        }

        let mut marks = ctx.take_bookmarks();
        let pages: Vec<RenderedPage> = ctx
            .take_pages()
            .into_pages()
            .into_iter()
            .enumerate()
            .map(|(i, page)| RenderedPage {
                number: i + 1,
                logical: page.id,
                width: page.geometry.width(),
                height: page.geometry.height(),
                display: page.display,
            })
            .collect();

        let mut bookmarks: Vec<OutlineItem> = self
            .outline
            .iter()
            .filter_map(|entry| entry.resolve(&pages))
            .collect();
        // split rows lay out cells column by column, not top-down
        marks.sort_by(|a, b| a.sheet.cmp(&b.sheet).then(b.top.total_cmp(&a.top)));
        bookmarks.extend(marks);
        Ok(RenderedDocument { pages, bookmarks })
    }

    /// Run virtual passes until the page count is a fixed point.
    fn settle(&self, ctx: &mut Context, setups: &[PageSetup]) -> Result<usize, LayoutError> {
        let mut total = 0;
        for pass in 1..=MAX_VIRTUAL_PASSES {
            let count = self.run_pass(ctx, setups, true, total)?;
            log::info!("virtual pass {pass}: {count} pages");
            if count == total {
                return Ok(total);
            }
            total = count;
        }
        log::warn!("page count did not settle after {MAX_VIRTUAL_PASSES} virtual passes");
        Ok(total)
    }

    fn run_pass(
        &self,
        ctx: &mut Context,
        setups: &[PageSetup],
        is_virtual_render: bool,
        total_pages: usize,
    ) -> Result<usize, LayoutError> {
        ctx.start_pass(is_virtual_render, total_pages);
        ctx.set_paging_events(self.events.clone());
        for (page, setup) in self.pages.iter().zip(setups) {
            ctx.set_watermarks(Rc::clone(&setup.watermarks));
            ctx.begin_page(page.geometry, setup.header.clone(), setup.footer.clone())?;
            for block in &page.components {
                ctx.begin_component();
                if is_virtual_render {
                    block.virtual_render(ctx)?;
                } else {
                    block.render(ctx)?;
                }
            }
        }
        Ok(ctx.page_count())
    }

    fn setups(&self) -> Vec<PageSetup> {
        self.pages
            .iter()
            .map(|page| PageSetup {
                header: page.header.clone().map(Rc::new),
                footer: page.footer.clone().map(Rc::new),
                watermarks: self
                    .watermarks
                    .iter()
                    .chain(&page.watermarks)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    fn build_fonts(&self) -> FontBook {
        let mut book = self.font_book.clone();
        for font in &self.fonts {
            if let Err(e) = book.register_base64(&font.family, &font.src) {
                log::warn!("skipping font {}: {e}", font.family);
            }
        }
        for family in &self.special_fonts {
            book.add_special_font(family);
        }
        book
    }
}
