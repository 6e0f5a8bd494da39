//! # Page Arena
//!
//! Physical pages live in a flat arena and refer to each other by
//! [`PageIndex`]. A logical page that overflows grows a chain of continuation
//! pages: each link records the page it continues (`parent`) and the page that
//! continues it (`sub`). Every page in a chain carries the logical id of the
//! chain's root, so "current page number" lookups resolve to the logical page.

use crate::style::PageGeometry;
use crate::surface::DisplayList;

/// Handle to a page in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageIndex(pub usize);

#[derive(Debug, Clone)]
pub struct Page {
    /// Logical page id, shared by every page of a continuation chain.
    pub id: usize,
    pub geometry: PageGeometry,
    pub parent: Option<PageIndex>,
    pub sub: Option<PageIndex>,
    pub header_rendered: bool,
    pub footer_rendered: bool,
    /// Where body content starts once headers (and repeated table headers)
    /// have been placed. Set when the page is first entered.
    pub flow_top: Option<f64>,
    pub display: DisplayList,
}

impl Page {
    fn new(id: usize, geometry: PageGeometry, parent: Option<PageIndex>) -> Self {
        Self {
            id,
            geometry,
            parent,
            sub: None,
            header_rendered: false,
            footer_rendered: false,
            flow_top: None,
            display: DisplayList::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct PageArena {
    pages: Vec<Page>,
    logical_count: usize,
}

impl PageArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn logical_count(&self) -> usize {
        self.logical_count
    }

    pub fn get(&self, index: PageIndex) -> &Page {
        &self.pages[index.0]
    }

    pub fn get_mut(&mut self, index: PageIndex) -> &mut Page {
        &mut self.pages[index.0]
    }

    /// Open a new logical page with its own id.
    pub fn push_logical(&mut self, geometry: PageGeometry) -> PageIndex {
        self.logical_count += 1;
        self.pages.push(Page::new(self.logical_count, geometry, None));
        PageIndex(self.pages.len() - 1)
    }

    /// Chain a continuation page after the last page of `index`'s chain.
    pub fn create_sub_page(&mut self, index: PageIndex) -> PageIndex {
        let last = self.last_page(index);
        let (id, geometry) = {
            let page = self.get(last);
            (page.id, page.geometry)
        };
        self.pages.push(Page::new(id, geometry, Some(last)));
        let sub = PageIndex(self.pages.len() - 1);
        self.get_mut(last).sub = Some(sub);
        sub
    }

    pub fn sub_page(&self, index: PageIndex) -> Option<PageIndex> {
        self.get(index).sub
    }

    pub fn parent_page(&self, index: PageIndex) -> Option<PageIndex> {
        self.get(index).parent
    }

    /// Follow the chain to the active continuation.
    pub fn last_page(&self, index: PageIndex) -> PageIndex {
        let mut current = index;
        while let Some(sub) = self.get(current).sub {
            current = sub;
        }
        current
    }

    /// Follow the chain back to the logical page.
    pub fn root_page(&self, index: PageIndex) -> PageIndex {
        let mut current = index;
        while let Some(parent) = self.get(current).parent {
            current = parent;
        }
        current
    }

    /// Number of continuation links between `index` and its logical page.
    pub fn depth(&self, index: PageIndex) -> usize {
        let mut depth = 0;
        let mut current = index;
        while let Some(parent) = self.get(current).parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Edges;

    fn geometry() -> PageGeometry {
        PageGeometry::new(200.0, 200.0, Edges::uniform(10.0))
    }

    #[test]
    fn test_chain_shares_logical_id() {
        let mut arena = PageArena::new();
        let first = arena.push_logical(geometry());
        let sub = arena.create_sub_page(first);
        let subsub = arena.create_sub_page(first);

        assert_eq!(arena.get(sub).id, 1);
        assert_eq!(arena.get(subsub).id, 1);
        assert_eq!(arena.sub_page(first), Some(sub));
        assert_eq!(arena.parent_page(subsub), Some(sub));
        assert_eq!(arena.last_page(first), subsub);
        assert_eq!(arena.root_page(subsub), first);
        assert_eq!(arena.depth(subsub), 2);
    }

    #[test]
    fn test_logical_pages_get_new_ids() {
        let mut arena = PageArena::new();
        let a = arena.push_logical(geometry());
        arena.create_sub_page(a);
        let b = arena.push_logical(geometry());
        assert_eq!(arena.get(b).id, 2);
        assert_eq!(arena.logical_count(), 2);
        assert_eq!(arena.len(), 3);
    }
}
