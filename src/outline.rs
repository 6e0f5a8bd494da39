//! # Outline
//!
//! Bookmarks of the rendered document. An [`OutlineEntry`] names a logical
//! page by its 1-based number and resolves to the first physical sheet of that
//! page, however many continuation sheets earlier pages grew. In-flow
//! [`Bookmark`](crate::component::Bookmark) components record an
//! [`OutlineItem`] directly at the position they were laid out.

use serde::{Deserialize, Serialize};

use crate::document::RenderedPage;
use crate::style::Color;

/// A bookmark declared on the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    pub title: String,
    /// Logical page number, as printed by `{{page}}`.
    pub page: usize,
    /// Target y on the sheet. Defaults to the top edge of the page.
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub children: Vec<OutlineEntry>,
}

impl OutlineEntry {
    pub fn new(title: impl Into<String>, page: usize) -> Self {
        Self {
            title: title.into(),
            page,
            top: None,
            color: None,
            children: Vec::new(),
        }
    }

    pub fn with_top(mut self, top: f64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_child(mut self, child: OutlineEntry) -> Self {
        self.children.push(child);
        self
    }

    /// Point this entry at laid-out sheets. Entries naming a page the
    /// document does not have are dropped with their children.
    pub fn resolve(&self, pages: &[RenderedPage]) -> Option<OutlineItem> {
        let Some(sheet) = pages.iter().find(|p| p.logical == self.page) else {
            log::warn!(
                "bookmark {:?} targets page {} which does not exist, skipping",
                self.title,
                self.page
            );
            return None;
        };
        Some(OutlineItem {
            title: self.title.clone(),
            logical: self.page,
            sheet: sheet.number,
            top: self.top.unwrap_or(sheet.height),
            color: self.color,
            children: self
                .children
                .iter()
                .filter_map(|child| child.resolve(pages))
                .collect(),
        })
    }
}

/// A resolved bookmark target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineItem {
    pub title: String,
    pub logical: usize,
    /// 1-based physical page number.
    pub sheet: usize,
    pub top: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DisplayList;

    fn sheet(number: usize, logical: usize) -> RenderedPage {
        RenderedPage {
            number,
            logical,
            width: 100.0,
            height: 200.0,
            display: DisplayList::default(),
        }
    }

    #[test]
    fn test_entry_lands_on_first_sheet_of_its_page() {
        // page 1 grew two continuation sheets
        let pages = vec![sheet(1, 1), sheet(2, 1), sheet(3, 1), sheet(4, 2)];
        let lower = OutlineEntry::new("Two, lower", 2).with_top(80.0);
        let entry = OutlineEntry::new("Two", 2).with_child(lower);
        let item = entry.resolve(&pages).unwrap();
        assert_eq!(item.sheet, 4);
        assert_eq!(item.top, 200.0);
        assert_eq!(item.children[0].sheet, 4);
        assert_eq!(item.children[0].top, 80.0);
    }

    #[test]
    fn test_missing_page_is_dropped() {
        let pages = vec![sheet(1, 1)];
        assert!(OutlineEntry::new("Nowhere", 3).resolve(&pages).is_none());
        let parent = OutlineEntry::new("One", 1).with_child(OutlineEntry::new("Gone", 9));
        assert!(parent.resolve(&pages).unwrap().children.is_empty());
    }
}
