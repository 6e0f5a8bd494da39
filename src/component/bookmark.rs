//! In-flow bookmarks.

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::context::Context;
use crate::error::LayoutError;
use crate::outline::OutlineItem;
use crate::style::Color;

/// Marks the cursor position under a title. Takes no room and draws nothing.
///
/// The target keeps the logical page number next to the physical sheet, so
/// a bookmark that lands on a continuation sheet still names its page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub title: String,
    #[serde(default)]
    pub color: Option<Color>,
}

impl Bookmark {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            color: None,
        }
    }
}

impl Component for Bookmark {
    fn required_height(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        Ok(0.0)
    }

    fn required_width(&self, _ctx: &mut Context) -> Result<f64, LayoutError> {
        Ok(0.0)
    }

    fn render(&self, ctx: &mut Context) -> Result<(), LayoutError> {
        let item = OutlineItem {
            title: self.title.clone(),
            logical: ctx.logical_page_number(),
            sheet: ctx.current_page().0 + 1,
            top: ctx.cursor().y,
            color: self.color,
            children: Vec::new(),
        };
        ctx.add_bookmark(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Block, Text};
    use crate::font::FontBook;
    use crate::style::{Edges, PageGeometry};
    use std::rc::Rc;

    #[test]
    fn test_bookmark_records_continuation_sheet() {
        let mut ctx = Context::new(Rc::new(FontBook::new()));
        let geometry = PageGeometry::new(120.0, 70.0, Edges::uniform(10.0));
        ctx.begin_page(geometry, None, None).unwrap();

        let lines: Vec<String> = (1..=7).map(|i| format!("l{i}")).collect();
        let blocks: Vec<Block> = vec![
            Bookmark::new("start").into(),
            Text::new(lines.join("\n")).with_font("Courier", 10.0).into(),
            Bookmark::new("after").into(),
        ];
        for block in &blocks {
            block.render(&mut ctx).unwrap();
        }

        let marks = ctx.bookmarks();
        assert_eq!(marks.len(), 2);
        assert_eq!((marks[0].logical, marks[0].sheet, marks[0].top), (1, 1, 60.0));
        // 5 lines per page: the second mark sits below l7 on sheet 2
        assert_eq!((marks[1].logical, marks[1].sheet, marks[1].top), (1, 2, 40.0));
    }
}
