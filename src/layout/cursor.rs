use crate::layout::Margins;
use crate::page::{Page, SpanLayout};
use crate::pagesize::PageSize;
use crate::units::Pt;

/// Tracks the vertical write position on the page currently being filled and
/// allocates fresh pages when space runs out.
///
/// The cursor owns the growing page set: each render constructs its own
/// cursor, advances it destructively, and takes the finished pages back with
/// [PageCursor::finish]. [PageCursor::ensure_space] must be called before
/// every write whose height is known, per visual line rather than per block,
/// so a single wrapped paragraph or list item can split across a page
/// boundary.
pub struct PageCursor {
    size: PageSize,
    margins: Margins,
    page: Page,
    offset: Pt,
    done: Vec<Page>,
}

impl PageCursor {
    pub fn new(size: PageSize, margins: Margins) -> PageCursor {
        let page = Page::new(size, Some(margins.clone()));
        let offset = page.content_box.y2;
        PageCursor {
            size,
            margins,
            page,
            offset,
            done: Vec::new(),
        }
    }

    /// The current vertical offset: the top of the unused area on the
    /// current page, moving down towards the bottom margin
    pub fn offset(&self) -> Pt {
        self.offset
    }

    /// Left edge of the content area
    pub fn left(&self) -> Pt {
        self.page.content_box.x1
    }

    /// Width of the content area
    pub fn content_width(&self) -> Pt {
        self.page.content_box.width()
    }

    /// Guarantee `needed` points of vertical space on the current page,
    /// finalizing it and starting a fresh page when the write would cross
    /// below the bottom margin
    pub fn ensure_space(&mut self, needed: Pt) {
        if self.offset - needed < self.page.content_box.y1 {
            let fresh = Page::new(self.size, Some(self.margins.clone()));
            self.offset = fresh.content_box.y2;
            let full = std::mem::replace(&mut self.page, fresh);
            self.done.push(full);
        }
    }

    /// Move the write position down by `amount`
    pub fn advance(&mut self, amount: Pt) {
        self.offset = self.offset - amount;
    }

    /// Place a span on the current page
    pub fn add_span(&mut self, span: SpanLayout) {
        self.page.add_span(span);
    }

    /// Finalize the current page and return the ordered page set
    pub fn finish(mut self) -> Vec<Page> {
        self.done.push(self.page);
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagesize;

    fn cursor() -> PageCursor {
        PageCursor::new(pagesize::A4, Margins::all(Pt(72.0)))
    }

    #[test]
    fn starts_at_content_top() {
        let c = cursor();
        assert_eq!(c.offset(), pagesize::A4.1 - Pt(72.0));
        assert_eq!(c.left(), Pt(72.0));
    }

    #[test]
    fn ensure_space_is_a_noop_while_room_remains() {
        let mut c = cursor();
        let before = c.offset();
        c.ensure_space(Pt(14.0));
        assert_eq!(c.offset(), before);
        assert_eq!(c.finish().len(), 1);
    }

    #[test]
    fn allocates_a_new_page_when_space_is_exhausted() {
        let mut c = cursor();
        let top = c.offset();
        // walk to just above the bottom margin, then ask for more than remains
        let room = c.offset() - Pt(72.0);
        c.advance(room - Pt(10.0));
        c.ensure_space(Pt(14.0));
        assert_eq!(c.offset(), top);
        assert_eq!(c.finish().len(), 2);
    }
}
