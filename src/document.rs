use crate::{
    font::FontSet,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
    BriefError,
};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Pdf, Ref};
use std::io::Write;

/// A document collects the generated pages and the resolved fonts, then
/// renders everything out with a call to [Document::write].
///
/// Pages are kept in an arena with an explicit order so that external
/// collaborators can splice fixed template pages around the generated
/// content: a cover page is typically inserted before the first generated
/// page and trailing template pages appended after the last one, using
/// [Document::insert_page_before_id] / [Document::insert_page_after_id].
pub struct Document {
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
    pub fonts: FontSet,
}

impl Document {
    /// Create an empty document rendering with the given font set
    pub fn new(fonts: FontSet) -> Document {
        Document {
            info: None,
            pages: Arena::new(),
            page_order: Vec::new(),
            fonts,
        }
    }

    /// Sets information about the document. If not provided, no information
    /// block will be written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a page to the end of the document, returning its id
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    /// Add a page to the document, inserting it before the page identified by
    /// `next`. If there is no page identified by `next`, the page will be
    /// added to the end of the document.
    pub fn insert_page_before_id(&mut self, page: Page, next: Id<Page>) -> Id<Page> {
        let id = self.pages.alloc(page);
        match self.index_of_page(next) {
            Some(index) => self.page_order.insert(index, id),
            None => self.page_order.push(id),
        }
        id
    }

    /// Add a page to the document, inserting it after the page identified by
    /// `previous`. If there is no page identified by `previous`, the page
    /// will be added to the end of the document.
    pub fn insert_page_after_id(&mut self, page: Page, previous: Id<Page>) -> Id<Page> {
        let id = self.pages.alloc(page);
        match self.index_of_page(previous) {
            Some(index) if index + 1 < self.page_order.len() => {
                self.page_order.insert(index + 1, id)
            }
            _ => self.page_order.push(id),
        }
        id
    }

    /// Get the 0-based index of a page given its id. Note that changing the
    /// page order after this call _will_ invalidate the returned index
    pub fn index_of_page(&self, page: Id<Page>) -> Option<usize> {
        self.page_order.iter().position(|&p| p == page)
    }

    /// Get the page id of the page at the given index. Returns [None] if
    /// `page_index >= self.page_order.len()`.
    pub fn id_of_page_index(&self, page_index: usize) -> Option<Id<Page>> {
        self.page_order.get(page_index).copied()
    }

    /// Write the entire document to the writer. Note: although this can write
    /// to arbitrary streams, the entire document is "rendered" in memory
    /// first.
    ///
    /// Until `write` is called, all references are un-resolved, so pages can
    /// be added / reordered / removed as you like.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), BriefError> {
        let Document {
            info,
            pages,
            page_order,
            fonts,
        } = self;

        let mut refs = ObjectReferences::new();

        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        // page refs are keyed by page_order index, not arena index, so that
        // spliced-in template pages keep the reading order
        let page_refs: Vec<Ref> = page_order
            .iter()
            .enumerate()
            .map(|(i, _id)| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (i, font) in fonts.faces().iter().enumerate() {
            font.write(&mut refs, i, &mut writer);
        }

        for (page_index, id) in page_order.iter().enumerate() {
            let page = pages.get(*id).ok_or(BriefError::PageMissing)?;
            page.write(&mut refs, page_index, &fonts, &mut writer)?;
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        w.write_all(writer.finish().as_slice()).map_err(Into::into)
    }
}
