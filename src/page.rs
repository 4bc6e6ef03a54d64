use crate::colour::Colour;
use crate::font::{FontSet, FontVariant};
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use crate::BriefError;
use pdf_writer::{Finish, Name, Pdf};
use std::io::Write;

/// The typeface variant and size a span is drawn with
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub variant: FontVariant,
    pub size: Pt,
}

/// A single run of text placed at an absolute baseline position on a page
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    /// (x, baseline y) in page coordinates
    pub coords: (Pt, Pt),
}

/// A single fixed-size page of laid out text. Once the renderer has finished
/// with a page it is never revisited; pages are append-only collections of
/// spans until they are serialized.
pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    /// The laid out text
    pub contents: Vec<SpanLayout>,
}

impl Page {
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let (width, height) = size;
        let margins = margins.unwrap_or_else(Margins::empty);
        Page {
            media_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: width,
                y2: height,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: width - margins.right,
                y2: height - margins.top,
            },
            contents: Vec::default(),
        }
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(span);
    }

    fn write_fill_colour(content: &mut Vec<u8>, colour: Colour) {
        match colour {
            Colour::RGB { r, g, b } => writeln!(content, "{r} {g} {b} rg").ok(),
            Colour::Grey { g } => writeln!(content, "{g} g").ok(),
        };
    }

    /// Serialize the page's spans into a PDF content stream
    fn render(&self, fonts: &FontSet) -> Vec<u8> {
        if self.contents.is_empty() {
            return Vec::default();
        }
        let mut content: Vec<u8> = Vec::default();

        writeln!(&mut content, "q").ok();
        let mut current_font: Option<SpanFont> = None;
        let mut current_colour: Option<Colour> = None;

        for span in self.contents.iter() {
            if current_font != Some(span.font) {
                current_font = Some(span.font);
                writeln!(
                    &mut content,
                    "/F{} {} Tf",
                    span.font.variant.index(),
                    span.font.size.0
                )
                .ok();
            }
            if current_colour != Some(span.colour) {
                current_colour = Some(span.colour);
                Self::write_fill_colour(&mut content, span.colour);
            }

            let face = fonts.get(span.font.variant);
            writeln!(&mut content, "BT").ok();
            writeln!(&mut content, "{} {} Td", span.coords.0 .0, span.coords.1 .0).ok();
            write!(&mut content, "<").ok();
            for ch in span.text.chars() {
                write!(&mut content, "{:04x}", face.encoded_glyph(ch)).ok();
            }
            writeln!(&mut content, "> Tj").ok();
            writeln!(&mut content, "ET").ok();
        }
        writeln!(&mut content, "Q").ok();

        content
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &FontSet,
        writer: &mut Pdf,
    ) -> Result<(), BriefError> {
        let id = refs
            .get(RefType::Page(page_index))
            .ok_or(BriefError::PageMissing)?;
        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(refs.get(RefType::PageTree).ok_or(BriefError::PageMissing)?);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (i, _) in fonts.faces().iter().enumerate() {
            if let Some(font_ref) = refs.get(RefType::Font(i)) {
                resource_fonts.pair(Name(format!("F{i}").as_bytes()), font_ref);
            }
        }
        resource_fonts.finish();
        resources.finish();

        let content_id = refs.gen(RefType::ContentForPage(page_index));
        page.contents(content_id);
        page.finish();

        let rendered = self.render(fonts);
        writer.stream(content_id, rendered.as_slice());

        Ok(())
    }
}
