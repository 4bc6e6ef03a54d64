//! Turns a brief's title and sections into laid-out pages.
//!
//! Sections whose headings announce trigger summaries or benefits route
//! their body through the outline parser and render as nested lists; every
//! other section renders as a plain paragraph. All spacing and sizing comes
//! from an immutable [Style] so multiple renders with different styling can
//! run independently.

use crate::colour::{colours, Colour};
use crate::document::Document;
use crate::font::{FontSet, FontVariant, Typeface};
use crate::info::Info;
use crate::layout::{baseline_offset, wrap, Margins, PageCursor};
use crate::outline::{numbered_lines, parse_outline, CategoryGroup};
use crate::page::{Page, SpanFont, SpanLayout};
use crate::pagesize::{self, PageSize};
use crate::units::{Mm, Pt};
use regex::Regex;

/// One input section: a heading and its raw body text
#[derive(Debug, Clone)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// The full input payload for one render
#[derive(Debug, Clone)]
pub struct Brief {
    pub title: String,
    pub sections: Vec<Section>,
}

/// A render-time unit of content
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Headline(String),
    SubHeadline(String),
    Label(String),
    Paragraph(String),
    NumberedList(Vec<String>),
    NestedList(Vec<CategoryGroup>),
}

/// Immutable layout configuration passed into the renderer at construction.
///
/// The gap table encodes the visual hierarchy: tight coupling within a
/// section (headline to sub-headline, item to its examples), loose coupling
/// between sections and category groups.
#[derive(Debug, Clone)]
pub struct Style {
    pub page_size: PageSize,
    pub margins: Margins,
    pub headline_size: Pt,
    pub sub_headline_size: Pt,
    pub label_size: Pt,
    pub body_size: Pt,
    /// Extra leading added to the font size per visual line
    pub line_spacing: Pt,
    /// Gap after the headline, roughly half the section gap
    pub headline_gap: Pt,
    /// Gap after a sub-headline, before its body
    pub sub_headline_gap: Pt,
    /// Gap between numbered items
    pub item_gap: Pt,
    /// Gap after an item's example block
    pub example_gap: Pt,
    /// Gap after a whole category group
    pub group_gap: Pt,
    /// Gap after a finished paragraph or list, before the next section
    pub section_gap: Pt,
    /// Indent of example bullets relative to the left margin
    pub bullet_indent: Pt,
    pub bullet: char,
    pub ink: Colour,
}

impl Default for Style {
    fn default() -> Style {
        Style {
            page_size: pagesize::A4,
            margins: Margins::symmetric(Mm(20.0), Mm(18.0)),
            headline_size: Pt(20.0),
            sub_headline_size: Pt(14.0),
            label_size: Pt(12.0),
            body_size: Pt(11.0),
            line_spacing: Pt(2.0),
            headline_gap: Pt(8.0),
            sub_headline_gap: Pt(6.0),
            item_gap: Pt(4.0),
            example_gap: Pt(8.0),
            group_gap: Pt(12.0),
            section_gap: Pt(16.0),
            bullet_indent: Pt(18.0),
            bullet: '•',
            ink: colours::BLACK,
        }
    }
}

/// Compiled heading patterns, built once per block mapping
struct SectionRouter {
    outline_heading: Regex,
}

impl SectionRouter {
    fn new() -> SectionRouter {
        SectionRouter {
            outline_heading: Regex::new(
                r"(?i)auslöser|trigger|vorteile|nutzen|benefit|advantage|mehrwert",
            )
            .expect("heading pattern compiles"),
        }
    }

    /// Headings whose body is semi-structured outline text rather than prose
    fn is_outline_heading(&self, heading: &str) -> bool {
        self.outline_heading.is_match(heading)
    }
}

/// Map a brief onto the ordered block sequence the renderer consumes
pub fn blocks_for(brief: &Brief) -> Vec<Block> {
    let router = SectionRouter::new();
    let mut blocks = vec![Block::Headline(brief.title.clone())];
    for section in &brief.sections {
        blocks.push(Block::SubHeadline(section.heading.clone()));
        if router.is_outline_heading(&section.heading) {
            let groups = parse_outline(&section.body);
            if !groups.is_empty() {
                blocks.push(Block::NestedList(groups));
                continue;
            }
            // no recognizable category headers; a body that is itself a
            // numbered list still renders as one
            let numbered = numbered_lines(&section.body);
            if numbered.len() >= 2 {
                blocks.push(Block::NumberedList(numbered));
                continue;
            }
        }
        blocks.push(Block::Paragraph(section.body.clone()));
    }
    blocks
}

/// Renders blocks onto pages, delegating wrapping to [wrap] and space
/// management to [PageCursor]. The same typeface references are used for
/// measuring and drawing so wrap decisions match rendered output exactly.
pub struct Composer<'a, F: Typeface> {
    regular: &'a F,
    bold: &'a F,
    style: &'a Style,
    cursor: PageCursor,
}

impl<'a, F: Typeface> Composer<'a, F> {
    pub fn new(regular: &'a F, bold: &'a F, style: &'a Style) -> Composer<'a, F> {
        Composer {
            regular,
            bold,
            style,
            cursor: PageCursor::new(style.page_size, style.margins.clone()),
        }
    }

    fn typeface(&self, variant: FontVariant) -> &'a F {
        match variant {
            FontVariant::Regular => self.regular,
            FontVariant::Bold => self.bold,
        }
    }

    /// Draw one visual line made of segments sharing a baseline. Space is
    /// guaranteed per line, never per block, so wrapped blocks can split
    /// across the page boundary.
    fn draw_line(&mut self, segments: &[(Pt, &str)], variant: FontVariant, size: Pt) {
        let advance = size + self.style.line_spacing;
        self.cursor.ensure_space(advance);
        let baseline = self.cursor.offset() + baseline_offset(self.typeface(variant), size);
        for (x, text) in segments {
            self.cursor.add_span(SpanLayout {
                text: (*text).to_string(),
                font: SpanFont { variant, size },
                colour: self.style.ink,
                coords: (*x, baseline),
            });
        }
        self.cursor.advance(advance);
    }

    /// Wrap `text` to `width` and draw it with a hanging indent: an optional
    /// prefix occupies the left edge of the first line, continuation lines
    /// align to the text start
    fn draw_hanging(
        &mut self,
        prefix: Option<&str>,
        text: &str,
        x: Pt,
        width: Pt,
        variant: FontVariant,
        size: Pt,
    ) {
        let face = self.typeface(variant);
        let prefix_width = prefix
            .map(|p| face.width_of(p, size))
            .unwrap_or_default();
        let lines = wrap(face, text, size, width - prefix_width);

        match prefix {
            Some(p) if lines.is_empty() => self.draw_line(&[(x, p)], variant, size),
            _ => {}
        }
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                match prefix {
                    Some(p) => self.draw_line(
                        &[(x, p), (x + prefix_width, line.as_str())],
                        variant,
                        size,
                    ),
                    None => self.draw_line(&[(x, line.as_str())], variant, size),
                }
            } else {
                self.draw_line(&[(x + prefix_width, line.as_str())], variant, size);
            }
        }
    }

    pub fn render(&mut self, block: &Block) {
        let left = self.cursor.left();
        let width = self.cursor.content_width();
        let body = self.style.body_size;

        match block {
            Block::Headline(text) => {
                self.draw_line(&[(left, text)], FontVariant::Bold, self.style.headline_size);
                self.cursor.advance(self.style.headline_gap);
            }
            Block::SubHeadline(text) => {
                self.draw_line(
                    &[(left, text)],
                    FontVariant::Bold,
                    self.style.sub_headline_size,
                );
                self.cursor.advance(self.style.sub_headline_gap);
            }
            Block::Label(text) => {
                self.draw_line(&[(left, text)], FontVariant::Bold, self.style.label_size);
                self.cursor.advance(self.style.item_gap);
            }
            Block::Paragraph(text) => {
                self.draw_hanging(None, text, left, width, FontVariant::Regular, body);
                self.cursor.advance(self.style.section_gap);
            }
            Block::NumberedList(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    let prefix = format!("{}. ", i + 1);
                    self.draw_hanging(
                        Some(&prefix),
                        entry,
                        left,
                        width,
                        FontVariant::Regular,
                        body,
                    );
                    self.cursor.advance(self.style.item_gap);
                }
                self.cursor.advance(self.style.section_gap);
            }
            Block::NestedList(groups) => {
                for group in groups {
                    self.render(&Block::Label(group.category.label().to_string()));
                    for (i, item) in group.items.iter().enumerate() {
                        let prefix = format!("{}. ", i + 1);
                        self.draw_hanging(
                            Some(&prefix),
                            &item.title,
                            left,
                            width,
                            FontVariant::Regular,
                            body,
                        );
                        let bullet_x = left + self.style.bullet_indent;
                        let bullet = format!("{} ", self.style.bullet);
                        for example in &item.examples {
                            self.draw_hanging(
                                Some(&bullet),
                                example,
                                bullet_x,
                                width - self.style.bullet_indent,
                                FontVariant::Regular,
                                body,
                            );
                        }
                        if item.examples.is_empty() {
                            self.cursor.advance(self.style.item_gap);
                        } else {
                            self.cursor.advance(self.style.example_gap);
                        }
                    }
                    self.cursor.advance(self.style.group_gap);
                }
                self.cursor.advance(self.style.section_gap);
            }
        }
    }

    /// Finalize the render and hand back the ordered page set. The renderer
    /// always finalizes with whatever content it has.
    pub fn finish(self) -> Vec<Page> {
        self.cursor.finish()
    }
}

/// Render a brief into a self-contained sequence of pages
pub fn compose<F: Typeface>(brief: &Brief, regular: &F, bold: &F, style: &Style) -> Vec<Page> {
    let mut composer = Composer::new(regular, bold, style);
    for block in blocks_for(brief) {
        composer.render(&block);
    }
    composer.finish()
}

/// Render a brief and collect the pages into a [Document] ready for the
/// external assembler to splice template pages around and serialize
pub fn compose_document(brief: &Brief, fonts: FontSet, style: &Style) -> Document {
    let pages = compose(brief, &fonts.regular, &fonts.bold, style);

    let mut document = Document::new(fonts);
    document.set_info(Info::new().with_title(&brief.title));
    for page in pages {
        document.add_page(page);
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::test_support::MonoMeasure;
    use crate::outline::Category;

    fn mono() -> MonoMeasure {
        MonoMeasure { advance: 10.0 }
    }

    fn brief_with(heading: &str, body: &str) -> Brief {
        Brief {
            title: "Testdokument".to_string(),
            sections: vec![Section {
                heading: heading.to_string(),
                body: body.to_string(),
            }],
        }
    }

    #[test]
    fn routes_trigger_headings_through_the_outline_parser() {
        let brief = brief_with("Typische Auslöser", "Ängste:\n1. Angst A\n2. Angst B");
        let blocks = blocks_for(&brief);
        assert!(matches!(blocks[0], Block::Headline(_)));
        assert!(matches!(blocks[1], Block::SubHeadline(_)));
        match &blocks[2] {
            Block::NestedList(groups) => {
                assert_eq!(groups[0].category, Category::Fears);
                assert_eq!(groups[0].items.len(), 2);
            }
            other => panic!("expected a nested list, got {other:?}"),
        }
    }

    #[test]
    fn routes_headerless_numbered_bodies_to_a_plain_list() {
        let brief = brief_with("Ihre Vorteile", "1. schneller\n2. günstiger\n3. planbarer");
        let blocks = blocks_for(&brief);
        match &blocks[2] {
            Block::NumberedList(entries) => assert_eq!(entries.len(), 3),
            other => panic!("expected a numbered list, got {other:?}"),
        }
    }

    #[test]
    fn one_router_serves_every_section_of_a_brief() {
        let brief = Brief {
            title: "Testdokument".to_string(),
            sections: vec![
                Section {
                    heading: "Key Benefits".to_string(),
                    body: "1. faster\n2. cheaper".to_string(),
                },
                Section {
                    heading: "Über uns".to_string(),
                    body: "Wir sind ein kleines Team.".to_string(),
                },
                Section {
                    heading: "Typischer Auslöser".to_string(),
                    body: "Ängste:\n1. Angst A".to_string(),
                },
            ],
        };
        let blocks = blocks_for(&brief);
        assert!(matches!(blocks[2], Block::NumberedList(_)));
        assert!(matches!(blocks[4], Block::Paragraph(_)));
        assert!(matches!(blocks[6], Block::NestedList(_)));
    }

    #[test]
    fn routes_prose_headings_to_paragraphs() {
        let brief = brief_with("Über uns", "Wir sind ein kleines Team.");
        let blocks = blocks_for(&brief);
        assert_eq!(
            blocks[2],
            Block::Paragraph("Wir sind ein kleines Team.".to_string())
        );
    }

    #[test]
    fn overflowing_content_spills_onto_additional_pages() {
        let font = mono();
        let style = Style::default();
        let body = "wort ".repeat(3000);
        let brief = brief_with("Über uns", &body);

        let pages = compose(&brief, &font, &font, &style);
        assert!(pages.len() > 1, "expected a multi-page render");

        for page in &pages {
            assert!(!page.contents.is_empty());
            for span in &page.contents {
                assert!(
                    span.coords.1 >= page.content_box.y1,
                    "span baseline below the bottom margin"
                );
                assert!(
                    span.coords.1 <= page.content_box.y2,
                    "span baseline above the top margin"
                );
                assert!(span.coords.0 >= page.content_box.x1);
            }
        }
    }

    #[test]
    fn numbered_items_use_a_hanging_indent() {
        let font = mono();
        let style = Style::default();
        let mut composer = Composer::new(&font, &font, &style);
        let long_entry = "ein ziemlich langer eintrag der sicher mehrfach umgebrochen wird \
                          weil er viel zu viele woerter enthaelt um auf eine zeile zu passen"
            .to_string();
        composer.render(&Block::NumberedList(vec![long_entry]));
        let pages = composer.finish();

        let spans = &pages[0].contents;
        let left = pages[0].content_box.x1;
        let prefix_width = font.width_of("1. ", style.body_size);
        assert_eq!(spans[0].text, "1. ");
        assert_eq!(spans[0].coords.0, left);
        // first text segment and every continuation line align past the prefix
        for span in &spans[1..] {
            assert_eq!(span.coords.0, left + prefix_width);
        }
        assert!(spans.len() > 2, "expected the entry to wrap");
    }

    #[test]
    fn nested_list_indents_examples_past_the_bullet() {
        let font = mono();
        let style = Style::default();
        let mut composer = Composer::new(&font, &font, &style);
        let groups = parse_outline("Ziele:\n1. Mehr Umsatz\n- Beispielhafte Aussage");
        composer.render(&Block::NestedList(groups));
        let pages = composer.finish();

        let spans = &pages[0].contents;
        let left = pages[0].content_box.x1;
        let bullet_x = left + style.bullet_indent;
        let bullet_width = font.width_of("• ", style.body_size);

        let bullet_span = spans
            .iter()
            .find(|s| s.text == "• ")
            .expect("bullet span drawn");
        assert_eq!(bullet_span.coords.0, bullet_x);
        let example_span = spans
            .iter()
            .find(|s| s.text == "Beispielhafte Aussage")
            .expect("example span drawn");
        assert_eq!(example_span.coords.0, bullet_x + bullet_width);
    }

    #[test]
    fn nested_list_draws_canonical_labels_in_bold() {
        let font = mono();
        let style = Style::default();
        let mut composer = Composer::new(&font, &font, &style);
        let groups = parse_outline("Wünsche:\n1. Etwas");
        composer.render(&Block::NestedList(groups));
        let pages = composer.finish();

        let label = &pages[0].contents[0];
        assert_eq!(label.text, "Typische Ziele");
        assert_eq!(label.font.variant, FontVariant::Bold);
        assert_eq!(label.font.size, style.label_size);
    }

    #[test]
    fn empty_outline_renders_no_spans_but_still_finalizes() {
        let font = mono();
        let style = Style::default();
        let mut composer = Composer::new(&font, &font, &style);
        composer.render(&Block::NestedList(Vec::new()));
        let pages = composer.finish();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contents.is_empty());
    }
}
