use crate::{
    refs::{ObjectReferences, RefType},
    BriefError, Pt,
};
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use pdf_writer::{
    types::{FontFlags, SystemInfo},
    Finish, Name, Pdf, Ref, Str,
};
use std::collections::HashMap;

/// Measurement capability required by the layout engine.
///
/// Wrapping and indent calculations must use the exact same metrics as the
/// final drawing pass, so the renderer resolves its typefaces once per render
/// and threads them through every measure call. The trait exists so layout
/// code can be exercised with a fixed-advance stand-in where no font file is
/// available.
pub trait Typeface {
    /// Measured width of `text` at `size`, ignoring newlines and glyphs the
    /// face does not cover
    fn width_of(&self, text: &str, size: Pt) -> Pt;
    /// Distance from the baseline to the top of the face at `size`
    fn ascent(&self, size: Pt) -> Pt;
    /// Distance from the baseline to the bottom of the face at `size`.
    /// Note: this is usually negative
    fn descent(&self, size: Pt) -> Pt;
    /// Default vertical offset between two rows of text at `size`
    fn line_height(&self, size: Pt) -> Pt;
}

/// Which member of a [FontSet] a span is drawn with. The variant is resolved
/// to a concrete embedded font when the document is written.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FontVariant {
    Regular,
    Bold,
}

impl FontVariant {
    pub(crate) fn index(self) -> usize {
        match self {
            FontVariant::Regular => 0,
            FontVariant::Bold => 1,
        }
    }
}

/// A parsed font face. Fonts can be TTF or OTF fonts, and are embedded in
/// their entirety in the generated PDF, so large fonts may dramatically
/// increase the size of the output.
pub struct Font {
    pub face: OwnedFace,
}

impl Font {
    /// Load a font from raw bytes, returning an error if the face could not
    /// be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, BriefError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font { face })
    }

    /// The full name of the font, falling back to the family name and then a
    /// placeholder when the face carries no usable name records
    pub fn name(&self) -> String {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == owned_ttf_parser::name_id::FULL_NAME && name.is_unicode())
            .and_then(|name| name.to_string())
            .unwrap_or_else(|| self.family())
    }

    /// The family name of the font
    pub fn family(&self) -> String {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == owned_ttf_parser::name_id::FAMILY && name.is_unicode())
            .and_then(|name| name.to_string())
            .unwrap_or_else(|| "Unnamed".to_string())
    }

    fn scaling(&self, size: Pt) -> Pt {
        size / Pt(self.face.as_face_ref().units_per_em() as f32)
    }

    /// Look up the glyph id for a character, if the face covers it
    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    /// Glyph id used when drawing `ch`: the character's own glyph, the
    /// replacement glyph, a question mark, or `.notdef` in that order
    pub(crate) fn encoded_glyph(&self, ch: char) -> u16 {
        self.glyph_id(ch)
            .or_else(|| self.glyph_id('\u{FFFD}'))
            .or_else(|| self.glyph_id('?'))
            .unwrap_or(0)
    }

    /// Map of glyph id to the character it renders, built from the unicode
    /// cmap subtables
    fn glyph_map(&self) -> HashMap<u16, char> {
        let mut map: HashMap<u16, char> = HashMap::new();

        let Some(cmap) = self.face.as_face_ref().tables().cmap else {
            return map;
        };
        for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        map
    }

    /// Horizontal advances (in font units) for every mapped glyph
    fn glyph_advances(&self, ids: &HashMap<u16, char>) -> Vec<(u16, u16)> {
        let mut advances: Vec<(u16, u16)> = ids
            .iter()
            .filter_map(|(&gid, _)| {
                self.face
                    .as_face_ref()
                    .glyph_hor_advance(owned_ttf_parser::GlyphId(gid))
                    .map(|adv| (gid, adv))
            })
            .collect();
        advances.sort_by_key(|&(gid, _)| gid);
        advances
    }

    fn write_font_data(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::FontData(font_index));

        writer
            .stream(id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let font_data_stream_id = self.write_font_data(refs, font_index, writer);

        let ids = self.glyph_map();
        let advances = self.glyph_advances(&ids);
        let scaling = 1000.0 / self.face.as_face_ref().units_per_em() as f32;

        let max_width = advances.iter().map(|&(_, w)| w).max().unwrap_or_default() as f32 * scaling;
        let avg_width = if advances.is_empty() {
            0.0
        } else {
            advances.iter().map(|&(_, w)| w as f32).sum::<f32>() / advances.len() as f32 * scaling
        };

        let id = refs.gen(RefType::FontDescriptor(font_index));

        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(self.name().as_bytes()));
        descriptor.family(Str(self.family().as_bytes()));
        descriptor.weight(self.face.as_face_ref().weight().to_number());

        let mut flags: FontFlags = FontFlags::empty();
        if self.face.as_face_ref().is_monospaced() {
            flags.set(FontFlags::FIXED_PITCH, true);
        }
        if self.face.as_face_ref().is_italic() {
            flags.set(FontFlags::ITALIC, true);
        }
        descriptor.flags(flags);

        descriptor.bbox(pdf_writer::Rect {
            x1: 0.0,
            y1: self.face.as_face_ref().descender() as f32 * scaling,
            x2: max_width,
            y2: self.face.as_face_ref().ascender() as f32 * scaling,
        });
        descriptor.italic_angle(self.face.as_face_ref().italic_angle());
        descriptor.ascent(self.face.as_face_ref().ascender() as f32 * scaling);
        descriptor.descent(self.face.as_face_ref().descender() as f32 * scaling);
        descriptor.leading(self.face.as_face_ref().line_gap() as f32 * scaling);
        descriptor.cap_height(
            self.face
                .as_face_ref()
                .capital_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(1000.0),
        );
        descriptor.x_height(
            self.face
                .as_face_ref()
                .x_height()
                .unwrap_or_else(|| self.face.as_face_ref().capital_height().unwrap_or_default())
                as f32
                * scaling,
        );
        // TODO: derive the real vertical stem width from the glyf table
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width);
        descriptor.max_width(max_width);
        descriptor.missing_width(max_width);

        descriptor.font_file2(font_data_stream_id);

        id
    }

    fn write_cid(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) -> Ref {
        let font_descriptor_id = self.write_descriptor(refs, font_index, writer);

        let id = refs.gen(RefType::CidFont(font_index));

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(pdf_writer::types::CidFontType::Type2);
        cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(font_descriptor_id);

        let ids = self.glyph_map();
        let advances = self.glyph_advances(&ids);
        let scaling = 1000.0 / self.face.as_face_ref().units_per_em() as f32;

        let mut widths = cid_font.widths();
        widths.consecutive(0, [1000.0]);

        // group runs of consecutive glyph ids into single width blocks
        let mut start_cid: u16 = 0;
        let mut run: Vec<f32> = Vec::new();
        for (cid, advance) in advances.into_iter() {
            if run.is_empty() || (cid as usize) != start_cid as usize + run.len() {
                if !run.is_empty() {
                    widths.consecutive(start_cid, run.clone());
                }
                start_cid = cid;
                run.clear();
            }
            run.push(advance as f32 * scaling);
        }
        if !run.is_empty() {
            widths.consecutive(start_cid, run);
        }
        widths.finish();

        cid_font.default_width(1000.0);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut map: String = r#"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
"#
        .replace("\r\n", "\n");

        let mut ids: Vec<(u16, char)> = self.glyph_map().into_iter().collect();
        ids.sort_by_key(|&(gid, _)| gid);

        // bfchar blocks are limited to 100 entries and a shared high byte
        for block in ids.chunks(100) {
            for group in block.chunk_by(|a, b| (a.0 >> 8) == (b.0 >> 8)) {
                map.push_str(&format!("{} beginbfchar\n", group.len()));
                for &(gid, ch) in group {
                    map.push_str(&format!("<{gid:04x}> <{:04x}>\n", u32::from(ch)));
                }
                map.push_str("endbfchar\n");
            }
        }

        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        let mut stream = writer.stream(id, compressed.as_slice());
        stream.filter(pdf_writer::Filter::FlateDecode);

        id
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) {
        let font_id = refs.gen(RefType::Font(font_index));
        let cid_font_id = self.write_cid(refs, font_index, writer);
        let to_unicode_id = self.write_to_unicode(refs, font_index, writer);

        let mut font = writer.type0_font(font_id);
        font.base_font(Name(format!("F{font_index}").as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_id);
        font.to_unicode(to_unicode_id);
    }
}

impl Typeface for Font {
    fn width_of(&self, text: &str, size: Pt) -> Pt {
        let scaling = self.scaling(size);
        text.chars()
            .filter_map(|ch| self.glyph_id(ch))
            .map(|gid| {
                scaling
                    * self
                        .face
                        .as_face_ref()
                        .glyph_hor_advance(owned_ttf_parser::GlyphId(gid))
                        .unwrap_or_default() as f32
            })
            .sum()
    }

    fn ascent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().ascender() as f32
    }

    fn descent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().descender() as f32
    }

    fn line_height(&self, size: Pt) -> Pt {
        let scaling = self.scaling(size);
        let leading = scaling * self.face.as_face_ref().line_gap() as f32;
        let ascent = scaling * self.face.as_face_ref().ascender() as f32;
        let descent = scaling * self.face.as_face_ref().descender() as f32;
        leading + ascent - descent
    }
}

/// The regular and emphasized faces a brief is rendered with. Both faces are
/// resolved before rendering begins and embedded in full when the document is
/// written; the same set must be used for measuring and drawing.
pub struct FontSet {
    pub regular: Font,
    pub bold: Font,
}

impl FontSet {
    /// Parse a regular and a bold face from raw bytes. The caller is
    /// responsible for supplying a fallback when the emphasized variant is
    /// unavailable; there is no internal substitution.
    pub fn load(regular: Vec<u8>, bold: Vec<u8>) -> Result<FontSet, BriefError> {
        Ok(FontSet {
            regular: Font::load(regular)?,
            bold: Font::load(bold)?,
        })
    }

    pub fn get(&self, variant: FontVariant) -> &Font {
        match variant {
            FontVariant::Regular => &self.regular,
            FontVariant::Bold => &self.bold,
        }
    }

    pub(crate) fn faces(&self) -> [&Font; 2] {
        [&self.regular, &self.bold]
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Fixed-advance measurer: every character is `advance` points wide
    /// regardless of size, ascent is 80% of the size, descent 20%.
    pub(crate) struct MonoMeasure {
        pub advance: f32,
    }

    impl Typeface for MonoMeasure {
        fn width_of(&self, text: &str, _size: Pt) -> Pt {
            Pt(text.chars().count() as f32 * self.advance)
        }

        fn ascent(&self, size: Pt) -> Pt {
            size * 0.8
        }

        fn descent(&self, size: Pt) -> Pt {
            Pt(0.0) - size * 0.2
        }

        fn line_height(&self, size: Pt) -> Pt {
            size * 1.2
        }
    }
}
