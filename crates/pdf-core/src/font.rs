//! Font handling for PDF documents
//!
//! Two kinds of fonts are supported:
//! - the standard Type1 Helvetica faces, which every PDF reader ships, measured
//!   with their published AFM advance widths
//! - TrueType fonts embedded as Type0/CIDFontType2 with Identity-H encoding

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::BTreeSet;

/// Helvetica-Bold advance widths for WinAnsi 0x20..=0x7E (1000 units per em)
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Helvetica-Bold advance widths for WinAnsi 0x80..=0xFF
#[rustfmt::skip]
const HELVETICA_BOLD_HIGH_WIDTHS: [u16; 128] = [
    556, 350, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    350, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 350, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// Helvetica advance widths for WinAnsi 0x20..=0x7E (1000 units per em)
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica advance widths for WinAnsi 0x80..=0xFF
#[rustfmt::skip]
const HELVETICA_HIGH_WIDTHS: [u16; 128] = [
    556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Code drawn in place of anything WinAnsiEncoding cannot represent
const REPLACEMENT_CODE: u8 = b'?';

/// WinAnsiEncoding (cp1252) byte for a character
///
/// Control characters have no glyph and are not encoded.
pub fn winansi_code(c: char) -> Option<u8> {
    let code = match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Standard PDF Type1 fonts with built-in metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// Get the PDF BaseFont name for this font
    pub fn base_font_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Map text onto WinAnsi byte codes, `?` for anything unencodable
    pub fn encode_bytes(text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| winansi_code(c).unwrap_or(REPLACEMENT_CODE))
            .collect()
    }

    fn code_width(&self, code: u8) -> u16 {
        let (low, high) = match self {
            StandardFont::Helvetica => (&HELVETICA_WIDTHS, &HELVETICA_HIGH_WIDTHS),
            StandardFont::HelveticaBold => (&HELVETICA_BOLD_WIDTHS, &HELVETICA_BOLD_HIGH_WIDTHS),
        };
        match code {
            0x20..=0x7E => low[(code - 0x20) as usize],
            0x80..=0xFF => high[(code - 0x80) as usize],
            _ => low[(REPLACEMENT_CODE - 0x20) as usize],
        }
    }

    /// Advance width of a single character in 1/1000 em
    pub fn char_width(&self, c: char) -> u16 {
        self.code_width(winansi_code(c).unwrap_or(REPLACEMENT_CODE))
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 / 1000.0 * font_size
    }

    /// Encode text as a PDF literal string for the Tj operator
    ///
    /// Bytes outside printable ASCII are written as octal escapes.
    pub fn encode_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('(');
        for code in Self::encode_bytes(text) {
            match code {
                b'(' => out.push_str(r"\("),
                b')' => out.push_str(r"\)"),
                b'\\' => out.push_str(r"\\"),
                0x20..=0x7E => out.push(code as char),
                _ => out.push_str(&format!("\\{code:03o}")),
            }
        }
        out.push(')');
        out
    }

    /// Build the font dictionary
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", Object::Name(self.base_font_name().into())),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

/// Font data structure for embedded TrueType fonts
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Characters used (drives the /W array and ToUnicode map)
    pub used_chars: BTreeSet<char>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data: ttf_data.to_vec(),
            used_chars: BTreeSet::new(),
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0).ok()
    }

    /// Add characters to the used set
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.face()
            .and_then(|face| face.glyph_index(c).map(|id| id.0))
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        self.face().map(|face| face.units_per_em()).unwrap_or(1000)
    }

    /// Get font ascender
    pub fn ascender(&self) -> i16 {
        self.face().map(|face| face.ascender()).unwrap_or(800)
    }

    /// Get font descender
    pub fn descender(&self) -> i16 {
        self.face().map(|face| face.descender()).unwrap_or(-200)
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        let Some(face) = self.face() else {
            return 0;
        };
        text.chars()
            .filter_map(|c| face.glyph_index(c))
            .filter_map(|gid| face.glyph_hor_advance(gid))
            .map(|w| w as u32)
            .sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let width = self.text_width(text);
        let units_per_em = self.units_per_em() as f32;
        (width as f32 / units_per_em) * font_size
    }

    /// Encode text as hex glyph IDs for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let face = self.face();
        let mut result = String::new();
        for c in text.chars() {
            let gid = face
                .as_ref()
                .and_then(|f| f.glyph_index(c))
                .map(|g| g.0)
                .unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        format!("<{result}>")
    }

    /// Generate all PDF objects needed to embed this font
    ///
    /// References between the objects are left as placeholders; the document
    /// wires them up once each object has an id.
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let font_name = Object::Name(self.name.clone().into());

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(
            Dictionary::from_iter(vec![("Type", "CMap".into())]),
            tounicode_content.into_bytes(),
        );

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.clone(),
        );

        let units_per_em = self.units_per_em() as i64;
        let ascender = self.ascender() as i64;
        let descender = self.descender() as i64;

        let font_bbox: Vec<Object> = vec![
            0.into(),
            descender.into(),
            units_per_em.into(),
            ascender.into(),
        ];

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()),
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascender.into()),
            ("Descent", descender.into()),
            ("CapHeight", ascender.into()),
            ("StemV", 80.into()),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("W", self.generate_widths_array().into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Generate /W array for glyph widths, scaled to 1000 units per em
    fn generate_widths_array(&self) -> Vec<Object> {
        let mut widths = Vec::new();
        let Some(face) = self.face() else {
            return widths;
        };
        let scale = 1000.0 / face.units_per_em() as f32;

        let mut gids: Vec<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| face.glyph_index(c).map(|g| g.0))
            .collect();
        gids.sort_unstable();
        gids.dedup();

        for gid in gids {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(gid))
                .map(|a| (a as f32 * scale).round() as i64)
                .unwrap_or(1000);
            widths.push((gid as i64).into());
            widths.push(vec![Object::from(advance)].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let chars: Vec<char> = self.used_chars.iter().copied().collect();
        // bfchar sections are limited to 100 entries
        for chunk in chars.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for c in chunk {
                let gid = self.glyph_id(*c).unwrap_or(0);
                let mut utf16 = [0u16; 2];
                let units: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{units}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

/// A font registered with a document
#[derive(Debug, Clone)]
pub enum PdfFont {
    Standard(StandardFont),
    TrueType(FontData),
}

impl PdfFont {
    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        match self {
            PdfFont::Standard(font) => font.text_width_points(text, font_size),
            PdfFont::TrueType(font) => font.text_width_points(text, font_size),
        }
    }

    /// Encode text as the string operand of a Tj operator
    pub fn encode_text(&self, text: &str) -> String {
        match self {
            PdfFont::Standard(font) => font.encode_text(text),
            PdfFont::TrueType(font) => font.encode_text_hex(text),
        }
    }

    /// Record characters drawn with this font
    pub fn add_chars(&mut self, text: &str) {
        if let PdfFont::TrueType(font) = self {
            font.add_chars(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font_without_face() -> FontData {
        FontData {
            name: "test".to_string(),
            ttf_data: vec![0u8; 100],
            used_chars: BTreeSet::new(),
        }
    }

    #[test]
    fn test_from_ttf_rejects_garbage() {
        let result = FontData::from_ttf("bad", &[0u8; 100]);
        assert!(matches!(result, Err(PdfError::FontParseError(_))));
    }

    #[test]
    fn test_helvetica_bold_widths() {
        let font = StandardFont::HelveticaBold;
        assert_eq!(font.char_width(' '), 278);
        assert_eq!(font.char_width('W'), 944);
        assert_eq!(font.char_width('i'), 278);
        assert_eq!(font.char_width('m'), 889);
        assert_eq!(font.char_width('~'), 584);
    }

    #[test]
    fn test_helvetica_widths() {
        let font = StandardFont::Helvetica;
        assert_eq!(font.char_width('@'), 1015);
        assert_eq!(font.char_width('i'), 222);
    }

    #[test]
    fn test_standard_text_width_points() {
        // "Hi" in Helvetica-Bold: 722 + 278 = 1000 units = 1 em
        let width = StandardFont::HelveticaBold.text_width_points("Hi", 9.0);
        assert!((width - 9.0).abs() < 1e-4);
        assert_eq!(StandardFont::HelveticaBold.text_width_points("", 9.0), 0.0);
    }

    #[test]
    fn test_standard_width_scales_with_size() {
        let font = StandardFont::HelveticaBold;
        let small = font.text_width_points("example.com", 5.0);
        let large = font.text_width_points("example.com", 10.0);
        assert!((large - small * 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_winansi_codes() {
        assert_eq!(winansi_code('A'), Some(0x41));
        assert_eq!(winansi_code('\u{e9}'), Some(0xE9));
        assert_eq!(winansi_code('\u{20ac}'), Some(0x80));
        assert_eq!(winansi_code('\u{2014}'), Some(0x97));
        assert_eq!(winansi_code('\n'), None);
        assert_eq!(winansi_code('\u{0e01}'), None);
        assert_eq!(StandardFont::encode_bytes("caf\u{e9} \u{0e01}"), b"caf\xE9 ?");
    }

    #[test]
    fn test_latin_widths() {
        let bold = StandardFont::HelveticaBold;
        assert_eq!(bold.char_width('\u{e9}'), 556);
        assert_eq!(bold.char_width('\u{f1}'), 611);
        assert_eq!(bold.char_width('\u{c9}'), 667);
        assert_eq!(bold.char_width('\u{20ac}'), 556);
        assert_eq!(bold.char_width('\u{2014}'), 1000);

        let regular = StandardFont::Helvetica;
        assert_eq!(regular.char_width('\u{e7}'), 500);
        assert_eq!(regular.char_width('\u{c0}'), 667);
    }

    #[test]
    fn test_unencodable_chars_measure_as_replacement() {
        let font = StandardFont::HelveticaBold;
        assert_eq!(font.char_width('\u{0e01}'), font.char_width('?'));
        assert_eq!(font.char_width('\t'), font.char_width('?'));
    }

    #[test]
    fn test_standard_encode_latin() {
        let font = StandardFont::HelveticaBold;
        assert_eq!(font.encode_text("caf\u{e9}"), r"(caf\351)");
        assert_eq!(font.encode_text("\u{20ac}5"), r"(\2005)");
    }

    #[test]
    fn test_standard_encode_escapes() {
        let font = StandardFont::Helvetica;
        assert_eq!(font.encode_text("a(b)c"), r"(a\(b\)c)");
        assert_eq!(font.encode_text(r"x\y"), r"(x\\y)");
    }

    #[test]
    fn test_standard_font_dictionary() {
        let dict = StandardFont::HelveticaBold.to_pdf_dictionary();
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Type1");
        assert_eq!(
            dict.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"Helvetica-Bold"
        );
    }

    #[test]
    fn test_add_chars() {
        let mut font = font_without_face();
        font.add_chars("Hello");
        assert_eq!(font.used_chars.len(), 4);
        assert!(font.used_chars.contains(&'H'));
        assert!(font.used_chars.contains(&'l'));
    }

    #[test]
    fn test_metrics_without_face() {
        let font = font_without_face();
        assert_eq!(font.units_per_em(), 1000);
        assert_eq!(font.ascender(), 800);
        assert_eq!(font.descender(), -200);
        assert_eq!(font.text_width("Hello"), 0);
        assert_eq!(font.text_width_points("Hello", 12.0), 0.0);
    }

    #[test]
    fn test_encode_text_hex_no_face() {
        let font = font_without_face();
        assert_eq!(font.encode_text_hex(""), "<>");
        assert_eq!(font.encode_text_hex("AB"), "<00000000>");
    }

    #[test]
    fn test_to_pdf_objects() {
        let mut font = font_without_face();
        font.add_chars("Hello");

        let objects = font.to_pdf_objects().unwrap();
        assert!(!objects.type0_font.is_empty());
        assert!(!objects.cid_font.is_empty());
        assert!(!objects.font_descriptor.is_empty());
        assert!(!objects.font_file_stream.content.is_empty());
        assert!(!objects.tounicode_stream.content.is_empty());
    }

    #[test]
    fn test_generate_tounicode_cmap() {
        let mut font = font_without_face();
        font.add_chars("AB");

        let cmap = font.generate_tounicode_cmap();
        assert!(cmap.contains("begincmap"));
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0000> <0041>"));
        assert!(cmap.contains("<0000> <0042>"));
        assert!(cmap.contains("endcmap"));
    }

    #[test]
    fn test_pdf_font_dispatch() {
        let mut font = PdfFont::Standard(StandardFont::HelveticaBold);
        font.add_chars("ignored");
        assert_eq!(font.encode_text("ab"), "(ab)");
        assert!(font.text_width_points("ab", 10.0) > 0.0);

        let mut font = PdfFont::TrueType(font_without_face());
        font.add_chars("x");
        assert_eq!(font.encode_text("x"), "<0000>");
    }
}
