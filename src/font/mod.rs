//! # Font Metrics
//!
//! Glyph widths for line breaking. Two standard fonts ship with built-in
//! metrics; custom TrueType/OpenType fonts are parsed with ttf-parser.
//!
//! Lookups never fail. A character missing from the requested font is tried
//! against each configured special font in order, and finally falls back to
//! a fixed placeholder width.

use std::collections::HashMap;

use base64::Engine as _;

use crate::error::LayoutError;

/// Width of the "unknown glyph" placeholder, in 1/1000 em.
pub const UNKNOWN_GLYPH_WIDTH: u16 = 500;

pub const DEFAULT_FONT: &str = "Helvetica";

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub ascender: i16,
    pub descender: i16,
}

impl CustomFontMetrics {
    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self, LayoutError> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| LayoutError::Font(format!("cannot parse font: {e}")))?;

        let mut advance_widths = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    let Some(ch) = char::from_u32(code) else {
                        return;
                    };
                    if let Some(glyph) = subtable.glyph_index(code) {
                        let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
                        advance_widths.entry(ch).or_insert(advance);
                    }
                });
            }
        }

        Ok(CustomFontMetrics {
            units_per_em: face.units_per_em(),
            advance_widths,
            ascender: face.ascender(),
            descender: face.descender(),
        })
    }
}

/// The standard fonts with built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    Courier,
}

impl StandardFont {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Helvetica" => Some(Self::Helvetica),
            "Courier" => Some(Self::Courier),
            _ => None,
        }
    }

    /// Advance width in 1/1000 em, if the font covers the character.
    pub fn advance(&self, ch: char) -> Option<u16> {
        match self {
            Self::Courier => is_latin1_printable(ch).then_some(600),
            Self::Helvetica => helvetica_advance(ch),
        }
    }
}

fn is_latin1_printable(ch: char) -> bool {
    matches!(ch as u32, 0x20..=0x7E | 0xA0..=0xFF)
}

fn helvetica_advance(ch: char) -> Option<u16> {
    let w = match ch {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'f' | 't' => 278,
        'i' | 'j' | 'l' => 222,
        '"' => 355,
        '\'' => 191,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '~' => 584,
        '%' => 889,
        '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        '@' => 1015,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'F' | 'T' | 'Z' => 611,
        'G' | 'O' | 'Q' => 778,
        'I' => 278,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'L' | '_' => 556,
        'M' | 'm' => 833,
        'W' => 944,
        '^' => 469,
        '{' | '}' => 334,
        '|' => 260,
        '#' | '$' | '?' | '0'..='9' | 'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p'
        | 'q' | 'u' => 556,
        // Latin-1 supplement: close enough for wrapping purposes
        '\u{A0}'..='\u{FF}' => 556,
        _ => return None,
    };
    Some(w)
}

#[derive(Debug, Clone)]
pub enum FontMetrics {
    Standard(StandardFont),
    Custom(CustomFontMetrics),
}

impl FontMetrics {
    /// Advance width in 1/1000 em, if the font covers the character.
    pub fn advance(&self, ch: char) -> Option<f64> {
        match self {
            FontMetrics::Standard(font) => font.advance(ch).map(f64::from),
            FontMetrics::Custom(m) => m
                .advance_widths
                .get(&ch)
                .map(|w| *w as f64 * 1000.0 / m.units_per_em as f64),
        }
    }
}

/// Registered fonts plus the ordered fallback list.
#[derive(Debug, Clone, Default)]
pub struct FontBook {
    custom: HashMap<String, CustomFontMetrics>,
    special: Vec<String>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, family: &str, data: &[u8]) -> Result<(), LayoutError> {
        let metrics = CustomFontMetrics::from_font_data(data)?;
        log::debug!(
            "registered font {family}: {} glyphs, {} units/em",
            metrics.advance_widths.len(),
            metrics.units_per_em
        );
        self.custom.insert(family.to_string(), metrics);
        Ok(())
    }

    /// Register a font from base64 data or a `data:` URI.
    pub fn register_base64(&mut self, family: &str, src: &str) -> Result<(), LayoutError> {
        let payload = match src.split_once(";base64,") {
            Some((_, data)) if src.starts_with("data:") => data,
            _ => src,
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| LayoutError::Font(format!("{family}: invalid base64: {e}")))?;
        self.register(family, &bytes)
    }

    /// Append a font to the fallback chain.
    pub fn add_special_font(&mut self, family: &str) {
        if !self.special.iter().any(|f| f == family) {
            self.special.push(family.to_string());
        }
    }

    pub fn special_fonts(&self) -> &[String] {
        &self.special
    }

    /// Resolve a font name to its metrics.
    pub fn lookup(&self, family: &str) -> Option<FontMetrics> {
        if let Some(custom) = self.custom.get(family) {
            return Some(FontMetrics::Custom(custom.clone()));
        }
        StandardFont::from_name(family).map(FontMetrics::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_widths() {
        let m = FontMetrics::Standard(StandardFont::Helvetica);
        assert_eq!(m.advance('M'), Some(833.0));
        assert_eq!(m.advance('i'), Some(222.0));
        assert_eq!(m.advance(' '), Some(278.0));
        assert_eq!(m.advance('7'), Some(556.0));
        assert_eq!(m.advance('中'), None);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let m = FontMetrics::Standard(StandardFont::Courier);
        assert_eq!(m.advance('i'), Some(600.0));
        assert_eq!(m.advance('W'), Some(600.0));
        assert_eq!(m.advance('\u{263A}'), None);
    }

    #[test]
    fn test_unknown_family_is_not_resolved() {
        let book = FontBook::new();
        assert!(book.lookup("Comic Sans").is_none());
        assert!(book.lookup("Courier").is_some());
    }

    #[test]
    fn test_special_fonts_keep_order_without_duplicates() {
        let mut book = FontBook::new();
        book.add_special_font("Courier");
        book.add_special_font("Helvetica");
        book.add_special_font("Courier");
        assert_eq!(book.special_fonts(), &["Courier", "Helvetica"]);
    }

    #[test]
    fn test_garbage_font_data_is_an_error() {
        let mut book = FontBook::new();
        assert!(matches!(
            book.register("Broken", &[0, 1, 2, 3]),
            Err(LayoutError::Font(_))
        ));
        assert!(book.register_base64("Broken", "not base64!!").is_err());
        assert!(book.lookup("Broken").is_none());
    }
}
