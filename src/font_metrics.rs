//! Glyph widths for the builtin Helvetica faces.
//!
//! Widths are in 1/1000 em (Adobe AFM units) and cover printable ASCII plus
//! the handful of Latin-1 symbols that show up in trade documents.

/// Builtin face used for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug)]
pub struct FontMetrics {
    /// Widths for U+0020..=U+007E
    ascii: &'static [u16; 95],
    default_width: u16,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl FontMetrics {
    pub fn char_width(&self, c: char) -> u16 {
        let code = c as u32;
        if (0x20..=0x7E).contains(&code) {
            return self.ascii[(code - 0x20) as usize];
        }
        match c {
            '\u{B3}' | '\u{B2}' => 333, // superscripts
            '\u{B0}' => 400,            // degree
            '\u{D7}' => 584,            // multiplication
            '\u{20AC}' | '\u{A3}' | '\u{A5}' => 556,
            '\u{A9}' | '\u{AE}' => 737,
            _ => self.default_width,
        }
    }

    /// Width of `text` in points at `font_size` points.
    pub fn string_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 / self.units_per_em as f32 * font_size
    }

    /// Ascender height in points.
    pub fn ascent(&self, font_size: f32) -> f32 {
        self.ascender as f32 / self.units_per_em as f32 * font_size
    }
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

static HELVETICA: FontMetrics = FontMetrics {
    ascii: &HELVETICA_WIDTHS,
    default_width: 556,
    units_per_em: 1000,
    ascender: 718,
    descender: -207,
};

static HELVETICA_BOLD: FontMetrics = FontMetrics {
    ascii: &HELVETICA_BOLD_WIDTHS,
    default_width: 556,
    units_per_em: 1000,
    ascender: 718,
    descender: -207,
};

/// Metrics for a face. Oblique shares the upright widths.
pub fn metrics(face: FontFace) -> &'static FontMetrics {
    match face {
        FontFace::Bold => &HELVETICA_BOLD,
        FontFace::Regular | FontFace::Italic => &HELVETICA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_width() {
        // H=722, e=556, l=222, l=222, o=556 = 2278 units
        let width = metrics(FontFace::Regular).string_width("Hello", 12.0);
        assert!((width - 27.336).abs() < 0.01);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = metrics(FontFace::Regular).string_width("Packing list", 9.0);
        let bold = metrics(FontFace::Bold).string_width("Packing list", 9.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_cubic_metre_symbol() {
        let m = metrics(FontFace::Regular);
        assert_eq!(m.char_width('³'), 333);
        assert_eq!(m.char_width('\u{4E2D}'), 556);
    }
}
