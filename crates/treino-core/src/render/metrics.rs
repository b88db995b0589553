//! Advance widths of the two built-in PDF fonts used by the renderer.
//!
//! Widths are in 1/1000 em, taken from the standard Helvetica and
//! Helvetica-Bold font metrics for printable ASCII. Accented Latin-1 letters
//! use the width of their base letter.

use unicode_normalization::UnicodeNormalization;

/// Millimetres per PDF point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// One of the standard Type 1 fonts every PDF reader ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// PostScript name of the font.
    pub fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }

    fn ascii_widths(self) -> &'static [u16; 95] {
        match self {
            Self::Regular => &HELVETICA,
            Self::Bold => &HELVETICA_BOLD,
        }
    }

    fn fallback_width(self) -> u16 {
        match self {
            Self::Regular => 556,
            Self::Bold => 611,
        }
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Advance width of `c` in 1/1000 em.
pub fn char_width(c: char, font: Font) -> u16 {
    if let Some(w) = ascii_width(c, font) {
        return w;
    }
    match c {
        '\u{00A0}' => 278,
        _ => std::iter::once(c)
            .nfd()
            .next()
            .and_then(|base| ascii_width(base, font))
            .unwrap_or_else(|| font.fallback_width()),
    }
}

fn ascii_width(c: char, font: Font) -> Option<u16> {
    let code = c as u32;
    if (32..=126).contains(&code) {
        Some(font.ascii_widths()[(code - 32) as usize])
    } else {
        None
    }
}

/// Advance of a single character at `size` points, in millimetres.
pub fn char_advance(c: char, font: Font, size: f32) -> f32 {
    f32::from(char_width(c, font)) * size / 1000.0 * MM_PER_PT
}

/// Width of `text` set in `font` at `size` points, in millimetres.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, font))).sum();
    units as f32 * size / 1000.0 * MM_PER_PT
}
