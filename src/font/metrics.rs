//! AFM advance widths for the standard PDF fonts we register.
//!
//! Widths are in 1/1000 of the font size, straight from the Adobe AFM files.
//! Only the ASCII printable range is tabulated; everything else (Latin-1
//! accents in patient fields, mostly) falls back to a per-font default width.
//! That keeps measurement deterministic without shipping full WinAnsi tables.

use super::StandardFont;

/// Static metrics for one standard font.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Advance widths for chars 0x20..=0x7E, in font units (1/1000 em).
    widths: &'static [u16; 95],
    /// Width used for characters outside the table.
    default_width: u16,
}

impl FontMetrics {
    /// Advance width of a single character in points at `size`.
    pub fn char_width(&self, ch: char, size: f64) -> f64 {
        let units = match ch as u32 {
            0x20..=0x7E => self.widths[ch as usize - 0x20],
            _ => self.default_width,
        };
        units as f64 / 1000.0 * size
    }

    /// Rendered width of a string in points at `size`.
    pub fn measure(&self, text: &str, size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, size)).sum()
    }
}

impl StandardFont {
    /// Static AFM metrics for this font.
    pub fn metrics(&self) -> &'static FontMetrics {
        match self {
            StandardFont::Helvetica => &HELVETICA,
            StandardFont::HelveticaBold => &HELVETICA_BOLD,
            StandardFont::Courier => &COURIER,
            StandardFont::CourierBold => &COURIER_BOLD,
        }
    }
}

static HELVETICA: FontMetrics = FontMetrics {
    widths: &HELVETICA_WIDTHS,
    default_width: 556,
};

static HELVETICA_BOLD: FontMetrics = FontMetrics {
    widths: &HELVETICA_BOLD_WIDTHS,
    default_width: 611,
};

static COURIER: FontMetrics = FontMetrics {
    widths: &[600; 95],
    default_width: 600,
};

static COURIER_BOLD: FontMetrics = FontMetrics {
    widths: &[600; 95],
    default_width: 600,
};

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    // 0x20 space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0x30 digits, : ; < = > ?
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    // 0x40 @ A-O
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    // 0x50 P-Z [ \ ] ^ _
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    // 0x60 ` a-o
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    // 0x70 p-z { | } ~
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
