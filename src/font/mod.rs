//! # Font Management
//!
//! Resolution and measurement for the standard PDF fonts.
//!
//! Only non-embedded standard fonts are supported: the report layout needs a
//! regular and a bold face, metrics come from static AFM tables, and the PDF
//! backend references the fonts by name. Metric tables are immutable, so a
//! [`FontContext`] can be shared freely between concurrent renders.

pub mod metrics;

pub use metrics::FontMetrics;
use std::collections::HashMap;

/// A standard PDF font that needs no embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// The PDF BaseFont name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    /// Rendered width of `text` at `size` points. Pure and deterministic.
    pub fn measure(&self, text: &str, size: f64) -> f64 {
        self.metrics().measure(text, size)
    }
}

/// Maps a font family name to its regular and bold faces.
///
/// Loaded once before any render call and never mutated afterwards; lookups
/// happen at engine construction, not during layout.
pub struct FontContext {
    families: HashMap<&'static str, (StandardFont, StandardFont)>,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        let mut families = HashMap::new();
        families.insert(
            "Helvetica",
            (StandardFont::Helvetica, StandardFont::HelveticaBold),
        );
        families.insert("Courier", (StandardFont::Courier, StandardFont::CourierBold));
        Self { families }
    }

    /// Look up a face by family name. `None` means the family is unknown —
    /// a configuration error the engine surfaces before any layout runs.
    pub fn resolve(&self, family: &str, bold: bool) -> Option<StandardFont> {
        self.families
            .get(family)
            .map(|&(regular, bold_face)| if bold { bold_face } else { regular })
    }
}
