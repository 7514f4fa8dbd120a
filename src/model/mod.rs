//! # Report Model
//!
//! The input representation for the layout engine. A report is a flat,
//! structured record: patient identification, one findings section per organ
//! of a fixed checklist, and a list of image sources. This is designed to be
//! easily produced by a form GUI or direct JSON construction.
//!
//! The organ checklist is fixed and ordered at build time — there is no
//! dynamic schema. Section order is significant for output.

use serde::{Deserialize, Serialize};

/// A complete exam report ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Patient identification block.
    #[serde(default)]
    pub patient: Patient,

    /// Per-organ findings, in checklist order. The GUI collaborator seeds
    /// this from [`Report::with_defaults`] and lets the user edit the text.
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Image sources: file paths or `data:image/...;base64,` URIs.
    #[serde(default)]
    pub images: Vec<String>,

    /// Page configuration for the rendered document.
    #[serde(default)]
    pub page: PageConfig,
}

impl Report {
    /// A report with the full organ checklist pre-filled with boilerplate
    /// findings, ready for user editing.
    pub fn with_defaults() -> Self {
        Self {
            patient: Patient::default(),
            sections: Organ::ALL
                .iter()
                .map(|&organ| Section {
                    organ,
                    findings: organ.default_findings().to_string(),
                })
                .collect(),
            images: Vec::new(),
            page: PageConfig::default(),
        }
    }
}

/// Patient identification fields. All free text; the form keeps them short
/// (they are drawn without wrapping).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default)]
    pub animal_name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub date: String,
}

/// One labeled findings block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub organ: Organ,
    #[serde(default)]
    pub findings: String,
}

/// The fixed checklist of anatomical sections, plus the trailing free-form
/// observations block. Variant order is the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Organ {
    Liver,
    Gallbladder,
    Spleen,
    Kidneys,
    Bladder,
    Stomach,
    IntestinalLoops,
    Pancreas,
    AdrenalGlands,
    ReproductiveTract,
    Observations,
}

impl Organ {
    /// Checklist order, stable and significant.
    pub const ALL: [Organ; 11] = [
        Organ::Liver,
        Organ::Gallbladder,
        Organ::Spleen,
        Organ::Kidneys,
        Organ::Bladder,
        Organ::Stomach,
        Organ::IntestinalLoops,
        Organ::Pancreas,
        Organ::AdrenalGlands,
        Organ::ReproductiveTract,
        Organ::Observations,
    ];

    /// The section heading drawn in the report.
    pub fn label(&self) -> &'static str {
        match self {
            Organ::Liver => "Liver",
            Organ::Gallbladder => "Gallbladder",
            Organ::Spleen => "Spleen",
            Organ::Kidneys => "Kidneys",
            Organ::Bladder => "Bladder",
            Organ::Stomach => "Stomach",
            Organ::IntestinalLoops => "Intestinal Loops",
            Organ::Pancreas => "Pancreas",
            Organ::AdrenalGlands => "Adrenal Glands",
            Organ::ReproductiveTract => "Reproductive Tract",
            Organ::Observations => "Observations",
        }
    }

    /// Boilerplate findings text the form pre-fills for this organ.
    pub fn default_findings(&self) -> &'static str {
        match self {
            Organ::Liver => {
                "Hepatic parenchyma of normal dimensions, with normal echogenicity, \
                 regular contours and homogeneous echotexture. No focal or diffuse \
                 lesions observed. Hepatic vessels with normal caliber and course."
            }
            Organ::Gallbladder => {
                "Gallbladder of normal dimensions, pear-shaped, with regular contours \
                 and anechoic content. Wall of normal thickness. No calculi or \
                 sediment observed in its interior."
            }
            Organ::Spleen => {
                "Spleen of normal dimensions, with preserved echogenicity and \
                 echotexture. Regular contours and homogeneous parenchyma. No focal \
                 or diffuse lesions observed."
            }
            Organ::Kidneys => {
                "Kidneys of normal dimensions, contours and echogenicity. \
                 Corticomedullary ratio preserved. No dilation of the collecting \
                 system or presence of calculi observed. Pelvic region without \
                 alterations."
            }
            Organ::Bladder => {
                "Bladder with thin, regular walls and anechoic content. Adequate \
                 volume at the time of the exam. No calculi, sediment or masses \
                 observed."
            }
            Organ::Stomach => {
                "Stomach with walls of normal thickness and preserved layer \
                 stratification. Content and peristalsis compatible with normality."
            }
            Organ::IntestinalLoops => {
                "Intestinal loops with walls of normal thickness and preserved layer \
                 stratification. Peristalsis within normal patterns. No obstructions \
                 or masses observed."
            }
            Organ::Pancreas => {
                "Pancreas of normal dimensions and echogenicity, without evident \
                 structural alterations."
            }
            Organ::AdrenalGlands => {
                "Adrenal glands with normal shape, dimensions and echogenicity."
            }
            Organ::ReproductiveTract => {
                "Reproductive tract structures without evident alterations on \
                 ultrasound examination."
            }
            Organ::Observations => "No additional observations.",
        }
    }
}

/// Document metadata embedded in the PDF Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

impl Metadata {
    /// Metadata derived from a report's patient block.
    pub fn for_report(report: &Report) -> Self {
        let title = if report.patient.animal_name.is_empty() {
            "Veterinary Ultrasound Report".to_string()
        } else {
            format!("Veterinary Ultrasound Report - {}", report.patient.animal_name)
        };
        Self {
            title: Some(title),
            author: None,
            subject: Some("Veterinary ultrasound examination".to_string()),
        }
    }
}

/// Configuration for a page: size and margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page size. Defaults to A4.
    #[serde(default = "PageSize::default")]
    pub size: PageSize,

    /// Page margins in points (1/72 inch). The writable column is the page
    /// width minus the left/right margins.
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
        }
    }
}

fn default_margin() -> Edges {
    Edges {
        top: 30.0,
        right: 50.0,
        bottom: 50.0,
        left: 50.0,
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checklist_is_complete_and_ordered() {
        let report = Report::with_defaults();
        assert_eq!(report.sections.len(), 11);
        assert_eq!(report.sections.first().unwrap().organ, Organ::Liver);
        assert_eq!(report.sections.last().unwrap().organ, Organ::Observations);
        for (section, &organ) in report.sections.iter().zip(Organ::ALL.iter()) {
            assert_eq!(section.organ, organ);
            assert!(!section.findings.is_empty());
        }
    }

    #[test]
    fn report_roundtrips_through_json() {
        let report = Report::with_defaults();
        let json = serde_json::to_string(&report).unwrap();
        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sections.len(), report.sections.len());
        assert_eq!(back.sections[3].organ, Organ::Kidneys);
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let report: Report = serde_json::from_str("{}").unwrap();
        assert!(report.sections.is_empty());
        assert!(report.images.is_empty());
        let (w, h) = report.page.size.dimensions();
        assert!((w - 595.28).abs() < 0.01);
        assert!((h - 841.89).abs() < 0.01);
    }

    #[test]
    fn metadata_uses_animal_name() {
        let mut report = Report::with_defaults();
        report.patient.animal_name = "Rex".to_string();
        let meta = Metadata::for_report(&report);
        assert!(meta.title.unwrap().contains("Rex"));
    }
}
