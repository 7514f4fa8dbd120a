//! # Laudo
//!
//! A page-native renderer for veterinary ultrasound reports.
//!
//! A report is a structured record: patient identification, one findings
//! block per organ of a fixed checklist, and a set of exam captures. Laudo
//! lays it out directly onto fixed-size pages and writes the result as a
//! PDF. The page is the fundamental unit of layout: every placement decision
//! is made with the page boundary as a hard constraint, so content flows
//! *into* pages rather than being sliced after the fact.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]        — Report record: patient, sections, images, page config
//!       ↓
//!   [layout]       — Page-aware layout engine (header, sections, image grid)
//!       ↓
//!   [pdf]          — Serialize to PDF bytes
//! ```
//!
//! Supporting modules: [`font`] resolves and measures the standard PDF
//! fonts, [`text`] wraps findings into lines, [`image_loader`] turns image
//! sources into embeddable pixel data.
//!
//! ## Example
//!
//! ```no_run
//! let mut report = laudo::Report::with_defaults();
//! report.patient.animal_name = "Rex".to_string();
//! let warnings = laudo::render_to_file(&report, std::path::Path::new("rex.pdf"))?;
//! for w in &warnings {
//!     eprintln!("warning: {w}");
//! }
//! # Ok::<(), laudo::Error>(())
//! ```

pub mod error;
pub mod model;
pub mod font;
pub mod text;
pub mod layout;
pub mod image_loader;
pub mod pdf;

use std::path::Path;

pub use error::{Error, Warning};
pub use layout::{Document, DocumentWriter, RenderedReport, ReportEngine};
pub use model::{Metadata, Organ, PageConfig, PageSize, Patient, Report, Section};

use font::FontContext;
use pdf::PdfWriter;

/// Render a report to a paginated document.
///
/// Per-image problems do not fail the render; they come back as warnings on
/// the [`RenderedReport`].
pub fn render(report: &Report) -> RenderedReport {
    ReportEngine::with_defaults().render(report)
}

/// Render a report and persist it as a PDF at `path`.
///
/// The file is written atomically (temp file plus rename), so an existing
/// file at `path` is never left half-overwritten. Returns the per-image
/// warnings on success.
pub fn render_to_file(report: &Report, path: &Path) -> Result<Vec<Warning>, Error> {
    let rendered = render(report);
    let metadata = Metadata::for_report(report);
    PdfWriter::new().save(&rendered.document, &metadata, path)?;
    Ok(rendered.warnings)
}

/// Render a report described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<(Vec<u8>, Vec<Warning>), Error> {
    let report: Report = serde_json::from_str(json)?;
    let rendered = render(&report);
    let metadata = Metadata::for_report(&report);
    let bytes = PdfWriter::new().write(&rendered.document, &metadata);
    Ok((bytes, rendered.warnings))
}

/// Render a report with an explicit font family from the registry.
pub fn render_with_font(report: &Report, family: &str) -> Result<RenderedReport, Error> {
    let fonts = FontContext::new();
    let engine = ReportEngine::new(family, &fonts)?;
    Ok(engine.render(report))
}
