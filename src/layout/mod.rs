//! # Page-Aware Report Layout
//!
//! The engine that turns a [`Report`] into a paginated [`Document`].
//!
//! Every placement decision is made with the page boundary as a hard
//! constraint: a [`PageCursor`] tracks the current vertical position, every
//! drawn element asks it for space first, and the cursor starts a new page
//! when the element would cross the bottom margin. A single line of text is
//! atomic for break purposes; a multi-line section is not, except that a
//! section label always shares a page with its first body line.
//!
//! The engine draws through the [`DocumentWriter`] trait, so the same layout
//! logic can target any page-description backend. [`Document`] is the
//! standard implementation: an ordered list of pages, each an ordered list of
//! draw commands at absolute page coordinates (PDF convention, origin at the
//! bottom-left corner).

pub mod grid;

use crate::error::{Error, Warning};
use crate::font::{FontContext, StandardFont};
use crate::image_loader::ImageRef;
use crate::model::{Report, Section};
use crate::text;

const TITLE_SIZE: f64 = 16.0;
const TITLE_LEADING: f64 = 30.0;
const PATIENT_SIZE: f64 = 12.0;
const PATIENT_ROW_HEIGHT: f64 = 20.0;
const LABEL_SIZE: f64 = 12.0;
const LABEL_LEADING: f64 = 20.0;
const BODY_SIZE: f64 = 10.0;
const BODY_LEADING: f64 = 12.0;
const SECTION_GAP: f64 = 20.0;
const RULE_BLOCK: f64 = 30.0;

/// The sink the layout engine draws into. One implementor per backend.
pub trait DocumentWriter {
    /// Finalize the current page (if any) and start a new one.
    fn begin_page(&mut self);
    /// Draw a text run with its baseline at `(x, y)`.
    fn draw_text(&mut self, x: f64, y: f64, text: &str, font: StandardFont, size: f64);
    /// Draw a horizontal rule from `x1` to `x2` at height `y`.
    fn draw_rule(&mut self, x1: f64, x2: f64, y: f64, width: f64);
    /// Draw an image with its bottom-left corner at `(x, y)`.
    fn draw_image(&mut self, x: f64, y: f64, width: f64, height: f64, image: &ImageRef);
}

/// A single draw command at absolute page coordinates.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        text: String,
        font: StandardFont,
        size: f64,
    },
    Rule {
        x1: f64,
        x2: f64,
        y: f64,
        width: f64,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: ImageRef,
    },
}

/// One fixed-size page of draw commands.
#[derive(Debug, Clone)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

/// The final artifact: an ordered sequence of pages, immutable once the
/// render pass that built it returns.
#[derive(Debug, Clone)]
pub struct Document {
    page_width: f64,
    page_height: f64,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(page_width: f64, page_height: f64) -> Self {
        Self {
            page_width,
            page_height,
            pages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.begin_page();
        }
        self.pages.last_mut().expect("page exists after begin_page")
    }
}

impl DocumentWriter for Document {
    fn begin_page(&mut self) {
        self.pages.push(Page {
            width: self.page_width,
            height: self.page_height,
            ops: Vec::new(),
        });
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, font: StandardFont, size: f64) {
        self.current_page().ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font,
            size,
        });
    }

    fn draw_rule(&mut self, x1: f64, x2: f64, y: f64, width: f64) {
        self.current_page().ops.push(DrawOp::Rule { x1, x2, y, width });
    }

    fn draw_image(&mut self, x: f64, y: f64, width: f64, height: f64, image: &ImageRef) {
        self.current_page().ops.push(DrawOp::Image {
            x,
            y,
            width,
            height,
            image: image.clone(),
        });
    }
}

/// Tracks the current vertical write position on the page.
///
/// This is the single page-break decision point: every drawing operation
/// calls [`PageCursor::ensure_space`] with the exact height it is about to
/// consume, then [`PageCursor::advance`] after drawing. The invariant
/// `page_bottom <= y <= page_top` holds after every operation.
#[derive(Debug, Clone)]
pub struct PageCursor {
    y: f64,
    page_top: f64,
    page_bottom: f64,
}

impl PageCursor {
    pub fn new(page_top: f64, page_bottom: f64) -> Self {
        Self {
            y: page_top,
            page_top,
            page_bottom,
        }
    }

    /// Current vertical position (top of unused space).
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Make room for an element of `height`: if it would cross the bottom
    /// margin, start a new page first.
    pub fn ensure_space<W: DocumentWriter>(&mut self, height: f64, out: &mut W) {
        if self.y - height < self.page_bottom {
            self.break_page(out);
        }
    }

    /// Move down by `height` after a draw. Clamped at the bottom margin so
    /// trailing spacing cannot push the cursor outside the writable region.
    pub fn advance(&mut self, height: f64) {
        self.y = (self.y - height).max(self.page_bottom);
    }

    /// Unconditionally finalize the current page and start a new one.
    pub fn break_page<W: DocumentWriter>(&mut self, out: &mut W) {
        out.begin_page();
        self.y = self.page_top;
    }
}

/// A rendered report: the paginated document plus any per-image warnings
/// collected along the way.
#[derive(Debug)]
pub struct RenderedReport {
    pub document: Document,
    pub warnings: Vec<Warning>,
}

/// Lays out a report onto fixed-size pages: centered title, patient table,
/// one labeled findings block per organ, then the image grid.
///
/// Construction resolves the configured font family; an unknown family is a
/// configuration error surfaced here, never during layout. `render` itself
/// cannot fail — it always produces some document.
pub struct ReportEngine {
    regular: StandardFont,
    bold: StandardFont,
}

impl ReportEngine {
    /// Build an engine drawing with `family` (regular and bold faces).
    pub fn new(family: &str, fonts: &FontContext) -> Result<Self, Error> {
        let regular = fonts
            .resolve(family, false)
            .ok_or_else(|| Error::UnknownFont(family.to_string()))?;
        let bold = fonts
            .resolve(family, true)
            .ok_or_else(|| Error::UnknownFont(family.to_string()))?;
        Ok(Self { regular, bold })
    }

    /// Engine with the default Helvetica faces.
    pub fn with_defaults() -> Self {
        Self {
            regular: StandardFont::Helvetica,
            bold: StandardFont::HelveticaBold,
        }
    }

    /// Render `report` into a fresh [`Document`].
    pub fn render(&self, report: &Report) -> RenderedReport {
        let (page_width, page_height) = report.page.size.dimensions();
        let mut document = Document::new(page_width, page_height);
        let warnings = self.render_into(report, &mut document);
        RenderedReport { document, warnings }
    }

    /// Render `report` through an arbitrary backend.
    ///
    /// Returns the warnings for images that had to be skipped. All layout
    /// state lives on this call's stack; concurrent renders are independent.
    pub fn render_into<W: DocumentWriter>(&self, report: &Report, out: &mut W) -> Vec<Warning> {
        let (page_width, page_height) = report.page.size.dimensions();
        let margin = report.page.margin;
        let column_width = page_width - margin.horizontal();

        // Resolve images up front so layout only sees valid references.
        let mut warnings = Vec::new();
        let images: Vec<ImageRef> = report
            .images
            .iter()
            .filter_map(|src| match ImageRef::resolve(src) {
                Ok(image) => Some(image),
                Err(err) => {
                    warnings.push(Warning {
                        src: src.clone(),
                        message: err.to_string(),
                    });
                    None
                }
            })
            .collect();

        let mut cursor = PageCursor::new(page_height - margin.top, margin.bottom);
        out.begin_page();

        self.draw_title(&mut cursor, out, page_width);
        self.draw_patient_block(&mut cursor, out, report, page_width, margin.left);

        for section in &report.sections {
            self.draw_section(&mut cursor, out, section, margin.left, column_width);
        }

        self.draw_image_grid(&mut cursor, out, &images, margin.left, &mut warnings);

        warnings
    }

    /// Draw one line of text and advance by `leading`.
    fn draw_line<W: DocumentWriter>(
        &self,
        cursor: &mut PageCursor,
        out: &mut W,
        x: f64,
        text: &str,
        font: StandardFont,
        size: f64,
        leading: f64,
    ) {
        cursor.ensure_space(leading, out);
        out.draw_text(x, cursor.y() - leading, text, font, size);
        cursor.advance(leading);
    }

    fn draw_title<W: DocumentWriter>(&self, cursor: &mut PageCursor, out: &mut W, page_width: f64) {
        let title = "VETERINARY ULTRASOUND REPORT";
        let width = self.bold.measure(title, TITLE_SIZE);
        let x = (page_width - width) / 2.0;
        cursor.ensure_space(TITLE_LEADING, out);
        out.draw_text(x, cursor.y() - TITLE_LEADING, title, self.bold, TITLE_SIZE);
        cursor.advance(TITLE_LEADING);
    }

    /// Fixed 3-row, 2-column table of label/value pairs, bold labels and
    /// regular values, followed by a separator rule. Values are assumed
    /// short and are not wrapped.
    fn draw_patient_block<W: DocumentWriter>(
        &self,
        cursor: &mut PageCursor,
        out: &mut W,
        report: &Report,
        page_width: f64,
        left: f64,
    ) {
        let p = &report.patient;
        let rows: [[(&str, &str); 2]; 3] = [
            [("Animal Name:", &p.animal_name), ("Species:", &p.species)],
            [("Breed:", &p.breed), ("Age:", &p.age)],
            [("Owner:", &p.owner), ("Date:", &p.date)],
        ];

        let column_x = [left, page_width / 2.0];
        for row in rows {
            cursor.ensure_space(PATIENT_ROW_HEIGHT, out);
            let baseline = cursor.y() - PATIENT_ROW_HEIGHT;
            for (cell, x) in row.into_iter().zip(column_x) {
                let (label, value) = cell;
                out.draw_text(x, baseline, label, self.bold, PATIENT_SIZE);
                let value_x = x + self.bold.measure(label, PATIENT_SIZE) + 6.0;
                out.draw_text(value_x, baseline, value, self.regular, PATIENT_SIZE);
            }
            cursor.advance(PATIENT_ROW_HEIGHT);
        }

        cursor.ensure_space(RULE_BLOCK, out);
        cursor.advance(10.0);
        out.draw_rule(left, page_width - left, cursor.y(), 1.0);
        cursor.advance(RULE_BLOCK - 10.0);
    }

    /// One organ section: bold label line, wrapped body lines, trailing gap.
    /// The label always shares a page with the first body line; later lines
    /// may break to following pages individually.
    fn draw_section<W: DocumentWriter>(
        &self,
        cursor: &mut PageCursor,
        out: &mut W,
        section: &Section,
        left: f64,
        column_width: f64,
    ) {
        let lines = text::wrap(&section.findings, self.regular, BODY_SIZE, column_width);

        let label_block = if lines.is_empty() {
            LABEL_LEADING
        } else {
            LABEL_LEADING + BODY_LEADING
        };
        cursor.ensure_space(label_block, out);
        out.draw_text(
            left,
            cursor.y() - LABEL_LEADING,
            &format!("{}:", section.organ.label()),
            self.bold,
            LABEL_SIZE,
        );
        cursor.advance(LABEL_LEADING);

        for line in &lines {
            self.draw_line(cursor, out, left, line, self.regular, BODY_SIZE, BODY_LEADING);
        }

        cursor.advance(SECTION_GAP);
    }

    /// The trailing image grid. Images always start on a fresh page so they
    /// are visually separated from the findings text, matching the original
    /// form's behavior even when a row would still fit.
    fn draw_image_grid<W: DocumentWriter>(
        &self,
        cursor: &mut PageCursor,
        out: &mut W,
        images: &[ImageRef],
        left: f64,
        warnings: &mut Vec<Warning>,
    ) {
        if images.is_empty() {
            return;
        }

        cursor.break_page(out);
        self.draw_line(cursor, out, left, "Images", self.bold, LABEL_SIZE, LABEL_LEADING);
        cursor.advance(10.0);

        for row in images.chunks(grid::COLUMNS) {
            cursor.ensure_space(grid::CELL_HEIGHT + grid::ROW_GAP, out);
            let row_top = cursor.y();

            for (col, image) in row.iter().enumerate() {
                let fit = match grid::fit(
                    image.width_px,
                    image.height_px,
                    grid::CELL_WIDTH,
                    grid::CELL_HEIGHT,
                ) {
                    Ok(fit) => fit,
                    Err(err) => {
                        warnings.push(Warning {
                            src: image.src.clone(),
                            message: err.to_string(),
                        });
                        continue;
                    }
                };

                let x = grid::cell_x(left, col) + fit.offset_x;
                let y = row_top - grid::CELL_HEIGHT + fit.offset_y;
                out.draw_image(x, y, fit.draw_w, fit.draw_h, image);
            }

            cursor.advance(grid::CELL_HEIGHT + grid::ROW_GAP);
        }
    }
}
