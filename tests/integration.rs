//! Integration tests for the Laudo rendering pipeline.
//!
//! These tests exercise the full path from JSON input to PDF output.
//! They verify:
//! - JSON deserialization works correctly
//! - The layout engine paginates the checklist and image grid
//! - Unresolvable images become warnings, not failures
//! - PDF output is structurally valid

use laudo::layout::{DrawOp, RenderedReport};
use laudo::{Organ, PageSize, Patient, Report, Section};

// ─── Helpers ────────────────────────────────────────────────────

fn full_report() -> Report {
    let mut report = Report::with_defaults();
    report.patient = Patient {
        animal_name: "Mia".to_string(),
        species: "Feline".to_string(),
        breed: "Siamese".to_string(),
        age: "4 years".to_string(),
        owner: "A. Costa".to_string(),
        date: "2026-08-24".to_string(),
    };
    report
}

/// A tiny valid PNG as a data URI, so tests never touch the filesystem.
fn png_data_uri(w: u32, h: u32) -> String {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([40, 40, 200, 255]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), w, h, image::ColorType::Rgba8)
        .expect("encode test PNG");
    use base64::Engine;
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&buf)
    )
}

fn page_texts(rendered: &RenderedReport, page: usize) -> Vec<String> {
    rendered.document.pages[page]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn image_count_on(rendered: &RenderedReport, page: usize) -> usize {
    rendered.document.pages[page]
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::Image { .. }))
        .count()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.starts_with(b"%PDF-1.7"), "missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "missing EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "missing xref table");
    assert!(
        bytes.windows(9).any(|w| w == b"startxref"),
        "missing startxref"
    );
}

// ─── Layout ─────────────────────────────────────────────────────

#[test]
fn full_checklist_renders_all_sections() {
    let rendered = laudo::render(&full_report());
    assert!(rendered.document.page_count() >= 1);
    assert!(rendered.warnings.is_empty());

    let all_text: Vec<String> = (0..rendered.document.page_count())
        .flat_map(|p| page_texts(&rendered, p))
        .collect();
    for organ in Organ::ALL {
        let label = format!("{}:", organ.label());
        assert!(
            all_text.iter().any(|t| t == &label),
            "missing section label {label}"
        );
    }
    assert!(all_text.iter().any(|t| t == "Mia"));
}

#[test]
fn images_start_on_a_fresh_page_even_with_room() {
    let mut report = full_report();
    report.sections.truncate(1); // leave plenty of room on page 1
    report.images = vec![png_data_uri(80, 60)];

    let rendered = laudo::render(&report);
    assert!(rendered.warnings.is_empty());
    assert_eq!(rendered.document.page_count(), 2);
    assert_eq!(image_count_on(&rendered, 0), 0);
    assert_eq!(image_count_on(&rendered, 1), 1);
    assert!(page_texts(&rendered, 1).iter().any(|t| t == "Images"));
}

#[test]
fn seven_images_fill_rows_of_three() {
    let mut report = full_report();
    report.sections.truncate(1);
    report.images = (0..7).map(|_| png_data_uri(80, 60)).collect();

    let rendered = laudo::render(&report);
    assert!(rendered.warnings.is_empty());

    let image_page = rendered.document.page_count() - 1;
    assert_eq!(image_count_on(&rendered, image_page), 7);

    // Rows of three: exactly three distinct x positions, the last row short.
    let mut xs: Vec<f64> = rendered.document.pages[image_page]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Image { x, .. } => Some(*x),
            _ => None,
        })
        .collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    xs.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
    assert_eq!(xs.len(), 3, "expected three grid columns, got {xs:?}");
}

#[test]
fn drawn_images_preserve_aspect_ratio() {
    let mut report = full_report();
    report.sections.truncate(1);
    report.images = vec![png_data_uri(400, 100), png_data_uri(100, 400)];

    let rendered = laudo::render(&report);
    let image_page = rendered.document.page_count() - 1;
    let boxes: Vec<(f64, f64)> = rendered.document.pages[image_page]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Image {
                width,
                height,
                image,
                ..
            } => Some((
                width / height,
                image.width_px as f64 / image.height_px as f64,
            )),
            _ => None,
        })
        .collect();
    assert_eq!(boxes.len(), 2);
    for (drawn_aspect, native_aspect) in boxes {
        assert!((drawn_aspect - native_aspect).abs() < 1e-9);
    }
}

#[test]
fn missing_image_becomes_warning_and_render_continues() {
    let mut report = full_report();
    report.images = vec![
        "/no/such/capture-1.png".to_string(),
        png_data_uri(80, 60),
        "/no/such/capture-2.png".to_string(),
    ];

    let rendered = laudo::render(&report);
    assert_eq!(rendered.warnings.len(), 2);
    assert!(rendered.warnings[0].src.contains("capture-1"));
    assert!(rendered.warnings[1].src.contains("capture-2"));

    // The good image still made it onto the image page.
    let image_page = rendered.document.page_count() - 1;
    assert_eq!(image_count_on(&rendered, image_page), 1);
}

#[test]
fn no_images_means_no_image_page() {
    let report = full_report();
    let rendered = laudo::render(&report);
    let total_images: usize = (0..rendered.document.page_count())
        .map(|p| image_count_on(&rendered, p))
        .sum();
    assert_eq!(total_images, 0);
    for p in 0..rendered.document.page_count() {
        assert!(
            !page_texts(&rendered, p).iter().any(|t| t == "Images"),
            "image heading drawn without images"
        );
    }
}

#[test]
fn clearing_findings_reduces_page_count_monotonically() {
    let mut short = full_report();
    for section in &mut short.sections {
        section.findings = "Normal.".to_string();
    }
    let long = full_report();

    let short_pages = laudo::render(&short).document.page_count();
    let long_pages = laudo::render(&long).document.page_count();
    assert!(short_pages <= long_pages);
}

#[test]
fn small_page_forces_multiple_pages() {
    let mut report = full_report();
    report.page.size = PageSize::A5;
    let a5_pages = laudo::render(&report).document.page_count();

    report.page.size = PageSize::A4;
    let a4_pages = laudo::render(&report).document.page_count();
    assert!(a5_pages >= a4_pages);
    assert!(a5_pages >= 2, "full checklist should overflow A5");
}

// ─── JSON round trip ────────────────────────────────────────────

#[test]
fn render_json_end_to_end() {
    let json = r#"{
        "patient": {
            "animalName": "Thor",
            "species": "Canine",
            "breed": "Boxer",
            "age": "2 years",
            "owner": "R. Lima",
            "date": "2026-08-24"
        },
        "sections": [
            { "organ": "Liver", "findings": "Normal echogenicity." },
            { "organ": "Spleen", "findings": "" }
        ]
    }"#;

    let (bytes, warnings) = laudo::render_json(json).expect("render from JSON");
    assert!(warnings.is_empty());
    assert_valid_pdf(&bytes);
}

#[test]
fn malformed_json_reports_parse_error_with_hint() {
    let err = laudo::render_json("{ not json").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("failed to parse report"));
    assert!(msg.contains("hint:"));
}

#[test]
fn schema_mismatch_is_a_data_error() {
    let err = laudo::render_json(r#"{ "sections": [ { "organ": "Wings" } ] }"#).unwrap_err();
    assert!(matches!(err, laudo::Error::Parse { .. }));
}

// ─── PDF output ─────────────────────────────────────────────────

#[test]
fn rendered_pdf_is_structurally_valid() {
    let mut report = full_report();
    report.images = vec![png_data_uri(120, 90)];
    let json = serde_json::to_string(&report).expect("serialize report");

    let (bytes, warnings) = laudo::render_json(&json).expect("render");
    assert!(warnings.is_empty());
    assert_valid_pdf(&bytes);

    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/BaseFont /Helvetica"));
    assert!(text.contains("/BaseFont /Helvetica-Bold"));
    assert!(text.contains("/Subtype /Image"));
    assert!(text.contains("/Title (Veterinary Ultrasound Report - Mia)"));
}

#[test]
fn render_to_file_writes_a_pdf() {
    let dir = std::env::temp_dir().join("laudo-integration-test");
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("exam.pdf");

    let warnings = laudo::render_to_file(&full_report(), &path).expect("write PDF");
    assert!(warnings.is_empty());
    assert_valid_pdf(&std::fs::read(&path).expect("read PDF back"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn sections_render_in_input_order() {
    let mut report = full_report();
    report.sections = vec![
        Section {
            organ: Organ::Observations,
            findings: "First by choice.".to_string(),
        },
        Section {
            organ: Organ::Liver,
            findings: "Second by choice.".to_string(),
        },
    ];
    let rendered = laudo::render(&report);
    let texts = page_texts(&rendered, 0);
    let obs = texts.iter().position(|t| t == "Observations:");
    let liver = texts.iter().position(|t| t == "Liver:");
    assert!(obs.expect("observations drawn") < liver.expect("liver drawn"));
}
