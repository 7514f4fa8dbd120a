//! # PDF Serializer
//!
//! Writes a laid-out [`Document`] as a PDF 1.7 file, from scratch.
//!
//! We write the raw bytes ourselves because the subset of the PDF spec a
//! report needs — standard Type1 fonts, text runs, stroked rules, and image
//! XObjects — is small, and owning the writer keeps the crate self-contained.
//!
//! ## Structure
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, pages, fonts, streams, images)
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points at the catalog
//! %%EOF
//! ```
//!
//! Only the 4 standard fonts in the registry are referenced, so no font
//! embedding is needed. JPEG images embed as DCTDecode streams; decoded PNGs
//! as FlateDecode RGB with an optional SMask for transparency. Text uses
//! WinAnsiEncoding, which covers the Latin-1 accents that show up in patient
//! fields.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite; // write! on String
use std::io::Write as IoWrite; // write! on Vec<u8>
use std::path::Path;

use crate::error::Error;
use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, ImageRef, JpegColorSpace};
use crate::layout::{Document, DrawOp, Page};
use crate::model::Metadata;
use miniz_oxide::deflate::compress_to_vec_zlib;

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Fonts used in the document, in /F0, /F1, ... order, with object IDs.
    font_objects: Vec<(StandardFont, usize)>,
    /// XObject IDs for images, indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// Maps (page_index, op_index) to an index into `image_objects`.
    image_index_map: HashMap<(usize, usize), usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize a document to PDF bytes.
    pub fn write(&self, document: &Document, metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };

        // Object 0 is the free-list placeholder, 1 the Catalog, 2 the page
        // tree root; fonts, images, content streams and pages follow.
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });

        self.register_fonts(&mut builder, document);
        self.register_images(&mut builder, document);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for (page_idx, page) in document.pages.iter().enumerate() {
            let content = self.build_content_stream(page, page_idx, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let font_resources = self.build_font_resource_dict(&builder.font_objects);
            let xobject_resources = self.build_xobject_resource_dict(page_idx, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!(
                    "/Font << {} >> /XObject << {} >>",
                    font_resources, xobject_resources
                )
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = self.write_info_dict(&mut builder, metadata);

        self.serialize(&builder, info_obj_id)
    }

    /// Serialize and persist a document.
    ///
    /// Writes to a sibling temporary file and renames it into place, so a
    /// failed write never leaves a partial file at `path`.
    pub fn save(&self, document: &Document, metadata: &Metadata, path: &Path) -> Result<(), Error> {
        let bytes = self.write(document, metadata);

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);

        if let Err(e) = std::fs::write(&tmp, &bytes) {
            return Err(Error::WriteFailure(e));
        }
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(Error::WriteFailure(e));
        }
        Ok(())
    }

    /// Build the content stream operators for one page.
    fn build_content_stream(&self, page: &Page, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut stream = String::new();

        for (op_idx, op) in page.ops.iter().enumerate() {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    text,
                    font,
                    size,
                } => {
                    let font_idx = self.font_index(*font, &builder.font_objects);
                    let _ = write!(
                        stream,
                        "BT\n0 0 0 rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                        font_idx,
                        size,
                        x,
                        y,
                        Self::encode_text(text)
                    );
                }

                DrawOp::Rule { x1, x2, y, width } => {
                    let _ = write!(
                        stream,
                        "q\n0 0 0 RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        width, x1, y, x2, y
                    );
                }

                DrawOp::Image {
                    x,
                    y,
                    width,
                    height,
                    ..
                } => {
                    if let Some(&img_idx) = builder.image_index_map.get(&(page_idx, op_idx)) {
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            width, height, x, y, img_idx
                        );
                    }
                }
            }
        }

        stream
    }

    /// Register one Type1 font object per standard font used in the document.
    fn register_fonts(&self, builder: &mut PdfBuilder, document: &Document) {
        let mut fonts: Vec<StandardFont> = Vec::new();
        for page in &document.pages {
            for op in &page.ops {
                if let DrawOp::Text { font, .. } = op {
                    if !fonts.contains(font) {
                        fonts.push(*font);
                    }
                }
            }
        }
        if fonts.is_empty() {
            fonts.push(StandardFont::Helvetica);
        }
        fonts.sort_by_key(|f| f.pdf_name());

        for font in fonts {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: font_dict.into_bytes(),
            });
            builder.font_objects.push((font, obj_id));
        }
    }

    /// Walk all pages and create one XObject per image draw.
    fn register_images(&self, builder: &mut PdfBuilder, document: &Document) {
        for (page_idx, page) in document.pages.iter().enumerate() {
            for (op_idx, op) in page.ops.iter().enumerate() {
                if let DrawOp::Image { image, .. } = op {
                    let img_idx = builder.image_objects.len();
                    let xobj_id = Self::write_image_xobject(builder, image);
                    builder.image_objects.push(xobj_id);
                    builder.image_index_map.insert((page_idx, op_idx), img_idx);
                }
            }
        }
    }

    /// Write an image as one or two XObjects; returns the main object ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &ImageRef) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRgb => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space_str,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                // SMask first, if the PNG had transparency.
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed = compress_to_vec_zlib(alpha_data, 6);
                    let smask_obj_id = builder.objects.len();
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed.len()
                    );
                    smask_data.extend_from_slice(&compressed);
                    smask_data.extend_from_slice(b"\nendstream");
                    builder.objects.push(PdfObject { data: smask_data });
                    smask_obj_id
                });

                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let obj_id = builder.objects.len();
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed_rgb.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed_rgb);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }
        }
    }

    fn write_info_dict(&self, builder: &mut PdfBuilder, metadata: &Metadata) -> Option<usize> {
        if metadata.title.is_none() && metadata.author.is_none() && metadata.subject.is_none() {
            return None;
        }
        let id = builder.objects.len();
        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::escape_pdf_string(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::escape_pdf_string(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::escape_pdf_string(subject));
        }
        let _ = write!(info, "/Producer (laudo) >>");
        builder.objects.push(PdfObject {
            data: info.into_bytes(),
        });
        Some(id)
    }

    fn build_font_resource_dict(&self, font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn build_xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = builder
            .image_index_map
            .iter()
            .filter(|((pidx, _), _)| *pidx == page_idx)
            .map(|(_, &img_idx)| (img_idx, builder.image_objects[img_idx]))
            .collect();
        if entries.is_empty() {
            return String::new();
        }
        entries.sort_by_key(|(idx, _)| *idx);
        entries.dedup();
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn font_index(&self, font: StandardFont, font_objects: &[(StandardFont, usize)]) -> usize {
        font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    /// Encode a text run as a WinAnsi PDF string literal, with PDF escapes
    /// and octal escapes for bytes outside the ASCII printable range.
    fn encode_text(text: &str) -> String {
        let mut out = String::new();
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Escape special characters in a PDF string (metadata values).
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252: 0x20..=0x7E and 0xA0..=0xFF
    /// map directly, and 0x80..=0x9F holds smart quotes, dashes, and friends.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for i in 1..builder.objects.len() {
            let _ = write!(output, "{:010} 00000 n \n", offsets[i]);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R",
            builder.objects.len()
        );
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}
