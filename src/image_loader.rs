//! # Image Resolution
//!
//! Turns image sources (file paths or data URIs) into [`ImageRef`]s: native
//! pixel dimensions plus pixel data ready for PDF embedding. Resolution
//! happens once, before layout begins; the layout engine only ever reads the
//! cached dimensions.
//!
//! JPEG bytes pass through untouched — the PDF spec supports DCTDecode
//! natively. PNGs are decoded to RGB with a separate alpha channel for SMask
//! transparency.

use std::io::Cursor;

use crate::error::Error;

/// A resolved image: source identity, cached native dimensions, and pixel
/// data for embedding. Owned by the render pass; never mutated by layout.
#[derive(Debug, Clone)]
pub struct ImageRef {
    pub src: String,
    pub width_px: u32,
    pub height_px: u32,
    pub pixel_data: ImagePixelData,
}

/// Pixel data in a form the PDF backend can embed directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes — embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels plus optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB).
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy)]
pub enum JpegColorSpace {
    DeviceRgb,
    DeviceGray,
}

impl ImageRef {
    /// Resolve a source string into an embeddable image.
    ///
    /// Supported sources:
    /// - `data:image/...;base64,...` data URI
    /// - a file path (read from disk)
    ///
    /// Zero-sized images are rejected with
    /// [`Error::InvalidImageDimensions`]; unreadable or unsupported data with
    /// [`Error::ImageLoadFailure`].
    pub fn resolve(src: &str) -> Result<Self, Error> {
        let bytes = read_source_bytes(src)?;
        let (width_px, height_px, pixel_data) = decode_bytes(src, &bytes)?;
        if width_px == 0 || height_px == 0 {
            return Err(Error::InvalidImageDimensions {
                width: width_px,
                height: height_px,
            });
        }
        Ok(Self {
            src: src.to_string(),
            width_px,
            height_px,
            pixel_data,
        })
    }
}

fn load_failure(src: &str, reason: impl Into<String>) -> Error {
    Error::ImageLoadFailure {
        src: src.to_string(),
        reason: reason.into(),
    }
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, Error> {
    if src.starts_with("data:image/") {
        let comma = src
            .find(',')
            .ok_or_else(|| load_failure(src, "invalid data URI: missing comma"))?;
        use base64::Engine;
        return base64::engine::general_purpose::STANDARD
            .decode(&src[comma + 1..])
            .map_err(|e| load_failure(src, format!("base64 decode error: {e}")));
    }

    std::fs::read(src).map_err(|e| load_failure(src, e.to_string()))
}

/// Detect the image format from magic bytes and decode accordingly.
fn decode_bytes(src: &str, data: &[u8]) -> Result<(u32, u32, ImagePixelData), Error> {
    if data.len() < 4 {
        return Err(load_failure(src, "image data too short"));
    }
    if is_jpeg(data) {
        decode_jpeg(src, data)
    } else if is_png(data) {
        decode_png(src, data)
    } else {
        Err(load_failure(
            src,
            "unsupported image format (expected JPEG or PNG)",
        ))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions without decoding pixels; the raw bytes go into the
/// PDF as a DCTDecode stream.
fn decode_jpeg(src: &str, data: &[u8]) -> Result<(u32, u32, ImagePixelData), Error> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| load_failure(src, format!("format detection error: {e}")))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| load_failure(src, format!("failed to read JPEG dimensions: {e}")))?;

    let pixel_data = ImagePixelData::Jpeg {
        data: data.to_vec(),
        color_space: detect_jpeg_color_space(data),
    };
    Ok((width, height, pixel_data))
}

/// Scan JPEG markers for the SOF segment and read the component count to
/// decide between DeviceGray and DeviceRGB.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // skip SOI (FF D8)
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            // SOF: length(2) precision(1) height(2) width(2) components(1)
            if i + 9 < data.len() {
                return if data[i + 9] == 1 {
                    JpegColorSpace::DeviceGray
                } else {
                    JpegColorSpace::DeviceRgb
                };
            }
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRgb
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(src: &str, data: &[u8]) -> Result<(u32, u32, ImagePixelData), Error> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| load_failure(src, format!("format detection error: {e}")))?;
    let img = reader
        .decode()
        .map_err(|e| load_failure(src, format!("failed to decode PNG: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());

    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    let pixel_data = ImagePixelData::Decoded {
        rgb,
        alpha: if has_transparency { Some(alpha) } else { None },
    };
    Ok((width, height, pixel_data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_data_uri(w: u32, h: u32, rgba: [u8; 4]) -> String {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), w, h, image::ColorType::Rgba8)
            .unwrap();
        use base64::Engine;
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&buf)
        )
    }

    #[test]
    fn magic_byte_detection() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0xFF, 0xD8, 0xFF, 0xE0]));
    }

    #[test]
    fn resolve_png_data_uri() {
        let img = ImageRef::resolve(&png_data_uri(2, 3, [255, 0, 0, 255])).unwrap();
        assert_eq!((img.width_px, img.height_px), (2, 3));
        match img.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb.len(), 2 * 3 * 3);
                assert!(alpha.is_none(), "fully opaque should carry no alpha");
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn png_with_transparency_keeps_alpha() {
        let img = ImageRef::resolve(&png_data_uri(1, 1, [0, 255, 0, 128])).unwrap();
        match img.pixel_data {
            ImagePixelData::Decoded { alpha, .. } => {
                assert_eq!(alpha.unwrap(), vec![128]);
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn jpeg_passes_through() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();

        let (w, h, pixels) = decode_bytes("test.jpg", &buf).unwrap();
        assert_eq!((w, h), (2, 2));
        match pixels {
            ImagePixelData::Jpeg { data, color_space } => {
                assert!(data.starts_with(&[0xFF, 0xD8]));
                assert!(matches!(color_space, JpegColorSpace::DeviceRgb));
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn missing_file_is_load_failure() {
        let err = ImageRef::resolve("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, Error::ImageLoadFailure { .. }));
    }

    #[test]
    fn truncated_data_uri_is_load_failure() {
        let err = ImageRef::resolve("data:image/png;base64").unwrap_err();
        assert!(matches!(err, Error::ImageLoadFailure { .. }));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = decode_bytes("junk", &[0x00, 0x01, 0x02, 0x03, 0x04]).unwrap_err();
        assert!(matches!(err, Error::ImageLoadFailure { .. }));
    }
}
