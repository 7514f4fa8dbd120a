//! Image grid geometry: aspect-fit scaling and cell placement.
//!
//! Ultrasound captures go into a fixed 3-column grid of fixed-size cells.
//! Each image is scaled to fit its cell while preserving aspect ratio, then
//! centered inside it.

use crate::error::Error;

const CM: f64 = 72.0 / 2.54;

/// Number of grid columns.
pub const COLUMNS: usize = 3;
/// Cell box width (2.59 cm in points).
pub const CELL_WIDTH: f64 = 2.59 * CM;
/// Cell box height (4.65 cm in points).
pub const CELL_HEIGHT: f64 = 4.65 * CM;
/// Horizontal gap between cells.
pub const COLUMN_GAP: f64 = 20.0;
/// Vertical gutter between rows.
pub const ROW_GAP: f64 = 10.0;

/// An aspect-fit result: drawn dimensions plus centering offsets within the
/// bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBox {
    pub draw_w: f64,
    pub draw_h: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Scale `native_w` x `native_h` to fit inside `box_w` x `box_h`, preserving
/// aspect ratio and centering the result.
///
/// A zero native dimension is an error; callers recover by skipping the
/// image.
pub fn fit(native_w: u32, native_h: u32, box_w: f64, box_h: f64) -> Result<FitBox, Error> {
    if native_w == 0 || native_h == 0 {
        return Err(Error::InvalidImageDimensions {
            width: native_w,
            height: native_h,
        });
    }

    let aspect = native_w as f64 / native_h as f64;
    let (draw_w, draw_h) = if aspect > box_w / box_h {
        // Width-bound: wider than the box.
        (box_w, box_w / aspect)
    } else {
        // Height-bound: taller than (or matching) the box.
        (box_h * aspect, box_h)
    };

    Ok(FitBox {
        draw_w,
        draw_h,
        offset_x: (box_w - draw_w) / 2.0,
        offset_y: (box_h - draw_h) / 2.0,
    })
}

/// Left edge of the cell in column `col`, given the grid origin.
pub fn cell_x(origin_x: f64, col: usize) -> f64 {
    origin_x + col as f64 * (CELL_WIDTH + COLUMN_GAP)
}
