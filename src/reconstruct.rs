//! Reconstructor (C10): recolours a template's marked region from a decoded scalar field and
//! overlays a date-time group label.

use image::imageops::{resize, FilterType};
use image::{Rgb, RgbImage};

use crate::font;
use crate::raster::{lrtb, Grid};
use crate::scale::Scale;
use crate::template::is_marker;

const MARKER_TOLERANCE: i32 = 25;

/// Recolours `template_image`'s marked (marker-colour) pixels from `field` through `scale`,
/// then stamps `dtg` above or below the chart rectangle, whichever margin is larger.
pub fn restore(field: &Grid<f64>, template_image: &RgbImage, scale: &Scale, dtg: &str) -> RgbImage {
    let mut out = template_image.clone();
    let (l, r, t, b) = lrtb(&out);
    let (width, height) = out.dimensions();

    let coloured = paint_field(field, scale);
    let resized = resize(&coloured, r - l, b - t, FilterType::Nearest);

    for row in t..b {
        for col in l..r {
            let px = *out.get_pixel(col, row);
            if is_marker(px.0, MARKER_TOLERANCE) {
                out.put_pixel(col, row, *resized.get_pixel(col - l, row - t));
            }
        }
    }

    draw_dtg(&mut out, dtg, l, t, b, height, width);
    out
}

/// Builds an RGB raster the shape of `field`, painting each pixel with `scale[value - 1]` for
/// `value >= 1`, leaving background (`value == 0`) pixels black — matching the reference
/// restore step, which only ever fills marker pixels with this raster, discarding the rest.
fn paint_field(field: &Grid<f64>, scale: &Scale) -> RgbImage {
    let mut image = RgbImage::from_pixel(field.cols as u32, field.rows as u32, Rgb([0, 0, 0]));
    for row in 0..field.rows {
        for col in 0..field.cols {
            let value = *field.get(row, col);
            let j = value.round() as i64;
            if j >= 1 && (j as usize) <= scale.len() {
                image.put_pixel(col as u32, row as u32, Rgb(scale.colours[(j - 1) as usize]));
            }
        }
    }
    image
}

fn draw_dtg(image: &mut RgbImage, dtg: &str, left: u32, top: u32, bottom: u32, height: u32, width: u32) {
    let margin_below = height.saturating_sub(bottom);
    let y = if top < margin_below {
        bottom + margin_below / 2
    } else {
        top / 2
    };

    // Two passes: a thick white outline first, then a thin black stroke on top, so the label
    // stays legible against either a dark or light chart background.
    draw_text(image, dtg, left, y, [255, 255, 255], 2, width);
    draw_text(image, dtg, left, y, [0, 0, 0], 0, width);
}

/// Stamps `text` at `(x, y)` (top-left of the first glyph), `width` columns wide, each glyph
/// dilated by `outline` pixels on every side to form a stroke.
fn draw_text(image: &mut RgbImage, text: &str, x: u32, y: u32, colour: [u8; 3], outline: i64, canvas_width: u32) {
    const SCALE: u32 = 2;
    let mut cursor_x = x as i64;

    for c in text.chars() {
        if let Some(rows) = font::glyph(c) {
            for (row_idx, bits) in rows.iter().enumerate() {
                for col_idx in 0..font::GLYPH_WIDTH {
                    let bit = (font::GLYPH_WIDTH - 1 - col_idx) as u8;
                    if (bits >> bit) & 1 == 0 {
                        continue;
                    }
                    let px = cursor_x + (col_idx as i64) * SCALE as i64;
                    let py = y as i64 + (row_idx as i64) * SCALE as i64;
                    for dy in -outline..=outline {
                        for dx in -outline..=outline {
                            put_checked(image, px + dx, py + dy, colour, canvas_width);
                        }
                    }
                }
            }
        }
        cursor_x += ((font::GLYPH_WIDTH as i64) + 1) * SCALE as i64;
    }
}

fn put_checked(image: &mut RgbImage, x: i64, y: i64, colour: [u8; 3], canvas_width: u32) {
    if x < 0 || y < 0 || x as u32 >= canvas_width || y as u32 >= image.height() {
        return;
    }
    image.put_pixel(x as u32, y as u32, Rgb(colour));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_template(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
        for y in 2..height - 2 {
            for x in 2..width - 2 {
                img.put_pixel(x, y, Rgb([125, 0, 0]));
            }
        }
        img
    }

    #[test]
    fn restore_paints_marked_region_from_scale() {
        let template = marker_template(30, 30);
        let scale = Scale::new(vec![[10, 20, 30], [40, 50, 60]]);
        let field = Grid::filled(26, 26, 1.0);

        let out = restore(&field, &template, &scale, "010000ZJAN2025");
        let sample = out.get_pixel(15, 15);
        assert_eq!(sample.0, [10, 20, 30]);
    }

    #[test]
    fn restore_leaves_non_marker_pixels_untouched() {
        let template = marker_template(30, 30);
        let scale = Scale::new(vec![[10, 20, 30]]);
        let field = Grid::filled(26, 26, 1.0);

        let out = restore(&field, &template, &scale, "010000ZJAN2025");
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
    }
}
