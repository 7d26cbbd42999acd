//! Scalar-field projector (C6): classifies chart pixels against a colour scale.
//!
//! The field is kept as `f64` throughout (rather than switching to an integer type once
//! classified) because it feeds directly into the padding/smoothing conditioner and the DFT,
//! both of which are float pipelines in the reference implementation; the values themselves are
//! always small non-negative integers until `smooth` blends unclassified cells.

use image::RgbImage;

use crate::raster::{lrtb, Grid};
use crate::scale::Scale;

/// The no-op edge-mean stub. The reference implementation computes the four border strips of a
/// field and then unconditionally returns 0; both call sites below are kept to match its output
/// exactly (see SPEC_FULL.md §4.6/§4.7/§9 — this must not become a real average without a
/// compatibility flag, since doing so would change every existing message's decode).
pub(crate) fn edge_mean(_field: &Grid<f64>) -> f64 {
    0.0
}

/// Classifies every pixel inside `image`'s chart interior (as bounded by [`lrtb`]) against
/// `scale`, first-match-wins: a pixel takes the smallest scale index whose RGB triple matches
/// within a tolerance of 2 on every channel, or 0 if none match.
pub fn gen(image: &RgbImage, scale: &Scale) -> Grid<f64> {
    let (l, r, t, b) = lrtb(image);
    let rows = (b - t) as usize;
    let cols = (r - l) as usize;

    let mut out = Grid::filled(rows, cols, 0f64);

    for (i, colour) in scale.colours.iter().enumerate() {
        for row in 0..rows {
            for col in 0..cols {
                let cell = out.get_mut(row, col);
                if *cell != 0.0 {
                    continue;
                }
                let px = image.get_pixel(l + col as u32, t + row as u32).0;
                let matches = (0..3).all(|c| (px[c] as i32 - colour[c] as i32).abs() < 2);
                if matches {
                    *cell = (i + 1) as f64;
                }
            }
        }
    }

    let mean = edge_mean(&out);
    if mean != 0.0 {
        for v in out.iter_mut() {
            *v -= mean;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn first_match_wins_within_tolerance() {
        // A 1-pixel-wide gap around a 3x3 interior so `lrtb` has a border to key off.
        let mut img = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        for y in 1..4 {
            for x in 1..4 {
                img.put_pixel(x, y, Rgb([11, 11, 11]));
            }
        }
        let scale = Scale::new(vec![[10, 10, 10], [12, 12, 12]]);
        let field = gen(&img, &scale);
        // Every interior cell should classify as scale index 0 (stored value 1), not index 1.
        assert!(field.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn unmatched_pixels_stay_background() {
        let mut img = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        for y in 1..4 {
            for x in 1..4 {
                img.put_pixel(x, y, Rgb([200, 200, 200]));
            }
        }
        let scale = Scale::new(vec![[10, 10, 10]]);
        let field = gen(&img, &scale);
        assert!(field.iter().all(|&v| v == 0.0));
    }
}
