//! Colour-scale extraction (C5): finds the legend's ordered RGB sequence inside a source image.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::raster::{is_near_black, is_near_white, rgb_distance};

/// An ordered colour legend: position in the sequence is the scalar magnitude axis, index 0
/// being the smallest value and the last index the largest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub colours: Vec<[u8; 3]>,
}

impl Scale {
    pub fn new(colours: Vec<[u8; 3]>) -> Self {
        Scale { colours }
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    /// Reverses the sequence in place, e.g. to undo or force an orientation.
    pub fn reverse(&mut self) {
        self.colours.reverse();
    }
}

/// Walks a 1-D slice of RGB pixels and returns the longest run of "kept" colours: pixels that
/// are not near-white, not near-black, and far enough (Euclidean distance >= 5) from the
/// previously kept colour. A run of more than 10 consecutive black/white pixels starts a fresh
/// run rather than extending the current one — that's a background gap breaking the legend.
pub fn build_scale(slice: &[[u8; 3]]) -> Vec<[u8; 3]> {
    let mut out: Vec<[u8; 3]> = Vec::new();
    let mut out_temp: Vec<[u8; 3]> = Vec::new();
    let mut r_last: [i32; 3] = [-1, -1, -1];
    let mut bw_count = 0usize;

    for &r in slice {
        let white = is_near_white(r);
        let black = is_near_black(r);
        let r_last_u8 = [
            r_last[0].clamp(0, 255) as u8,
            r_last[1].clamp(0, 255) as u8,
            r_last[2].clamp(0, 255) as u8,
        ];
        let far_enough = r_last[0] < 0 || rgb_distance(r, r_last_u8) >= 5.0;

        if !white && !black && far_enough {
            if bw_count > 10 {
                out_temp = vec![r];
            } else {
                out_temp.push(r);
            }
            if out_temp.len() > out.len() {
                out = out_temp.clone();
            }
            r_last = [r[0] as i32, r[1] as i32, r[2] as i32];
            bw_count = 0;
        } else if white || black {
            bw_count += 1;
        }
    }

    out
}

/// Scans parallel slices through `rect` (a half-open `(y0, y1, x0, x1)` rectangle inside
/// `image`) along whichever axis is longer, keeping the longest sequence [`build_scale`]
/// returns. Stops early once a sequence of length >= 15 is found. Offsets are tried in the
/// reference implementation's fixed, non-monotonic order so that a legend whose best slice sits
/// away from either edge is still found quickly.
const SLICE_OFFSETS: [u32; 16] = [20, 15, 25, 10, 30, 5, 35, 40, 12, 18, 22, 8, 27, 32, 2, 45];

pub fn extract_scale(image: &RgbImage, rect: (u32, u32, u32, u32)) -> Vec<[u8; 3]> {
    let (y0, y1, x0, x1) = rect;
    let height = y1 - y0;
    let width = x1 - x0;
    let is_vertical = height > width;

    let mut best: Vec<[u8; 3]> = Vec::new();

    for &d in &SLICE_OFFSETS {
        let slice: Vec<[u8; 3]> = if is_vertical {
            if d >= width {
                continue;
            }
            (y0..y1)
                .map(|y| image.get_pixel(x0 + d, y).0)
                .collect()
        } else {
            if d >= height {
                continue;
            }
            (x0..x1)
                .map(|x| image.get_pixel(x, y0 + d).0)
                .collect()
        };

        let extracted = build_scale(&slice);
        if extracted.len() > best.len() {
            best = extracted;
        }
        if best.len() >= 15 {
            break;
        }
    }

    best
}

/// Normalises legend orientation to run cool -> warm: if the first colour is redder than it is
/// blue and the last colour is bluer than it is red, the heuristic assumes the sequence runs
/// warm -> cool and reverses it.
pub fn normalize_orientation(scale: &mut Scale) {
    if let (Some(&first), Some(&last)) = (scale.colours.first(), scale.colours.last()) {
        if first[0] > first[2] && last[2] > last[0] {
            scale.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_scale_extracts_run_between_black_and_white() {
        let mut slice = Vec::new();
        slice.extend(std::iter::repeat([0u8, 0, 0]).take(10));
        for i in 0..30u16 {
            let v = (i * 8) as u8;
            slice.push([v, 255 - v, (v / 2)]);
        }
        slice.extend(std::iter::repeat([255u8, 255, 255]).take(10));

        let scale = build_scale(&slice);
        assert_eq!(scale.len(), 30);
        assert_eq!(scale, &slice[10..40]);
    }

    #[test]
    fn orientation_reversed_when_warm_to_cool() {
        let mut scale = Scale::new(vec![[200, 0, 0], [100, 0, 100], [0, 0, 200]]);
        normalize_orientation(&mut scale);
        assert_eq!(scale.colours.first(), Some(&[0, 0, 200]));
    }

    #[test]
    fn orientation_kept_when_already_cool_to_warm() {
        let mut scale = Scale::new(vec![[0, 0, 200], [100, 0, 100], [200, 0, 0]]);
        let before = scale.clone();
        normalize_orientation(&mut scale);
        assert_eq!(scale, before);
    }
}
