//! Shared pixel-grid plumbing: a small generic 2-D buffer and the border detector (`lrtb`) used
//! by both the scalar-field projector and the reconstructor.

use image::{Rgb, RgbImage};

/// A row-major 2-D buffer. Used for the scalar field and the DFT block (both `Grid<f64>`), and
/// the border mask (`Grid<bool>`).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub rows: usize,
    pub cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Grid {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }
}

impl<T> Grid<T> {
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Grid { rows, cols, data }
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> &T {
        &self.data[r * self.cols + c]
    }

    #[inline]
    pub fn get_mut(&mut self, r: usize, c: usize) -> &mut T {
        &mut self.data[r * self.cols + c]
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, v: T) {
        self.data[r * self.cols + c] = v;
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

/// Euclidean distance between two RGB triples, treated as a vector in `R^3`.
pub fn rgb_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let mut acc = 0f64;
    for c in 0..3 {
        let d = a[c] as f64 - b[c] as f64;
        acc += d * d;
    }
    acc.sqrt()
}

pub fn is_near_white(p: [u8; 3]) -> bool {
    p.iter().all(|&c| c > 250)
}

pub fn is_near_black(p: [u8; 3]) -> bool {
    p.iter().all(|&c| c < 5)
}

/// Border detector: locates the rectangle of "non-border" pixels inside `image`, where a pixel
/// is in-mask iff *any* channel lies strictly between 10 and 245. Three refinement passes
/// alternate axes, each restricting to the previous pass's rectangle, converging on the longest
/// contiguous non-border run on each axis.
///
/// Returns `(l, r, t, b)` as half-open column/row bounds: the interior is `image[t..b, l..r]`.
pub fn lrtb(image: &RgbImage) -> (u32, u32, u32, u32) {
    let (w, h) = image.dimensions();
    let mask = Grid::from_fn(h as usize, w as usize, |row, col| {
        let Rgb([r, g, b]) = *image.get_pixel(col as u32, row as u32);
        [r, g, b]
            .iter()
            .any(|&c| c > 10 && c < 245)
    });

    let (mut l, mut r, mut t, mut b) = (0usize, (w as usize).saturating_sub(1), 0usize, (h as usize).saturating_sub(1));

    for _ in 0..3 {
        let (nl, nr) = bound_cols(&mask, t, b, l, r);
        l = nl;
        r = nr;
        let (nt, nb) = bound_rows(&mask, t, b, l, r);
        t = nt;
        b = nb;
    }

    (l as u32, r as u32, t as u32, b as u32)
}

fn bound_cols(mask: &Grid<bool>, row_lo: usize, row_hi: usize, col_lo: usize, col_hi: usize) -> (usize, usize) {
    let len = col_hi - col_lo + 1;
    bound_core(len, col_lo, |local_col| {
        (row_lo..=row_hi)
            .filter(|&row| *mask.get(row, col_lo + local_col))
            .count()
    })
}

fn bound_rows(mask: &Grid<bool>, row_lo: usize, row_hi: usize, col_lo: usize, col_hi: usize) -> (usize, usize) {
    let len = row_hi - row_lo + 1;
    bound_core(len, row_lo, |local_row| {
        (col_lo..=col_hi)
            .filter(|&col| *mask.get(row_lo + local_row, col))
            .count()
    })
}

/// Finds the longest contiguous run of positions (in `0..len`) whose `sum_at` is non-zero,
/// with runs separated by any zero-sum position, and returns it as `(begin, end)` shifted by
/// `offset`. Ported verbatim (including its "offset" semantics as used by the caller for
/// iterative refinement) from the reference `lrtb`'s inner `bound` helper.
fn bound_core(len: usize, offset: usize, sum_at: impl Fn(usize) -> usize) -> (usize, usize) {
    let mut begin = len;
    let mut end = 0usize;
    let mut found = false;
    let mut temp = 0usize;
    let mut last = 0usize;

    for pos in 0..len {
        last = pos;
        let s = sum_at(pos);
        if s > 0 && !found {
            found = true;
            temp = pos;
        } else if s == 0 && found {
            found = false;
            if pos as i64 - temp as i64 > end as i64 - begin as i64 {
                end = pos;
                begin = temp;
            }
        }
    }
    if found && last as i64 - temp as i64 > end as i64 - begin as i64 {
        end = last;
        begin = temp;
    }

    (begin + offset, end + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bordered_image(border: u8, interior: [u8; 3], w: u32, h: u32, margin: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(w, h, Rgb([border, border, border]));
        for y in margin..h - margin {
            for x in margin..w - margin {
                img.put_pixel(x, y, Rgb(interior));
            }
        }
        img
    }

    #[test]
    fn finds_exact_interior_black_border() {
        let img = bordered_image(0, [120, 80, 200], 60, 40, 5);
        let (l, r, t, b) = lrtb(&img);
        assert_eq!((l, r, t, b), (5, 55, 5, 35));
    }

    #[test]
    fn finds_exact_interior_white_border() {
        let img = bordered_image(255, [10, 180, 30], 50, 50, 12);
        let (l, r, t, b) = lrtb(&img);
        assert_eq!((l, r, t, b), (12, 38, 12, 38));
    }

    #[test]
    fn rgb_distance_zero_for_identical() {
        assert_eq!(rgb_distance([1, 2, 3], [1, 2, 3]), 0.0);
    }
}
