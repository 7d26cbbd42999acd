//! Pad/smooth conditioner (C7): symmetric padding then zero-preserving neighbour diffusion.

use crate::field::edge_mean;
use crate::raster::Grid;

/// Symmetric (reflect-across-edge) padding of `field` by `pad` cells on every side, followed by
/// ten rounds of [`smooth`]. This is what actually runs before the DFT; `max_coeff` (SPEC_FULL.md
/// §4.4) is measured on this conditioned field, not the raw projector output.
pub fn condition(field: &Grid<f64>, pad: usize) -> Grid<f64> {
    let padded = pad_symmetric(field, pad);
    smooth(&padded, 10)
}

fn pad_symmetric(field: &Grid<f64>, pad: usize) -> Grid<f64> {
    let rows = field.rows;
    let cols = field.cols;
    let out_rows = rows + 2 * pad;
    let out_cols = cols + 2 * pad;

    Grid::from_fn(out_rows, out_cols, |r, c| {
        let src_r = reflect_index(r as i64 - pad as i64, rows);
        let src_c = reflect_index(c as i64 - pad as i64, cols);
        *field.get(src_r, src_c)
    })
}

/// Maps an index that may be negative or `>= len` back into `[0, len)` by reflection across
/// each edge (mirror without repeating the edge value), matching `numpy.pad(..., mode =
/// "symmetric")`.
fn reflect_index(i: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as i64;
    let period = 2 * len;
    let mut m = i % period;
    if m < 0 {
        m += period;
    }
    if m < len {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

/// Seven shift vectors applied to the zero-re-padded interior each smoothing round, transcribed
/// literally (including the two repeated entries) from the reference implementation — see
/// SPEC_FULL.md §4.7/§9. Each entry is `(shift_amount, axis)`, `axis = 0` rows / `axis = 1`
/// columns, matching `numpy.roll`'s argument order.
const SHIFT_VECTORS: [(i64, usize); 7] = [
    (1, 0),
    (1, 1),
    (-1, 0),
    (-1, 0),
    (-1, 1),
    (-1, 1),
    (1, 0),
];

/// Zero-preserving diffusion: repeatedly fills cells equal to 0 with the average of their
/// non-zero neighbours (per [`SHIFT_VECTORS`]), leaving already-classified cells untouched.
pub fn smooth(field: &Grid<f64>, repeat: usize) -> Grid<f64> {
    let min_v = field.iter().cloned().fold(f64::INFINITY, f64::min);
    let min_v = if min_v.is_finite() { min_v } else { 0.0 };

    let mut out = field.clone();
    for v in out.iter_mut() {
        *v -= min_v;
    }

    for _ in 0..repeat {
        let rows = out.rows;
        let cols = out.cols;

        // Re-pad the interior with a forced zero border, one cell wide.
        let base = Grid::from_fn(rows, cols, |r, c| {
            if rows >= 2 && cols >= 2 && r >= 1 && r <= rows - 2 && c >= 1 && c <= cols - 2 {
                *out.get(r, c)
            } else {
                0.0
            }
        });

        let mut add = Grid::filled(rows, cols, 0f64);
        let mut cnt = Grid::filled(rows, cols, 0f64);

        for &(shift, axis) in &SHIFT_VECTORS {
            let shifted = roll2d(&base, shift, axis);
            for r in 0..rows {
                for c in 0..cols {
                    let v = *shifted.get(r, c);
                    *add.get_mut(r, c) += v;
                    if v != 0.0 {
                        *cnt.get_mut(r, c) += 1.0;
                    }
                }
            }
        }

        for r in 0..rows {
            for c in 0..cols {
                if *out.get(r, c) == 0.0 {
                    let cnt_v = *cnt.get(r, c);
                    if cnt_v != 0.0 {
                        *out.get_mut(r, c) = *add.get(r, c) / cnt_v;
                    }
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

/// Circular shift along one axis, matching `numpy.roll(array, shift, axis)`:
/// `out[i] = array[i - shift]` (mod the axis length).
fn roll2d(grid: &Grid<f64>, shift: i64, axis: usize) -> Grid<f64> {
    let rows = grid.rows;
    let cols = grid.cols;
    Grid::from_fn(rows, cols, |r, c| {
        if axis == 0 {
            let src = modulo(r as i64 - shift, rows as i64);
            *grid.get(src, c)
        } else {
            let src = modulo(c as i64 - shift, cols as i64);
            *grid.get(r, src)
        }
    })
}

fn modulo(n: i64, m: i64) -> usize {
    (((n % m) + m) % m) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_is_fixed_point_with_no_zero_cells() {
        let field = Grid::from_fn(6, 6, |r, c| (r * 6 + c + 1) as f64);
        for &k in &[0usize, 1, 3] {
            let smoothed = smooth(&field, k);
            assert_eq!(smoothed, field, "smooth should be a no-op at k={k}");
        }
    }

    #[test]
    fn smooth_fills_zero_cells_from_neighbours() {
        let mut field = Grid::filled(5, 5, 3.0);
        *field.get_mut(2, 2) = 0.0;
        let smoothed = smooth(&field, 1);
        assert!(*smoothed.get(2, 2) > 0.0);
    }

    #[test]
    fn reflect_index_mirrors_without_repeating_edge() {
        assert_eq!(reflect_index(-1, 5), 0);
        assert_eq!(reflect_index(-2, 5), 1);
        assert_eq!(reflect_index(5, 5), 4);
        assert_eq!(reflect_index(6, 5), 3);
    }

    #[test]
    fn condition_pads_by_twice_the_margin() {
        let field = Grid::filled(4, 4, 2.0);
        let conditioned = condition(&field, 3);
        assert_eq!(conditioned.rows, 10);
        assert_eq!(conditioned.cols, 10);
    }
}
