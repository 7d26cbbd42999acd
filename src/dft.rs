//! 2-D DFT codec (C8): forward transform + magnitude normalisation, and the decoder's inverse
//! transform + rescale/strip-pad/round sequence.
//!
//! Both directions are performed as a row pass followed by a column pass, exploiting the
//! separability of the 2-D DFT; each 1-D pass is a general-purpose FFT (via `rustfft`) so padded,
//! non-power-of-two dimensions need no extra resampling.

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use crate::raster::Grid;

/// Forward 2-D DFT of a real field, returned in packed form: row `r`'s columns `2j`/`2j+1` hold
/// the real/imaginary parts of frequency bin `j` (`j` in `0..cols/2`), matching the "even columns
/// real, odd columns imaginary" convention the zig-zag addresses assume.
///
/// Only the low `cols / 2` bins (integer division) are kept; the rest are redundant with them
/// under the real-input Hermitian symmetry and [`decode`] reconstructs them from that relation.
/// `cols` need not be even: an odd `cols` just means the one bin that would otherwise be its own
/// mirror (the Nyquist bin, when `cols` is even) has no clean counterpart either way, so the same
/// "keep the low half" rule applies regardless of parity and the last packed column is simply
/// left at zero when `cols` is odd.
pub fn forward(field: &Grid<f64>) -> Grid<f64> {
    let rows = field.rows;
    let cols = field.cols;

    let mut complex = transform(field.as_slice(), rows, cols, Direction::Forward);

    let half = cols / 2;
    let mut out = Grid::filled(rows, cols, 0f64);
    for r in 0..rows {
        for j in 0..half {
            let v = complex[r * cols + j];
            *out.get_mut(r, 2 * j) = v.re;
            *out.get_mut(r, 2 * j + 1) = v.im;
        }
    }
    complex.clear();
    out
}

/// Rescales `coeffs` in place so that the largest-magnitude entry becomes exactly `target`,
/// returning the original maximum magnitude (0 if `coeffs` is all zero, in which case no scaling
/// is applied).
pub fn normalize_to_max(coeffs: &mut Grid<f64>, target: f64) -> f64 {
    let max_abs = coeffs.iter().cloned().fold(0f64, |acc, v| acc.max(v.abs()));
    if max_abs > 0.0 {
        let factor = target / max_abs;
        for v in coeffs.iter_mut() {
            *v *= factor;
        }
    }
    max_abs
}

/// Inverts the packed forward transform, then applies the decoder's reconstruction sequence:
/// clip negatives to zero, rescale so the maximum equals `max_coeff`, strip the `pad`-wide
/// symmetric border added before conditioning, round to the nearest integer, and add 1 to
/// restore the `stored == scale_index + 1` convention (SPEC_FULL.md §4.6/§4.8).
pub fn decode(packed: &Grid<f64>, max_coeff: f64, pad: usize) -> Grid<f64> {
    let rows = packed.rows;
    let cols = packed.cols;
    let half = cols / 2;

    let mut complex = vec![Complex64::new(0.0, 0.0); rows * cols];
    for r in 0..rows {
        for j in 0..half {
            let re = *packed.get(r, 2 * j);
            let im = *packed.get(r, 2 * j + 1);
            complex[r * cols + j] = Complex64::new(re, im);
        }
    }
    mirror_conjugate_bins(&mut complex, rows, cols, half);

    let restored = inverse_transform(complex, rows, cols);

    let mut clipped = Grid::from_fn(rows, cols, |r, c| restored[r * cols + c].re.max(0.0));

    let current_max = clipped.iter().cloned().fold(0f64, f64::max);
    if current_max > 0.0 {
        let factor = max_coeff / current_max;
        for v in clipped.iter_mut() {
            *v *= factor;
        }
    }

    let stripped = strip_pad(&clipped, pad);

    Grid::from_fn(stripped.rows, stripped.cols, |r, c| {
        stripped.get(r, c).round() + 1.0
    })
}

/// Fills bins `half..cols` of `complex` from the bins already present in `0..half`, using the
/// real-input Hermitian relation `X[r, c] == conj(X[(rows - r) % rows, cols - c])`. Without this,
/// an inverse transform only ever sees half the energy a real forward transform produced and a
/// lone transmitted frequency would reconstruct at roughly half its original amplitude.
///
/// Bin `half` itself (present only when `cols` is even, as the Nyquist bin) mirrors to itself at
/// the opposite row rather than to a different column, so it can't be recovered from the bins
/// [`forward`] actually keeps; it and its immediate neighbour when `cols` is odd are left at
/// zero, matching [`forward`]'s own "low half only" packing.
fn mirror_conjugate_bins(complex: &mut [Complex64], rows: usize, cols: usize, half: usize) {
    for r in 0..rows {
        for c in (half + 1)..cols {
            let mirror_row = (rows - r) % rows;
            let mirror_col = cols - c;
            let src = complex[mirror_row * cols + mirror_col];
            complex[r * cols + c] = src.conj();
        }
    }
}

fn strip_pad(grid: &Grid<f64>, pad: usize) -> Grid<f64> {
    let rows = grid.rows.saturating_sub(2 * pad);
    let cols = grid.cols.saturating_sub(2 * pad);
    Grid::from_fn(rows, cols, |r, c| *grid.get(r + pad, c + pad))
}

enum Direction {
    Forward,
}

fn transform(field: &[f64], rows: usize, cols: usize, _dir: Direction) -> Vec<Complex64> {
    let mut planner = FftPlanner::new();
    let row_fft = planner.plan_fft_forward(cols);
    let col_fft = planner.plan_fft_forward(rows);

    let mut complex: Vec<Complex64> = field.iter().map(|&v| Complex64::new(v, 0.0)).collect();

    for r in 0..rows {
        let start = r * cols;
        row_fft.process(&mut complex[start..start + cols]);
    }

    let mut column = vec![Complex64::new(0.0, 0.0); rows];
    for c in 0..cols {
        for r in 0..rows {
            column[r] = complex[r * cols + c];
        }
        col_fft.process(&mut column);
        for r in 0..rows {
            complex[r * cols + c] = column[r];
        }
    }

    complex
}

fn inverse_transform(mut complex: Vec<Complex64>, rows: usize, cols: usize) -> Vec<Complex64> {
    let mut planner = FftPlanner::new();
    let row_ifft = planner.plan_fft_inverse(cols);
    let col_ifft = planner.plan_fft_inverse(rows);

    let mut column = vec![Complex64::new(0.0, 0.0); rows];
    for c in 0..cols {
        for r in 0..rows {
            column[r] = complex[r * cols + c];
        }
        col_ifft.process(&mut column);
        for r in 0..rows {
            complex[r * cols + c] = column[r];
        }
    }

    for r in 0..rows {
        let start = r * cols;
        row_ifft.process(&mut complex[start..start + cols]);
    }

    let scale = 1.0 / (rows * cols) as f64;
    for v in complex.iter_mut() {
        *v *= scale;
    }
    complex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_only_field_transforms_to_a_single_nonzero_bin() {
        let field = Grid::filled(4, 4, 7.0);
        let spectrum = forward(&field);
        // DC term (row 0, col 0/1) carries the full energy; everything else is ~0.
        assert!((*spectrum.get(0, 0) - 7.0 * 16.0).abs() < 1e-6);
        assert!(spectrum.get(0, 1).abs() < 1e-6);
        for r in 0..4 {
            for c in 2..4 {
                assert!(spectrum.get(r, c).abs() < 1e-6, "unexpected energy at ({r},{c})");
            }
        }
    }

    #[test]
    fn normalize_to_max_scales_largest_magnitude_to_target() {
        let mut grid = Grid::from_fn(2, 2, |r, c| ((r * 2 + c) as f64) - 1.0);
        let original_max = normalize_to_max(&mut grid, 1000.0);
        assert!(original_max > 0.0);
        let new_max = grid.iter().cloned().fold(0f64, |a, v| a.max(v.abs()));
        assert!((new_max - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_to_max_is_a_no_op_on_an_all_zero_grid() {
        let mut grid = Grid::filled(3, 3, 0f64);
        let original_max = normalize_to_max(&mut grid, 1000.0);
        assert_eq!(original_max, 0.0);
        assert!(grid.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn forward_then_mirrored_inverse_recovers_a_single_ac_frequency() {
        // A column pattern with energy only at bin 1 (and its conjugate mirror, bin 3): an
        // isolated AC frequency well away from the unrecoverable Nyquist bin (bin 2 of 4).
        let rows = 4;
        let cols = 4;
        let field = Grid::from_fn(rows, cols, |_, c| {
            (2.0 * std::f64::consts::PI * c as f64 / cols as f64).cos()
        });
        let spectrum = forward(&field);

        let half = cols / 2;
        let mut complex = vec![Complex64::new(0.0, 0.0); rows * cols];
        for r in 0..rows {
            for j in 0..half {
                let re = *spectrum.get(r, 2 * j);
                let im = *spectrum.get(r, 2 * j + 1);
                complex[r * cols + j] = Complex64::new(re, im);
            }
        }
        mirror_conjugate_bins(&mut complex, rows, cols, half);
        let restored = inverse_transform(complex, rows, cols);

        for r in 0..rows {
            for c in 0..cols {
                let expected = *field.get(r, c);
                let actual = restored[r * cols + c].re;
                assert!(
                    (actual - expected).abs() < 1e-9,
                    "r={r} c={c} expected {expected} got {actual}"
                );
            }
        }
    }

    #[test]
    fn forward_and_decode_accept_odd_column_counts_without_panicking() {
        let field = Grid::filled(5, 7, 3.0);
        let spectrum = forward(&field);
        let out = decode(&spectrum, 10.0, 0);
        assert_eq!(out.rows, 5);
        assert_eq!(out.cols, 7);
    }

    #[test]
    fn decode_strips_padding_and_restores_plus_one_offset() {
        // A packed spectrum that is all-zero decodes to a uniformly-zero-then-clipped field; the
        // `+1` convention should still show up after stripping the pad.
        let packed = Grid::filled(6, 6, 0f64);
        let out = decode(&packed, 10.0, 1);
        assert_eq!(out.rows, 4);
        assert_eq!(out.cols, 4);
        assert!(out.iter().all(|&v| v == 1.0));
    }
}
