//! Zig-zag address generator for the low-frequency corner of a real 2-D DFT.
//!
//! The DFT codec only ever transmits coefficients from an `(n, 2n)` block in the top-left
//! corner of the transform (even columns are real parts, odd columns imaginary parts of the
//! same coefficient). [`dft_mapping`] produces the `[row, col]` addresses in that block, in
//! shell order, starting from the DC term.

/// Produces the `(row, col)` address list for the top-left `(n, 2n)` block of a real DFT,
/// expanding outward in square shells `k = 1, ..., n - 1`.
pub fn dft_mapping(n: usize) -> Vec<(usize, usize)> {
    let mut out = vec![(0, 0), (0, 1)];

    for k in 1..n {
        for i in 0..k {
            out.push((i, 2 * k));
            out.push((i, 2 * k + 1));
            out.push((k, 2 * i));
            out.push((k, 2 * i + 1));
        }
        out.push((k, 2 * k));
        out.push((k, 2 * k + 1));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn coverage_count_and_uniqueness_and_bounds() {
        let n = 12;
        let addrs = dft_mapping(n);

        let expected = 2 + 2 * (n - 1) + 4 * (n - 1) * n / 2;
        assert_eq!(addrs.len(), expected);

        let unique: HashSet<_> = addrs.iter().copied().collect();
        assert_eq!(unique.len(), addrs.len(), "addresses must be unique");

        for &(i, j) in &addrs {
            assert!(i <= n, "row {i} out of bounds for n={n}");
            assert!(j <= 2 * n + 1, "col {j} out of bounds for n={n}");
        }
    }

    #[test]
    fn starts_with_dc_terms() {
        let addrs = dft_mapping(3);
        assert_eq!(&addrs[0..2], &[(0, 0), (0, 1)]);
    }

    #[test]
    fn n_equal_one_has_only_dc() {
        assert_eq!(dft_mapping(1), vec![(0, 0), (0, 1)]);
    }
}
