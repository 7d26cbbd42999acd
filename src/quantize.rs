//! Log-magnitude, sign-included coefficient quantiser.
//!
//! A DFT coefficient in `[-1000, 1000]` is mapped to one of the 36 alphabet positions: one zero
//! code, 17 positive magnitude bins, and 17 negative magnitude bins (`M_CHAR = (|ALPHABET| - 1)
//! / 2`). The mapping is monotone in magnitude but lossy — this is a perceptual codec, not a
//! lossless one.

use crate::alphabet::ALPHABET;

const M_INT: f64 = 1000.0;

fn m_char() -> f64 {
    ((ALPHABET.len() - 1) / 2) as f64
}

fn dx() -> f64 {
    M_INT.log10() / m_char()
}

/// Encodes a coefficient `x` into a code in `[0, 2 * M_CHAR]`. Values with magnitude greater
/// than 1000 saturate to the zero code.
pub fn encode(x: f64) -> u32 {
    if x.abs() > M_INT {
        return 0;
    }

    let m_char = m_char() as i64;
    let dx = dx();
    let offset = if x < 0.0 { 1 } else { 0 };

    let mut bin = 0i64;
    if x != 0.0 {
        let x_log = x.abs().log10();
        for i in 1..m_char {
            if (i as f64) * dx < x_log && x_log <= (i as f64 + 1.0) * dx {
                bin = i * 2;
            }
        }
    }

    (bin + offset) as u32
}

/// Decodes a code `c` back into an approximate coefficient magnitude and sign. Codes of 0 or
/// greater than the alphabet size decode to exactly 0.0.
pub fn decode(c: u32) -> f64 {
    if c == 0 || c as usize > ALPHABET.len() {
        return 0.0;
    }

    let dx = dx();
    let offset = c % 2;
    let i = (c - offset) / 2;
    let magnitude = 10f64.powf((i as f64 + 1.0) * dx);

    if offset == 1 {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_outside_range() {
        assert_eq!(encode(1500.0), 0);
        assert_eq!(encode(-1500.0), 0);
        assert_eq!(decode(0), 0.0);
    }

    #[test]
    fn zero_encodes_to_zero_code() {
        assert_eq!(encode(0.0), 0);
    }

    #[test]
    fn monotone_and_sign_preserving() {
        let xs = [1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 500.0, 999.0];
        let mut last = 0.0;
        for &x in &xs {
            let d = decode(encode(x));
            assert!(d >= last, "expected monotone increase at x={x}: {d} < {last}");
            last = d;
        }
        for &x in &xs {
            assert_eq!(decode(encode(-x)).is_sign_negative(), true);
        }
    }

    #[test]
    fn sweep_round_trip_within_one_bin() {
        let dx = dx();
        for &x in &[-1000.0, -100.0, -10.0, -1.0, 1.0, 10.0, 100.0, 1000.0] {
            let d = decode(encode(x));
            assert_eq!(d.is_sign_negative(), x.is_sign_negative());
            let lo = x.abs() * 10f64.powf(-dx);
            let hi = x.abs() * 10f64.powf(dx);
            assert!(
                d.abs() >= lo * 0.999 && d.abs() <= hi * 1.001,
                "x={x} decoded magnitude {} out of [{lo}, {hi}]",
                d.abs()
            );
        }
    }
}
