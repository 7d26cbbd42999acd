//! Message framer (C4): the textual envelope around a packed coefficient stream.
//!
//! A wire message is three parts: an intro (copied verbatim from the "Message Template"
//! resource, see [`template_text`]), a header line followed by one or more base-36 data lines,
//! and an outro (the remainder of the Message Template resource). This module owns the header
//! and data-block framing; [`template_text`] owns the intro/outro boilerplate.

pub mod template_text;

use crate::alphabet::{change_basis, symbol_value, value_symbol, ALPHABET};
use crate::error::{Error, Result};

/// The literal substring the decoder scans for to locate the header line.
pub const SENTINEL: &str = "A1R1G2U3S5";

/// Maximum data-line length, excluding the leading radix symbol.
const LINE_CAP: usize = 67;

/// Metadata carried on the header line: `{H}/{W}/{n}/{max_coeff}/{dtg}/{template}/A1R1G2U3S5/`.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub height: usize,
    pub width: usize,
    pub n: usize,
    pub max_coeff: i64,
    pub dtg: String,
    pub template: String,
}

impl Header {
    pub fn format(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}/{}/",
            self.height, self.width, self.n, self.max_coeff, self.dtg, self.template, SENTINEL
        )
    }

    fn parse(line: &str) -> Result<Header> {
        let fields: Vec<&str> = line.split('/').collect();
        if fields.len() < 7 {
            return Err(Error::MalformedMessage(format!(
                "header line has too few fields: {line:?}"
            )));
        }
        let parse_usize = |s: &str| {
            s.parse::<i64>()
                .map_err(|_| Error::MalformedMessage(format!("bad integer field {s:?} in header")))
        };
        Ok(Header {
            height: parse_usize(fields[0])? as usize,
            width: parse_usize(fields[1])? as usize,
            n: parse_usize(fields[2])? as usize,
            max_coeff: parse_usize(fields[3])?,
            dtg: fields[4].to_string(),
            template: fields[5].to_string(),
        })
    }
}

/// A fully parsed message: the boilerplate intro/outro text plus the decoded header and flat
/// coefficient-code stream.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedMessage {
    pub intro: String,
    pub header: Header,
    pub coeffs: Vec<u32>,
    pub outro: String,
}

/// Packs a flat stream of coefficient codes (each `< 36`) into base-36 data lines.
///
/// Greedily extends a window `[beg, end)`, re-expressing it in the smallest radix that covers
/// its own maximum value, and backs off by one element when the re-expressed line would exceed
/// [`LINE_CAP`] characters. The window is re-opened two elements wider than it closed (`end` is
/// advanced once in the emit branch and unconditionally again at the loop's end) — this anomaly
/// is reproduced exactly rather than smoothed into a uniform by-one advance, see SPEC_FULL.md
/// §4.4/§9.
pub fn pack(coeffs: &[u32]) -> Vec<String> {
    let mut lines = Vec::new();
    if coeffs.is_empty() {
        return lines;
    }

    let mut beg = 0usize;
    let mut end = 2usize.min(coeffs.len());

    while beg < coeffs.len() {
        let window = safe_slice(coeffs, beg, end);
        let mut m_d = window.iter().copied().max().unwrap_or(0) + 1;
        let mut line = change_basis(window, m_d, ALPHABET.len() as u32);
        let mut dump = false;
        let mut terminator = "";

        if line.len() > LINE_CAP {
            end -= 1;
            let window = safe_slice(coeffs, beg, end);
            m_d = window.iter().copied().max().unwrap_or(0) + 1;
            line = change_basis(window, m_d, ALPHABET.len() as u32);
            dump = true;
        } else if end >= coeffs.len() {
            terminator = "/";
            dump = true;
        }

        if dump {
            let mut out = String::new();
            out.push(value_symbol(m_d));
            for &digit in &line {
                out.push(value_symbol(digit));
            }
            out.push_str(terminator);
            lines.push(out);

            beg = end;
            end += 1;
        }
        end += 1;
    }

    lines
}

/// Clamps `[beg, end)` into `slice`'s bounds the way a Python slice silently would, instead of
/// panicking on an out-of-range `end`.
fn safe_slice(slice: &[u32], beg: usize, end: usize) -> &[u32] {
    let beg = beg.min(slice.len());
    let end = end.min(slice.len()).max(beg);
    &slice[beg..end]
}

/// Assembles a complete wire message from intro/outro boilerplate, a header, and a coefficient
/// stream.
pub fn build_message(intro: &str, header: &Header, coeffs: &[u32], outro: &str) -> String {
    let mut out = String::new();
    out.push_str(intro);
    if !intro.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&header.format());
    out.push('\n');
    for line in pack(coeffs) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(outro);
    out
}

/// Parses a complete wire message: everything up to the header line is the intro, the header is
/// parsed for its metadata, data lines are decoded back into a flat coefficient stream, and
/// everything after the line terminated by `/` is the outro.
pub fn parse_message(msg: &str) -> Result<DecodedMessage> {
    let mut intro_lines = Vec::new();
    let mut header = None;
    let mut coeffs = Vec::new();
    let mut outro_lines = Vec::new();
    let mut footer = false;

    for line in msg.lines() {
        if header.is_none() {
            if line.contains(SENTINEL) {
                header = Some(Header::parse(line)?);
            } else {
                intro_lines.push(line);
            }
            continue;
        }

        if footer {
            outro_lines.push(line);
            continue;
        }

        let mut chars = line.chars();
        let radix_char = chars.next().ok_or_else(|| {
            Error::MalformedMessage("empty data line in message body".to_string())
        })?;
        let m_d = symbol_value(radix_char).ok_or_else(|| {
            Error::MalformedMessage(format!("invalid radix symbol {radix_char:?}"))
        })?;

        let mut digits = Vec::new();
        for c in chars {
            if c == '/' {
                footer = true;
            } else {
                let value = symbol_value(c).ok_or_else(|| {
                    Error::MalformedMessage(format!("invalid data symbol {c:?}"))
                })?;
                digits.push(value);
            }
        }

        let decoded = change_basis(&digits, ALPHABET.len() as u32, m_d);
        coeffs.extend(decoded);
    }

    let header = header.ok_or_else(|| {
        Error::MalformedMessage(format!("no header line containing {SENTINEL} found"))
    })?;

    Ok(DecodedMessage {
        intro: join_lines(&intro_lines),
        header,
        coeffs,
        outro: join_lines(&outro_lines),
    })
}

fn join_lines(lines: &[&str]) -> String {
    let mut out = lines.join("\n");
    if !lines.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header {
            height: 300,
            width: 300,
            n: 12,
            max_coeff: 17,
            dtg: "010000ZJAN2025".to_string(),
            template: "EUCOM".to_string(),
        }
    }

    #[test]
    fn header_round_trips_through_format_and_parse() {
        let h = header();
        let formatted = h.format();
        assert!(formatted.contains(SENTINEL));
        let parsed = Header::parse(&formatted).unwrap();
        assert_eq!(parsed, h);
    }

    #[test]
    fn pack_empty_stream_yields_no_lines() {
        assert!(pack(&[]).is_empty());
    }

    #[test]
    fn pack_then_parse_recovers_original_coefficients() {
        let coeffs: Vec<u32> = (0..200).map(|i| (i * 7) % 30).collect();
        let lines = pack(&coeffs);
        assert!(!lines.is_empty());
        assert!(lines.last().unwrap().ends_with('/'));

        let msg = build_message("INTRO\nBT\n", &header(), &coeffs, "BT\n#0001\nNNNN\n");
        let decoded = parse_message(&msg).unwrap();
        assert_eq!(decoded.header, header());
        assert_eq!(decoded.coeffs, coeffs);
    }

    #[test]
    fn single_short_line_gets_terminator() {
        let coeffs = vec![3u32, 1, 4];
        let lines = pack(&coeffs);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with('/'));
    }

    #[test]
    fn parse_message_rejects_missing_sentinel() {
        let err = parse_message("BT\nno header here\nBT\n").unwrap_err();
        assert!(matches!(err, Error::MalformedMessage(_)));
    }
}
