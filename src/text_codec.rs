//! Text payload codec (C11): generic UTF-8 prose, compressed and re-expressed in an
//! all-uppercase-ASCII alphabet so it shares the transmission constraints of the chart codec.

use std::io::{Read, Write};

use base32::Alphabet;

use crate::error::{Error, Result};

const BROTLI_QUALITY: u32 = 9;
const BROTLI_LG_WINDOW: u32 = 22;

/// `base32(brotli_compress(utf8(s)))`, using the standard RFC 4648 alphabet without padding.
pub fn encode_text(s: &str) -> String {
    let mut compressed = Vec::new();
    {
        let mut writer =
            brotli::CompressorWriter::new(&mut compressed, 4096, BROTLI_QUALITY, BROTLI_LG_WINDOW);
        writer
            .write_all(s.as_bytes())
            .expect("writing to an in-memory buffer cannot fail");
    }
    base32::encode(Alphabet::Rfc4648 { padding: false }, &compressed)
}

/// The inverse of [`encode_text`].
pub fn decode_text(s: &str) -> Result<String> {
    let compressed = base32::decode(Alphabet::Rfc4648 { padding: false }, s)
        .ok_or_else(|| Error::MalformedMessage("invalid base32 text payload".to_string()))?;

    let mut decompressed = Vec::new();
    brotli::Decompressor::new(compressed.as_slice(), 4096)
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::MalformedMessage(format!("invalid brotli stream: {e}")))?;

    String::from_utf8(decompressed)
        .map_err(|e| Error::MalformedMessage(format!("decompressed payload is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_text() {
        let samples = [
            "",
            "HELLO WORLD",
            "The quick brown fox jumps over the lazy dog. 0123456789!",
            "unicode: \u{1F6A2} \u{2603}",
        ];
        for s in samples {
            let encoded = encode_text(s);
            assert_eq!(decode_text(&encoded).unwrap(), s);
        }
    }

    #[test]
    fn encoded_text_is_rfc4648_base32_only() {
        let encoded = encode_text("a message with some repeated repeated repeated content");
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn decode_rejects_invalid_base32() {
        assert!(decode_text("not valid base32!!!").is_err());
    }
}
