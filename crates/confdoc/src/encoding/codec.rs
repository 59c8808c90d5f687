//! Byte <-> text transforms for each [`Encoding`].

use base64::Engine as _;

use crate::encoding::Encoding;
use crate::error::{ConfigError, Result};

const BASE32_ALPHABET: base32::Alphabet = base32::Alphabet::Rfc4648 { padding: true };

/// Encodes `bytes` as text in the alphabet of `encoding`.
///
/// # Examples
///
/// ```rust
/// use confdoc::encoding::{encode_bytes, decode_text, Encoding};
///
/// let text = encode_bytes(Encoding::Base64, b"{\"k\":\"v\"}");
/// assert_eq!(text, "eyJrIjoidiJ9");
/// assert_eq!(decode_text(Encoding::Base64, &text).unwrap(), b"{\"k\":\"v\"}");
/// ```
pub fn encode_bytes(encoding: Encoding, bytes: &[u8]) -> String {
    match encoding {
        Encoding::Base64 => base64::engine::general_purpose::STANDARD.encode(bytes),
        Encoding::Base32 => base32::encode(BASE32_ALPHABET, bytes),
        Encoding::Base16 => hex::encode_upper(bytes),
        Encoding::Hex => hex::encode(bytes),
    }
}

/// Reverses [`encode_bytes`].
///
/// Hexadecimal input (`Base16` and `Hex`) is accepted in either case.
///
/// # Errors
///
/// Returns [`ConfigError::Encoding`] if `text` is not valid for `encoding`.
pub fn decode_text(encoding: Encoding, text: &str) -> Result<Vec<u8>> {
    let malformed = |message: String| ConfigError::Encoding { encoding, message };
    match encoding {
        Encoding::Base64 => base64::engine::general_purpose::STANDARD
            .decode(text)
            .map_err(|e| malformed(e.to_string())),
        Encoding::Base32 => {
            if text.is_empty() {
                return Ok(Vec::new());
            }
            check_base32(text).map_err(malformed)?;
            base32::decode(BASE32_ALPHABET, text)
                .ok_or_else(|| malformed("invalid base32 text".to_string()))
        }
        Encoding::Base16 | Encoding::Hex => hex::decode(text).map_err(|e| malformed(e.to_string())),
    }
}

/// Padding counts RFC 4648 allows in the final 8-character group.
const BASE32_PAD_COUNTS: [usize; 5] = [0, 1, 3, 4, 6];

/// Rejects base32 text that is not in canonical RFC 4648 form.
///
/// `base32::decode` tolerates misplaced padding and stray trailing bits, so
/// the padding run and the final character are checked here first.
fn check_base32(text: &str) -> std::result::Result<(), String> {
    if let Some(bad) = text.chars().find(|c| !matches!(c, 'A'..='Z' | '2'..='7' | '=')) {
        return Err(format!("invalid character {bad:?}"));
    }
    if text.len() % 8 != 0 {
        return Err(format!("length {} is not a multiple of 8", text.len()));
    }

    let data = text.trim_end_matches('=');
    if let Some(pos) = data.find('=') {
        return Err(format!("padding at offset {pos} is followed by data"));
    }
    let pad = text.len() - data.len();
    if !BASE32_PAD_COUNTS.contains(&pad) {
        return Err(format!("{pad} padding characters is not a valid group ending"));
    }

    // Bits of the last character that fall past the final whole byte.
    let unused = (data.len() * 5) % 8;
    let last = data.as_bytes().last().map_or(0, |&c| base32_value(c));
    if last & ((1 << unused) - 1) != 0 {
        return Err("non-zero trailing bits after the last byte".to_string());
    }
    Ok(())
}

fn base32_value(c: u8) -> u8 {
    match c {
        b'A'..=b'Z' => c - b'A',
        b'2'..=b'7' => c - b'2' + 26,
        _ => 0,
    }
}
