//! Reversible binary-to-text encodings applied to serialized documents.
//!
//! Encoding always covers the whole serialized document: the JSON or TOML
//! text is turned into bytes, and those bytes into one of the text-safe
//! alphabets below.
//!
//! | Encoding | Alphabet                         | Output case | Decode accepts |
//! |----------|----------------------------------|-------------|----------------|
//! | `Base64` | RFC 4648 standard, `=` padding   | mixed       | padded only    |
//! | `Base32` | RFC 4648, `=` padding            | upper       | canonical only |
//! | `Base16` | RFC 4648 base16                  | upper       | either case    |
//! | `Hex`    | hexadecimal digits               | lower       | either case    |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub mod codec;

pub use codec::{decode_text, encode_bytes};

/// A text-safe transform that can be applied to a document in memory.
///
/// A decoded document has no encoding; see
/// [`ConfigDocument::encoding`](crate::ConfigDocument::encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Base64,
    Base32,
    Base16,
    Hex,
}

impl Encoding {
    /// All supported encodings.
    pub const ALL: [Encoding; 4] = [
        Encoding::Base64,
        Encoding::Base32,
        Encoding::Base16,
        Encoding::Hex,
    ];

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Base32 => "base32",
            Self::Base16 => "base16",
            Self::Hex => "hex",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnsupportedEncoding(s.to_string()))
    }
}
