//! How literal strings map to the symbols the generated code compares.

use serde::Serialize;

/// Character encoding of the buffers the generated stemmer works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// One byte per character (ISO-8859-1 and friends).
    #[default]
    SingleByte,
    /// UTF-8 bytes; groupings hold code points.
    Utf8,
    /// One 16-bit symbol per character.
    WideChars,
}

impl Encoding {
    /// Symbols of a literal string as stored in the buffer.
    pub fn encode(self, s: &str) -> Vec<u16> {
        match self {
            Encoding::SingleByte => s
                .chars()
                .map(|c| u8::try_from(c).map_or(u16::from(b'?'), u16::from))
                .collect(),
            Encoding::Utf8 => s.bytes().map(u16::from).collect(),
            Encoding::WideChars => s.encode_utf16().collect(),
        }
    }

    /// Code points of a literal string, as a character class sees them.
    pub fn code_points(self, s: &str) -> Vec<u16> {
        match self {
            Encoding::SingleByte => self.encode(s),
            Encoding::Utf8 | Encoding::WideChars => s.encode_utf16().collect(),
        }
    }

    /// Number of characters in an encoded literal.
    pub fn char_len(self, symbols: &[u16]) -> usize {
        match self {
            // Continuation bytes are 0b10xx_xxxx.
            Encoding::Utf8 => symbols.iter().filter(|&&b| b & 0xC0 != 0x80).count(),
            Encoding::SingleByte | Encoding::WideChars => symbols.len(),
        }
    }
}
