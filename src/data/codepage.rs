use std::fmt;

use encoding_rs::{Encoding, WINDOWS_1251};

use crate::error::{Result, SpeError};

// ---------------------------------------------------------------------------
// CodePage – byte ⇄ char table for a single-byte legacy encoding
// ---------------------------------------------------------------------------

/// Lookup table mapping each of the 256 byte values to exactly one character.
///
/// `.spe` headers are written in the producing machine's legacy code page, so
/// the table is swappable. Bytes the encoding leaves undefined decode to
/// U+FFFD.
#[derive(Clone)]
pub struct CodePage {
    name: &'static str,
    table: [char; 256],
}

impl CodePage {
    /// Build a table from an `encoding_rs` encoding.  Only single-byte
    /// encodings are accepted, since the tokenizer decodes byte by byte.
    pub fn from_encoding(encoding: &'static Encoding) -> Result<Self> {
        if !encoding.is_single_byte() {
            return Err(SpeError::UnsupportedEncoding {
                name: encoding.name(),
            });
        }

        Ok(Self {
            name: encoding.name(),
            table: single_byte_table(encoding),
        })
    }

    /// Look up an encoding by WHATWG label (`"cp1251"`, `"koi8-r"`, ...).
    pub fn for_label(label: &str) -> Result<Self> {
        let encoding =
            Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| SpeError::UnknownEncoding {
                label: label.to_string(),
            })?;
        Self::from_encoding(encoding)
    }

    /// Caller-supplied table, for locales `encoding_rs` does not cover.
    pub fn from_table(name: &'static str, table: [char; 256]) -> Self {
        Self { name, table }
    }

    /// The Cyrillic Windows code page LSRM software writes by default.
    pub fn windows_1251() -> Self {
        Self {
            name: WINDOWS_1251.name(),
            table: single_byte_table(WINDOWS_1251),
        }
    }

    /// ISO-8859-1 style identity mapping.
    pub fn latin1() -> Self {
        let mut table = ['\0'; 256];
        for (byte, slot) in table.iter_mut().enumerate() {
            *slot = char::from(byte as u8);
        }
        Self {
            name: "ISO-8859-1",
            table,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn decode_byte(&self, byte: u8) -> char {
        self.table[byte as usize]
    }

    /// Decode a whole byte slice, one character per byte.
    pub fn decode(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| self.decode_byte(b)).collect()
    }

    /// Reverse lookup used when writing headers.
    pub fn encode_char(&self, ch: char) -> Option<u8> {
        if ch == char::REPLACEMENT_CHARACTER {
            return None;
        }
        self.table
            .iter()
            .position(|&c| c == ch)
            .map(|pos| pos as u8)
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        text.chars()
            .map(|ch| {
                self.encode_char(ch).ok_or_else(|| SpeError::Unencodable {
                    text: text.to_string(),
                    encoding: self.name,
                })
            })
            .collect()
    }
}

/// Decode each byte value on its own.  Only meaningful for encodings where
/// `is_single_byte()` holds.
fn single_byte_table(encoding: &'static Encoding) -> [char; 256] {
    let mut table = [char::REPLACEMENT_CHARACTER; 256];
    for (byte, slot) in table.iter_mut().enumerate() {
        let input = [byte as u8];
        let decoded = encoding.decode_without_bom_handling_and_without_replacement(&input);
        if let Some(ch) = decoded.and_then(|text| text.chars().next()) {
            *slot = ch;
        }
    }
    table
}

impl Default for CodePage {
    fn default() -> Self {
        Self::windows_1251()
    }
}

impl fmt::Debug for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CodePage").field(&self.name).finish()
    }
}
