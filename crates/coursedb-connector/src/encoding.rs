//! Text encoding codec for external database values.
//!
//! The external table may store text in a single-byte legacy encoding. The
//! codec is a symmetric pair: values are decoded on read and encoded on
//! write with the same table, and both directions are the identity when the
//! configured encoding is UTF-8 (the canonical encoding).

use serde::{Deserialize, Serialize};

/// Text encoding of the external course table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// UTF-8, the canonical encoding. Both codec directions are the identity.
    #[default]
    Utf8,
    /// ISO-8859-1 (Latin-1).
    Latin1,
    /// Windows-1252.
    Windows1252,
}

/// Windows-1252 mappings for the 0x80..=0x9F range. Bytes undefined in the
/// encoding map to the matching C1 control, per the WHATWG table.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

impl TextEncoding {
    /// Convert to the encoding's conventional name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    /// Whether this is the canonical encoding (no conversion needed).
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        matches!(self, TextEncoding::Utf8)
    }

    /// Decode raw bytes read from the external database into text.
    ///
    /// Invalid UTF-8 input decodes with replacement characters; the
    /// single-byte encodings are total.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            TextEncoding::Windows1252 => bytes.iter().map(|&b| windows_1252_char(b)).collect(),
        }
    }

    /// Encode text into the external database encoding.
    ///
    /// Characters with no representation in the target encoding become `?`.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            TextEncoding::Windows1252 => text.chars().map(windows_1252_byte).collect(),
        }
    }
}

fn windows_1252_char(byte: u8) -> char {
    if (0x80..=0x9F).contains(&byte) {
        WINDOWS_1252_HIGH[usize::from(byte - 0x80)]
    } else {
        char::from(byte)
    }
}

fn windows_1252_byte(c: char) -> u8 {
    let code = u32::from(c);
    if code < 0x80 || (0xA0..=0xFF).contains(&code) {
        return code as u8;
    }
    match WINDOWS_1252_HIGH.iter().position(|&m| m == c) {
        Some(index) => 0x80 + index as u8,
        None => b'?',
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "iso-8859-1" | "latin-1" | "latin1" => Ok(TextEncoding::Latin1),
            "windows-1252" | "cp1252" => Ok(TextEncoding::Windows1252),
            _ => Err(format!("Unknown text encoding: {s}")),
        }
    }
}
