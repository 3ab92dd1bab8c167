//! Text encodings tried, in priority order, when decoding input files

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A supported input text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "cp1252", alias = "windows-1252")]
    Cp1252,
}

impl TextEncoding {
    /// Default priority: UTF-8, then Latin-1, then Windows-1252.
    pub fn default_priority() -> Vec<TextEncoding> {
        vec![TextEncoding::Utf8, TextEncoding::Latin1, TextEncoding::Cp1252]
    }

    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Cp1252 => "cp1252",
        }
    }

    /// Decode `bytes` strictly. Returns `None` on any malformed sequence.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| match text.strip_prefix('\u{feff}') {
                    Some(stripped) => stripped.to_string(),
                    None => text.into_owned(),
                }),
            // ISO-8859-1 maps every byte to the code point of the same value.
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Cp1252 => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            "cp1252" | "windows-1252" => Ok(TextEncoding::Cp1252),
            other => Err(format!("unknown text encoding: {}", other)),
        }
    }
}

/// Decode with the first encoding in `priority` that accepts the bytes.
pub fn decode_with_fallback(bytes: &[u8], priority: &[TextEncoding]) -> Option<(String, TextEncoding)> {
    for &encoding in priority {
        match encoding.decode(bytes) {
            Some(text) => return Some((text, encoding)),
            None => debug!("Decoding as {} failed, trying next encoding", encoding),
        }
    }
    None
}
