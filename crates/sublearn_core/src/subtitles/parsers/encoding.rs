//! Source text decoding.

use crate::subtitles::error::ParseError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decode subtitle bytes into text.
///
/// A UTF-8 BOM is stripped, UTF-16 is decoded when its BOM is present,
/// otherwise UTF-8 is assumed with a Latin-1 fallback for legacy files.
pub fn decode_source(bytes: &[u8]) -> Result<String, ParseError> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return String::from_utf8(rest.to_vec())
            .map_err(|e| ParseError::EncodingError(format!("invalid UTF-8 after BOM: {}", e)));
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => {
            tracing::debug!("Input is not valid UTF-8, decoding as Latin-1");
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String, ParseError> {
    if bytes.len() % 2 != 0 {
        return Err(ParseError::EncodingError(
            "UTF-16 input has an odd number of bytes".to_string(),
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|e| ParseError::EncodingError(format!("invalid UTF-16: {}", e)))
}
