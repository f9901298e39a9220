//! Cue parsers for the supported source formats.
//!
//! Each parser is a pure function from text to [`ParsedCues`]. Malformed
//! blocks never abort a document: they are recorded in
//! [`ParsedCues::skipped`] and parsing continues with the next block.

mod ass;
mod encoding;
mod srt;
mod vtt;

pub use ass::{parse_ass, parse_ass_time};
pub use encoding::decode_source;
pub use srt::{parse_srt, parse_srt_time};
pub use vtt::{parse_vtt, parse_vtt_time};

use std::borrow::Cow;

use crate::subtitles::error::ParseError;
use crate::subtitles::types::{Cue, SubtitleFormat};

/// Result of parsing one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCues {
    /// Successfully parsed cues, in source order.
    pub cues: Vec<Cue>,
    /// Format the document was parsed as.
    pub format: SubtitleFormat,
    /// Number of cue blocks encountered (parsed + skipped).
    pub blocks_seen: usize,
    /// Block-level errors for every skipped block.
    pub skipped: Vec<ParseError>,
}

impl ParsedCues {
    /// Create an empty result for a format.
    pub fn new(format: SubtitleFormat) -> Self {
        Self {
            cues: Vec::new(),
            format,
            blocks_seen: 0,
            skipped: Vec::new(),
        }
    }

    /// Fraction of blocks that produced a cue (1.0 for an empty document).
    pub fn coverage(&self) -> f64 {
        if self.blocks_seen == 0 {
            return 1.0;
        }
        self.cues.len() as f64 / self.blocks_seen as f64
    }

    /// Whether any block was skipped.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Ordinal the next block will receive.
    pub(crate) fn next_index(&self) -> usize {
        self.blocks_seen
    }

    /// Record the outcome of one block.
    pub(crate) fn record(&mut self, outcome: Result<Cue, ParseError>) {
        self.blocks_seen += 1;
        match outcome {
            Ok(cue) => self.cues.push(cue),
            Err(err) => {
                tracing::debug!("Skipping {:?} block: {}", self.format, err);
                self.skipped.push(err);
            }
        }
    }
}

/// Parse subtitle content with auto-detection.
///
/// Tries to detect the format from content if not specified.
pub fn parse_content(
    content: &str,
    format: Option<SubtitleFormat>,
) -> Result<ParsedCues, ParseError> {
    let format = format.unwrap_or_else(|| detect_format(content));

    match format {
        SubtitleFormat::Ass => parse_ass(content),
        SubtitleFormat::Srt => Ok(parse_srt(content)),
        SubtitleFormat::WebVtt => Ok(parse_vtt(content)),
    }
}

/// Decode raw bytes and parse them.
pub fn parse_bytes(bytes: &[u8], format: Option<SubtitleFormat>) -> Result<ParsedCues, ParseError> {
    let content = decode_source(bytes)?;
    parse_content(&content, format)
}

/// Detect subtitle format from content.
pub fn detect_format(content: &str) -> SubtitleFormat {
    let content_lower = content.to_lowercase();

    if content_lower.contains("[script info]")
        || content_lower.contains("[v4+ styles]")
        || content_lower.contains("[v4 styles]")
        || content_lower.contains("[events]")
    {
        return SubtitleFormat::Ass;
    }

    if content.trim_start_matches('\u{feff}').trim_start().starts_with("WEBVTT") {
        return SubtitleFormat::WebVtt;
    }

    SubtitleFormat::Srt
}

/// A run of non-blank lines.
pub(crate) struct Block<'a> {
    /// 1-based line number of the first line.
    pub line: usize,
    pub lines: Vec<&'a str>,
}

/// Strip a leading BOM and fold `\r\n` / `\r` into `\n`.
pub(crate) fn normalize_newlines(content: &str) -> Cow<'_, str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if content.contains('\r') {
        Cow::Owned(content.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(content)
    }
}

/// Split normalized content into blank-line separated blocks.
pub(crate) fn split_blocks(content: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block<'_>> = None;

    for (idx, raw) in content.split('\n').enumerate() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }
        current
            .get_or_insert_with(|| Block {
                line: idx + 1,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }

    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// Convert a fractional-second string to milliseconds.
///
/// One digit is tenths, two are centiseconds, three or more are read as
/// milliseconds (extra digits truncated).
pub(crate) fn fraction_to_ms(frac: &str) -> Option<u64> {
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = &frac[..frac.len().min(3)];
    let value: u64 = digits.parse().ok()?;
    Some(match digits.len() {
        1 => value * 100,
        2 => value * 10,
        _ => value,
    })
}

/// Parse a non-negative integer component made only of ASCII digits.
pub(crate) fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format_ass() {
        let content = "[Script Info]\nTitle: Test\n";
        assert_eq!(detect_format(content), SubtitleFormat::Ass);
    }

    #[test]
    fn test_detect_format_srt() {
        let content = "1\n00:00:01,000 --> 00:00:04,000\nHello\n";
        assert_eq!(detect_format(content), SubtitleFormat::Srt);
    }

    #[test]
    fn test_detect_format_webvtt() {
        let content = "\u{feff}WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nHello\n";
        assert_eq!(detect_format(content), SubtitleFormat::WebVtt);
    }

    #[test]
    fn test_split_blocks_tracks_line_numbers() {
        let content = normalize_newlines("a\r\nb\r\n\r\n  \r\nc\rd\n");
        let blocks = split_blocks(&content);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].line, 1);
        assert_eq!(blocks[0].lines, vec!["a", "b"]);
        assert_eq!(blocks[1].line, 5);
        assert_eq!(blocks[1].lines, vec!["c", "d"]);
    }

    #[test]
    fn test_fraction_to_ms() {
        assert_eq!(fraction_to_ms("5"), Some(500));
        assert_eq!(fraction_to_ms("05"), Some(50));
        assert_eq!(fraction_to_ms("123"), Some(123));
        assert_eq!(fraction_to_ms("1239"), Some(123));
        assert_eq!(fraction_to_ms(""), None);
        assert_eq!(fraction_to_ms("1a"), None);
    }

    #[test]
    fn test_coverage_of_empty_document() {
        let parsed = parse_content("", Some(SubtitleFormat::Srt)).unwrap();
        assert!(parsed.cues.is_empty());
        assert_eq!(parsed.coverage(), 1.0);
    }

    #[test]
    fn test_parse_bytes_latin1_fallback() {
        // "Világ" in Latin-1
        let bytes = b"1\n00:00:01,000 --> 00:00:02,000\nVil\xe1g\n";
        let parsed = parse_bytes(bytes, None).unwrap();
        assert_eq!(parsed.cues[0].lines, vec!["Világ"]);
    }
}
