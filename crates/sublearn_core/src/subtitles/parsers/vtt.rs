//! WebVTT subtitle parser.
//!
//! # Format Overview
//!
//! ```text
//! WEBVTT
//!
//! NOTE comments are not cues
//!
//! intro
//! 00:01.000 --> 00:04.000 align:start
//! Hello, world!
//! ```
//!
//! The header block, `NOTE`, `STYLE` and `REGION` blocks are not counted as
//! cue blocks. A cue may carry an optional identifier line before its timing.
//! Cue settings after the end timestamp are ignored.

use super::{fraction_to_ms, normalize_newlines, parse_component, split_blocks, Block, ParsedCues};
use crate::subtitles::error::ParseError;
use crate::subtitles::types::{Cue, SubtitleFormat};

/// Parse WebVTT content.
pub fn parse_vtt(content: &str) -> ParsedCues {
    let mut parsed = ParsedCues::new(SubtitleFormat::WebVtt);
    let content = normalize_newlines(content);

    for (ordinal, block) in split_blocks(&content).iter().enumerate() {
        let first = block.lines[0];
        if ordinal == 0 && first.starts_with("WEBVTT") {
            continue;
        }
        if is_metadata_block(first) {
            continue;
        }

        let index = parsed.next_index();
        parsed.record(parse_block(block, index));
    }

    parsed
}

fn is_metadata_block(first_line: &str) -> bool {
    ["NOTE", "STYLE", "REGION"].iter().any(|kw| {
        first_line
            .strip_prefix(kw)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
    })
}

fn parse_block(block: &Block<'_>, index: usize) -> Result<Cue, ParseError> {
    // Optional identifier line
    let timing_idx = if block.lines[0].contains("-->") {
        0
    } else if block.lines.get(1).is_some_and(|l| l.contains("-->")) {
        1
    } else {
        return Err(ParseError::MissingTiming { line: block.line });
    };

    let timing_line = block.lines[timing_idx];
    let timing_line_num = block.line + timing_idx;
    let (start_ms, end_ms) = parse_vtt_timing(timing_line)
        .ok_or_else(|| ParseError::invalid_time(timing_line_num, timing_line.trim()))?;

    let lines: Vec<String> = block.lines[timing_idx + 1..]
        .iter()
        .map(|l| l.to_string())
        .collect();
    if lines.is_empty() {
        return Err(ParseError::EmptyText {
            line: timing_line_num,
        });
    }

    Ok(Cue::new(start_ms, end_ms, lines, index))
}

fn parse_vtt_timing(line: &str) -> Option<(u64, u64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;

    Some((parse_vtt_time(start)?, parse_vtt_time(end)?))
}

/// Parse WebVTT timestamp: `HH:MM:SS.mmm` or `MM:SS.mmm`.
///
/// Returns time in milliseconds.
pub fn parse_vtt_time(s: &str) -> Option<u64> {
    let s = s.trim();
    let (clock, frac) = s.split_once('.')?;
    let fraction = fraction_to_ms(frac)?;

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, sec] => (parse_component(h)?, parse_component(m)?, parse_component(sec)?),
        [m, sec] => (0, parse_component(m)?, parse_component(sec)?),
        _ => return None,
    };

    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vtt_time() {
        assert_eq!(parse_vtt_time("00:00:01.500"), Some(1500));
        assert_eq!(parse_vtt_time("01:02.003"), Some(62_003));
        assert_eq!(parse_vtt_time("1:00:00.000"), Some(3_600_000));
        assert_eq!(parse_vtt_time("00:00:01"), None);
    }

    #[test]
    fn test_parse_vtt_with_metadata_blocks() {
        let content = "WEBVTT - Test file\nKind: captions\n\n\
                       NOTE\nThis is a comment\n\n\
                       STYLE\n::cue { color: yellow }\n\n\
                       intro\n00:01.000 --> 00:04.000 align:start position:10%\nHello,\nworld!\n\n\
                       00:00:05.000 --> 00:00:08.000\nSecond cue\n";

        let data = parse_vtt(content);

        assert_eq!(data.format, SubtitleFormat::WebVtt);
        assert_eq!(data.blocks_seen, 2);
        assert_eq!(data.cues.len(), 2);
        assert_eq!(data.cues[0].start_ms, 1000);
        assert_eq!(data.cues[0].end_ms, 4000);
        assert_eq!(data.cues[0].lines, vec!["Hello,", "world!"]);
        assert_eq!(data.cues[1].source_index, 1);
        assert_eq!(data.cues[1].lines, vec!["Second cue"]);
    }

    #[test]
    fn test_vtt_malformed_cue_skipped() {
        let content = "WEBVTT\n\n00:01.000 --> 00:xx.000\nBroken\n\n00:05.000 --> 00:06.000\nFine\n";
        let data = parse_vtt(content);
        assert_eq!(data.blocks_seen, 2);
        assert_eq!(data.cues.len(), 1);
        assert!(matches!(data.skipped[0], ParseError::InvalidTime { line: 3, .. }));
    }
}
