//! SRT subtitle parser.
//!
//! Parses SubRip (.srt) subtitle files.
//!
//! # Format Overview
//!
//! SRT files consist of sequential entries:
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! Hello, world!
//!
//! 2
//! 00:00:05,000 --> 00:00:08,000
//! This is a test.
//! ```
//!
//! Each entry has:
//! - Index number (required; its value is not checked for continuity)
//! - Timing line: `HH:MM:SS,mmm --> HH:MM:SS,mmm`, optionally followed by
//!   position hints which are ignored
//! - One or more lines of text
//! - Blank line separator

use super::{fraction_to_ms, normalize_newlines, parse_component, split_blocks, Block, ParsedCues};
use crate::subtitles::error::ParseError;
use crate::subtitles::types::{Cue, SubtitleFormat};

/// Parse SRT content.
///
/// # Arguments
/// * `content` - The raw SRT file content as a string.
///
/// # Returns
/// Parsed cues in source order. Blocks without a numeric index, a valid
/// timing line or any text are recorded as skipped.
pub fn parse_srt(content: &str) -> ParsedCues {
    let mut parsed = ParsedCues::new(SubtitleFormat::Srt);
    let content = normalize_newlines(content);

    for block in split_blocks(&content) {
        let index = parsed.next_index();
        parsed.record(parse_block(&block, index));
    }

    parsed
}

fn parse_block(block: &Block<'_>, index: usize) -> Result<Cue, ParseError> {
    let first = block.lines[0].trim();
    if parse_component(first).is_none() {
        return Err(ParseError::invalid_index(block.line, first));
    }

    let Some(timing_line) = block.lines.get(1) else {
        return Err(ParseError::MissingTiming { line: block.line });
    };
    let timing_line_num = block.line + 1;
    if !timing_line.contains("-->") {
        return Err(ParseError::MissingTiming { line: block.line });
    }
    let (start_ms, end_ms) = parse_srt_timing(timing_line)
        .ok_or_else(|| ParseError::invalid_time(timing_line_num, timing_line.trim()))?;

    let lines: Vec<String> = block.lines[2..].iter().map(|l| l.to_string()).collect();
    if lines.is_empty() {
        return Err(ParseError::EmptyText {
            line: timing_line_num,
        });
    }

    Ok(Cue::new(start_ms, end_ms, lines, index))
}

/// Parse SRT timing line: `HH:MM:SS,mmm --> HH:MM:SS,mmm [X1:.. Y2:..]`
fn parse_srt_timing(line: &str) -> Option<(u64, u64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;

    Some((parse_srt_time(start)?, parse_srt_time(end)?))
}

/// Parse SRT timestamp: `HH:MM:SS,mmm` or `HH:MM:SS.mmm`
///
/// Returns time in milliseconds.
pub fn parse_srt_time(s: &str) -> Option<u64> {
    let s = s.trim();

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours = parse_component(parts[0])?;
    let minutes = parse_component(parts[1])?;

    // Handle both comma and period as decimal separator
    let (seconds, fraction) = match parts[2].split_once([',', '.']) {
        Some((secs, frac)) => (parse_component(secs)?, fraction_to_ms(frac)?),
        None => (parse_component(parts[2])?, 0),
    };

    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + fraction)
}
