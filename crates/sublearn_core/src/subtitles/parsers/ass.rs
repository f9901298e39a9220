//! ASS/SSA subtitle parser.
//!
//! Reads cues from Advanced SubStation Alpha (.ass) and SubStation Alpha
//! (.ssa) files.
//!
//! # Format Overview
//!
//! ASS files have three main sections:
//! - `[Script Info]`: Metadata (title, resolution, etc.)
//! - `[V4+ Styles]` or `[V4 Styles]`: Style definitions
//! - `[Events]`: Dialogue and comment lines
//!
//! Only `Dialogue:` lines in `[Events]` become cues; styling is not carried
//! over. All timing is in the format `H:MM:SS.cc` (centiseconds).

use super::{fraction_to_ms, normalize_newlines, parse_component, ParsedCues};
use crate::subtitles::error::ParseError;
use crate::subtitles::types::{Cue, SubtitleFormat};
use crate::subtitles::writers::BACKSLASH_GUARD;

/// Parse ASS/SSA content.
///
/// # Arguments
/// * `content` - The raw ASS file content as a string.
///
/// # Returns
/// * `Ok(ParsedCues)` - One cue per parseable `Dialogue:` line.
/// * `Err(ParseError::MissingSection)` - Non-empty document without `[Events]`.
pub fn parse_ass(content: &str) -> Result<ParsedCues, ParseError> {
    let mut parsed = ParsedCues::new(SubtitleFormat::Ass);
    let content = normalize_newlines(content);

    let mut current_section = String::new();
    let mut saw_events = false;
    let mut event_format: Vec<String> = Vec::new();

    for (line_num, line) in content.split('\n').enumerate() {
        let line_num = line_num + 1; // 1-indexed for error messages
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        // Section header
        if line.starts_with('[') && line.ends_with(']') {
            current_section = line[1..line.len() - 1].to_lowercase();
            saw_events |= current_section == "events";
            continue;
        }

        // Skip comments (lines starting with ; or !)
        if line.starts_with(';') || line.starts_with('!') {
            continue;
        }

        if current_section != "events" {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Format:") {
            event_format = parse_format_line(rest);
        } else if let Some(rest) = line.strip_prefix("Dialogue:") {
            let index = parsed.next_index();
            parsed.record(parse_dialogue(rest, &event_format, line_num, index));
        }
    }

    if !saw_events && !content.trim().is_empty() {
        return Err(ParseError::MissingSection("[Events]".to_string()));
    }

    Ok(parsed)
}

/// Parse a Format: line to get field names.
fn parse_format_line(fields: &str) -> Vec<String> {
    fields.split(',').map(|s| s.trim().to_lowercase()).collect()
}

/// Parse the body of a Dialogue: line.
fn parse_dialogue(
    content: &str,
    format: &[String],
    line_num: usize,
    index: usize,
) -> Result<Cue, ParseError> {
    let default_format;
    let format = if format.is_empty() {
        default_format = default_event_format();
        default_format.as_slice()
    } else {
        format
    };

    // Text is the last field and may contain commas
    let text_index = format.iter().position(|f| f == "text").unwrap_or(9);
    let parts: Vec<&str> = content.trim_start().splitn(text_index + 1, ',').collect();

    if parts.len() <= text_index {
        return Err(ParseError::invalid_event(
            line_num,
            format!("Expected {} fields, got {}", text_index + 1, parts.len()),
        ));
    }

    let mut start_ms = None;
    let mut end_ms = None;
    for (field_name, value) in format.iter().zip(&parts) {
        let value = value.trim();
        match field_name.as_str() {
            "start" => {
                start_ms = Some(
                    parse_ass_time(value).ok_or_else(|| ParseError::invalid_time(line_num, value))?,
                )
            }
            "end" => {
                end_ms = Some(
                    parse_ass_time(value).ok_or_else(|| ParseError::invalid_time(line_num, value))?,
                )
            }
            _ => {}
        }
    }

    let (Some(start_ms), Some(end_ms)) = (start_ms, end_ms) else {
        return Err(ParseError::MissingTiming { line: line_num });
    };

    let lines = split_text(parts[text_index]);
    if lines.iter().all(|l| l.trim().is_empty()) {
        return Err(ParseError::EmptyText { line: line_num });
    }

    Ok(Cue::new(start_ms, end_ms, lines, index))
}

/// Split ASS event text into lines, reversing the writer's escapes.
///
/// `\N` and `\n` break lines, `\h` becomes a space and `\{`, `\}`, `\\`
/// become literal characters, as does a backslash guarded by a word joiner.
/// Override tags such as `{\i1}` are kept as-is.
fn split_text(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            current.push(c);
            continue;
        }
        match chars.next() {
            Some('N') | Some('n') => lines.push(std::mem::take(&mut current)),
            Some('h') => current.push(' '),
            Some(escaped @ ('{' | '}' | '\\')) => current.push(escaped),
            Some(BACKSLASH_GUARD) => current.push('\\'),
            Some(other) => {
                current.push('\\');
                current.push(other);
            }
            None => current.push('\\'),
        }
    }
    lines.push(current);
    lines
}

/// Parse ASS timestamp format: H:MM:SS.cc
///
/// Returns time in milliseconds.
pub fn parse_ass_time(s: &str) -> Option<u64> {
    let s = s.trim();

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours = parse_component(parts[0])?;
    let minutes = parse_component(parts[1])?;

    // Seconds may have centiseconds or milliseconds after decimal
    let (seconds, fraction) = match parts[2].split_once('.') {
        Some((secs, frac)) => (parse_component(secs)?, fraction_to_ms(frac)?),
        None => (parse_component(parts[2])?, 0),
    };

    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + fraction)
}

/// Default event format for Events section.
fn default_event_format() -> Vec<String> {
    vec![
        "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
