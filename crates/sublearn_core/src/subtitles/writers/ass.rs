//! ASS subtitle writer.
//!
//! Serializes an [`AssDocument`] to Advanced SubStation Alpha text.
//!
//! # Timing Precision
//!
//! ASS uses centisecond timing (H:MM:SS.cc). Millisecond cue times are
//! rounded according to the configured RoundingMode at write time.
//!
//! # Determinism
//!
//! Output depends only on the document and options: sections, styles and
//! events are written in the order given, with no generated timestamps.

use crate::subtitles::types::{AssDocument, AssEvent, RoundingMode, SubtitleStyle, WriteOptions};

/// V4+ style field order.
const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

/// Events field order.
const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Write an AssDocument to ASS format string.
///
/// # Arguments
/// * `doc` - The document to write.
/// * `options` - Write options (rounding mode).
///
/// # Returns
/// The ASS file content as a string.
pub fn write_ass(doc: &AssDocument, options: &WriteOptions) -> String {
    let mut output = String::new();

    // Script Info
    output.push_str("[Script Info]\n");
    output.push_str("; Script generated by sublearn\n");
    output.push_str(&format!("Title: {}\n", sanitize_field(&doc.info.title)));
    output.push_str("ScriptType: v4.00+\n");
    output.push_str(&format!("WrapStyle: {}\n", doc.info.wrap_style));
    output.push_str(&format!(
        "ScaledBorderAndShadow: {}\n",
        if doc.info.scaled_border_and_shadow {
            "yes"
        } else {
            "no"
        }
    ));
    if let Some(x) = doc.info.play_res_x {
        output.push_str(&format!("PlayResX: {}\n", x));
    }
    if let Some(y) = doc.info.play_res_y {
        output.push_str(&format!("PlayResY: {}\n", y));
    }
    output.push('\n');

    // Styles
    output.push_str("[V4+ Styles]\n");
    output.push_str(STYLE_FORMAT);
    output.push('\n');
    for style in &doc.styles {
        output.push_str(&style_line(style));
        output.push('\n');
    }
    output.push('\n');

    // Events
    output.push_str("[Events]\n");
    output.push_str(EVENT_FORMAT);
    output.push('\n');
    for event in &doc.events {
        output.push_str(&dialogue_line(event, options.rounding));
        output.push('\n');
    }

    output
}

/// Format one `Style:` line.
fn style_line(style: &SubtitleStyle) -> String {
    format!(
        "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        sanitize_field(&style.name),
        sanitize_field(&style.fontname),
        format_number(style.fontsize),
        style.primary_color.to_ass_string(),
        style.secondary_color.to_ass_string(),
        style.outline_color.to_ass_string(),
        style.back_color.to_ass_string(),
        ass_bool(style.bold),
        ass_bool(style.italic),
        ass_bool(style.underline),
        ass_bool(style.strikeout),
        format_number(style.scale_x),
        format_number(style.scale_y),
        format_number(style.spacing),
        format_number(style.angle),
        style.border_style,
        format_number(style.outline),
        format_number(style.shadow),
        style.alignment,
        style.margin_l,
        style.margin_r,
        style.margin_v,
        style.encoding,
    )
}

/// Format one `Dialogue:` line.
fn dialogue_line(event: &AssEvent, rounding: RoundingMode) -> String {
    let text: Vec<String> = event.lines.iter().map(|l| format_ass_text(l)).collect();
    format!(
        "Dialogue: {},{},{},{},,0,0,0,,{}",
        event.layer,
        format_ass_time(event.start_ms, rounding),
        format_ass_time(event.end_ms, rounding),
        sanitize_field(&event.style),
        text.join("\\N")
    )
}

/// Format milliseconds as ASS timestamp (H:MM:SS.cc).
///
/// Applies rounding mode to convert milliseconds to centiseconds.
pub fn format_ass_time(ms: u64, rounding: RoundingMode) -> String {
    let cs = rounding.to_centiseconds(ms);

    let centis = cs % 100;
    let total_secs = cs / 100;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{}:{:02}:{:02}.{:02}", hours, mins, secs, centis)
}

/// Word joiner written after a literal backslash so renderers do not read
/// it as the start of an escape such as `\N`.
pub(crate) const BACKSLASH_GUARD: char = '\u{2060}';

/// Convert cue text to ASS event text.
///
/// Override blocks such as `{\i1}` are copied unchanged, and the SubRip and
/// WebVTT tags `<i>`, `<b>`, `<u>` and `<s>` become their ASS overrides.
/// Other WebVTT and HTML markup (`<v Name>`, `<c.yellow>`, `<font ..>`, cue
/// timestamps) is dropped. Stray braces are escaped and literal backslashes
/// are guarded. Embedded newlines become `\N`, tabs become spaces and any
/// other control character is dropped.
pub fn format_ass_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c == '{' {
            if let Some(block) = override_block(rest) {
                out.push_str(block);
                rest = &rest[block.len()..];
                continue;
            }
        }
        if c == '<' {
            if let Some((len, replacement)) = markup_tag(rest) {
                out.push_str(replacement);
                rest = &rest[len..];
                continue;
            }
        }

        match c {
            '\\' => {
                out.push('\\');
                out.push(BACKSLASH_GUARD);
            }
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\N"),
            '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// `{\...}` override block at the start of `text`.
fn override_block(text: &str) -> Option<&str> {
    if !text.starts_with("{\\") {
        return None;
    }
    let end = text.find('}')?;
    let block = &text[..=end];
    (!block[1..].contains(['{', '\n'])).then_some(block)
}

/// Markup tag at the start of `text`: its byte length and ASS replacement.
fn markup_tag(text: &str) -> Option<(usize, &'static str)> {
    let end = text.find('>')?;
    let inner = &text[1..end];
    if inner.is_empty() || inner.contains(['<', '\n']) {
        return None;
    }

    let (closing, name) = match inner.strip_prefix('/') {
        Some(name) => (true, name),
        None => (false, inner),
    };
    let replacement = match (name.to_ascii_lowercase().as_str(), closing) {
        ("i", false) => "{\\i1}",
        ("i", true) => "{\\i0}",
        ("b", false) => "{\\b1}",
        ("b", true) => "{\\b0}",
        ("u", false) => "{\\u1}",
        ("u", true) => "{\\u0}",
        ("s", false) => "{\\s1}",
        ("s", true) => "{\\s0}",
        _ if is_dropped_tag(name) => "",
        _ => return None,
    };
    Some((end + 1, replacement))
}

fn is_dropped_tag(name: &str) -> bool {
    let tag = name
        .split(|c: char| c == '.' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    let is_timestamp = name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_digit() || c == ':' || c == '.');

    is_timestamp
        || matches!(
            tag.to_ascii_lowercase().as_str(),
            "font" | "c" | "v" | "lang" | "ruby" | "rt"
        )
}

/// Strip characters that would break a comma-separated header field.
fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() && *c != ',')
        .collect()
}

fn ass_bool(value: bool) -> i32 {
    if value {
        -1
    } else {
        0
    }
}

/// Render a number without trailing zeros (`20`, `0.5`).
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
