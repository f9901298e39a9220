//! Core subtitle types.
//!
//! All timing values are integer milliseconds. Rounding to centiseconds (ASS)
//! happens only at write time.

use serde::{Deserialize, Serialize};

/// Supported cue source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// SubRip (.srt)
    #[default]
    Srt,
    /// WebVTT (.vtt)
    WebVtt,
    /// Advanced SubStation Alpha (.ass, .ssa)
    Ass,
}

impl SubtitleFormat {
    /// Detect format from file extension.
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "ass" | "ssa" => Some(Self::Ass),
            "srt" => Some(Self::Srt),
            "vtt" => Some(Self::WebVtt),
            _ => None,
        }
    }

    /// Get the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ass => "ass",
            Self::Srt => "srt",
            Self::WebVtt => "vtt",
        }
    }
}

/// One timed text unit of a subtitle track.
///
/// Cues are values: re-timing produces a new cue via [`Cue::retimed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Start time in milliseconds.
    pub start_ms: u64,
    /// End time in milliseconds.
    pub end_ms: u64,
    /// Text lines in display order. Formatting markers are kept as-is.
    pub lines: Vec<String>,
    /// Ordinal of the block this cue came from in its source.
    pub source_index: usize,
}

impl Cue {
    /// Create a cue.
    pub fn new(start_ms: u64, end_ms: u64, lines: Vec<String>, source_index: usize) -> Self {
        Self {
            start_ms,
            end_ms,
            lines,
            source_index,
        }
    }

    /// Create a cue from text, splitting on line breaks.
    pub fn from_text(start_ms: u64, end_ms: u64, text: &str, source_index: usize) -> Self {
        let lines = text.lines().map(str::to_string).collect();
        Self::new(start_ms, end_ms, lines, source_index)
    }

    /// Text with lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Duration in milliseconds (0 for inverted cues).
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Whether `start < end` holds.
    pub fn is_well_formed(&self) -> bool {
        self.start_ms < self.end_ms
    }

    /// Copy of this cue carrying a new interval.
    pub fn retimed(&self, start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end_ms,
            lines: self.lines.clone(),
            source_index: self.source_index,
        }
    }
}

/// ASS color in ABGR format.
///
/// ASS uses &HAABBGGRR format (alpha, blue, green, red).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssColor {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 0 = opaque, 255 = transparent).
    pub a: u8,
}

impl Default for AssColor {
    fn default() -> Self {
        Self::from_rgb(255, 255, 255) // White, opaque
    }
}

impl AssColor {
    /// Create from RGB values (alpha = 0, opaque).
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0 }
    }

    /// Create from RGBA values.
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse from ASS color string (&HAABBGGRR or &HBBGGRR).
    pub fn from_ass_string(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('&').trim_start_matches(['H', 'h']);
        let s = s.trim_end_matches('&');
        if s.is_empty() || s.len() > 8 {
            return None;
        }
        let value = u32::from_str_radix(s, 16).ok()?;

        let a = if s.len() <= 6 {
            0
        } else {
            ((value >> 24) & 0xFF) as u8
        };

        Some(Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
            a,
        })
    }

    /// Convert to ASS color string (&HAABBGGRR).
    pub fn to_ass_string(&self) -> String {
        format!(
            "&H{:02X}{:02X}{:02X}{:02X}",
            self.a, self.b, self.g, self.r
        )
    }
}

impl TryFrom<String> for AssColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_ass_string(&value).ok_or_else(|| format!("invalid ASS color '{}'", value))
    }
}

impl From<AssColor> for String {
    fn from(color: AssColor) -> Self {
        color.to_ass_string()
    }
}

/// ASS style definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleStyle {
    /// Style name (required).
    pub name: String,
    /// Font name.
    pub fontname: String,
    /// Font size.
    pub fontsize: f64,
    /// Primary color.
    pub primary_color: AssColor,
    /// Secondary color.
    pub secondary_color: AssColor,
    /// Outline color.
    pub outline_color: AssColor,
    /// Back/shadow color.
    pub back_color: AssColor,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    /// Horizontal scale (100 = normal).
    pub scale_x: f64,
    /// Vertical scale (100 = normal).
    pub scale_y: f64,
    /// Spacing between characters.
    pub spacing: f64,
    /// Rotation angle in degrees.
    pub angle: f64,
    /// Border style (1 = outline + shadow, 3 = opaque box).
    pub border_style: i32,
    /// Outline width.
    pub outline: f64,
    /// Shadow depth.
    pub shadow: f64,
    /// Alignment (numpad style: 1-9).
    pub alignment: i32,
    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
    /// Encoding (0 = ANSI, 1 = default, etc.).
    pub encoding: i32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            fontname: "Arial".to_string(),
            fontsize: 20.0,
            primary_color: AssColor::from_rgb(255, 255, 255), // White
            secondary_color: AssColor::from_rgb(255, 0, 0),   // Red
            outline_color: AssColor::from_rgb(0, 0, 0),       // Black
            back_color: AssColor::from_rgb(0, 0, 0),          // Black
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 2.0,
            alignment: 2, // Bottom center
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 1,
        }
    }
}

/// `[Script Info]` values of a written document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInfo {
    pub title: String,
    pub play_res_x: Option<u32>,
    pub play_res_y: Option<u32>,
    /// Line wrapping mode (0-3).
    pub wrap_style: u8,
    pub scaled_border_and_shadow: bool,
}

impl Default for ScriptInfo {
    fn default() -> Self {
        Self {
            title: "Default Aegisub file".to_string(),
            play_res_x: None,
            play_res_y: None,
            wrap_style: 0,
            scaled_border_and_shadow: true,
        }
    }
}

/// One `Dialogue:` line of a written document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssEvent {
    pub layer: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Name of a style in the document's style list.
    pub style: String,
    /// Plain text lines; escaping happens at write time.
    pub lines: Vec<String>,
}

/// A complete ASS document ready for serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssDocument {
    pub info: ScriptInfo,
    pub styles: Vec<SubtitleStyle>,
    pub events: Vec<AssEvent>,
}

/// Rounding mode for time values when writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Round down (floor) - most conservative, may cut off start.
    Floor,
    /// Round to nearest - balanced approach.
    #[default]
    Round,
    /// Round up (ceil) - ensures subtitle appears, may show early.
    Ceil,
}

impl RoundingMode {
    /// Round a millisecond value to whole centiseconds.
    pub fn to_centiseconds(&self, ms: u64) -> u64 {
        let whole = ms / 10;
        let rem = ms % 10;
        match self {
            Self::Floor => whole,
            Self::Round => whole + u64::from(rem >= 5),
            Self::Ceil => whole + u64::from(rem > 0),
        }
    }
}

/// Options for writing the merged document.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Rounding mode for time values.
    pub rounding: RoundingMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_format_detection() {
        use std::path::Path;
        assert_eq!(
            SubtitleFormat::from_extension(Path::new("test.ass")),
            Some(SubtitleFormat::Ass)
        );
        assert_eq!(
            SubtitleFormat::from_extension(Path::new("movie.hu.SRT")),
            Some(SubtitleFormat::Srt)
        );
        assert_eq!(
            SubtitleFormat::from_extension(Path::new("test.vtt")),
            Some(SubtitleFormat::WebVtt)
        );
        assert_eq!(SubtitleFormat::from_extension(Path::new("test.txt")), None);
    }

    #[test]
    fn test_ass_color_parsing() {
        let color = AssColor::from_ass_string("&H00FFFFFF").unwrap();
        assert_eq!(color, AssColor::from_rgb(255, 255, 255));

        // BGR order: 00FFFF is yellow
        let color = AssColor::from_ass_string("&H0000FFFF").unwrap();
        assert_eq!(color, AssColor::from_rgb(255, 255, 0));

        let original = AssColor::from_rgba(255, 128, 64, 32);
        let parsed = AssColor::from_ass_string(&original.to_ass_string()).unwrap();
        assert_eq!(original, parsed);

        assert!(AssColor::from_ass_string("&Hnothex").is_none());
        assert!(AssColor::from_ass_string("").is_none());
    }

    #[test]
    fn test_cue_retimed_keeps_text_and_index() {
        let cue = Cue::from_text(0, 2000, "Hello\nthere", 7);
        let moved = cue.retimed(100, 2100);
        assert_eq!(moved.lines, vec!["Hello", "there"]);
        assert_eq!(moved.source_index, 7);
        assert_eq!((moved.start_ms, moved.end_ms), (100, 2100));
        // Original untouched
        assert_eq!(cue.start_ms, 0);
    }

    #[test]
    fn test_rounding_modes() {
        assert_eq!(RoundingMode::Floor.to_centiseconds(1234), 123);
        assert_eq!(RoundingMode::Round.to_centiseconds(1234), 123);
        assert_eq!(RoundingMode::Round.to_centiseconds(1235), 124);
        assert_eq!(RoundingMode::Ceil.to_centiseconds(1231), 124);
        assert_eq!(RoundingMode::Ceil.to_centiseconds(1230), 123);
    }
}
