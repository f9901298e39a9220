//! Subtitle I/O module.
//!
//! Provides cue parsing for the supported source formats and the ASS
//! document writer.
//!
//! # Architecture
//!
//! - **Pure functions** in submodules for business logic
//! - **Recoverable parsing**: malformed blocks are collected, not fatal
//! - **Clean public API** via re-exports
//!
//! # Components
//!
//! - **types**: Core data structures (Cue, AssDocument, Style)
//! - **parsers**: Format-specific parsers (SRT, WebVTT, ASS)
//! - **writers**: ASS document writer
//!
//! # Usage
//!
//! ```ignore
//! use sublearn_core::subtitles::{parse_file, write_file, WriteOptions};
//!
//! let parsed = parse_file("movie.en.srt")?;
//! println!("{} cues, coverage {:.0}%", parsed.cues.len(), parsed.coverage() * 100.0);
//!
//! write_file(&document, "movie.sublearn.ass", &WriteOptions::default())?;
//! ```

mod error;
pub mod parsers;
mod types;
pub mod writers;

use std::fs;
use std::path::Path;

// Re-export core types
pub use types::{
    AssColor, AssDocument, AssEvent, Cue, RoundingMode, ScriptInfo, SubtitleFormat,
    SubtitleStyle, WriteOptions,
};

// Re-export errors
pub use error::{ParseError, SubtitleError};

// Re-export parsers
pub use parsers::{
    decode_source, detect_format, parse_ass, parse_ass_time, parse_bytes, parse_content,
    parse_srt, parse_srt_time, parse_vtt, parse_vtt_time, ParsedCues,
};

// Re-export writers
pub use writers::{format_ass_text, format_ass_time, write_ass};

/// Parse a subtitle file from disk.
///
/// Decodes the bytes (BOM-aware) and picks the parser from the file
/// extension, falling back to content detection.
///
/// # Arguments
/// * `path` - Path to the subtitle file.
///
/// # Returns
/// * `Ok(ParsedCues)` - Parsed cues with per-block diagnostics.
/// * `Err(SubtitleError)` - If reading fails or the document is unusable.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedCues, SubtitleError> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|e| SubtitleError::read(path, e))?;
    let format = SubtitleFormat::from_extension(path);

    Ok(parse_bytes(&bytes, format)?)
}

/// Write an ASS document to a file.
///
/// # Arguments
/// * `doc` - Document to write.
/// * `path` - Output file path.
/// * `options` - Write options (rounding, etc.).
pub fn write_file(
    doc: &AssDocument,
    path: impl AsRef<Path>,
    options: &WriteOptions,
) -> Result<(), SubtitleError> {
    let path = path.as_ref();

    let content = write_ass(doc, options);
    fs::write(path, content).map_err(|e| SubtitleError::write(path, e))?;

    Ok(())
}
