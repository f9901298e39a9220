//! Subtitle error types.

use std::path::PathBuf;

/// Errors that can occur during subtitle file operations.
#[derive(Debug, thiserror::Error)]
pub enum SubtitleError {
    /// Failed to read subtitle file.
    #[error("Failed to read file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write subtitle file.
    #[error("Failed to write file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Parse error.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

/// Errors that can occur during subtitle parsing.
///
/// Block-level variants are recovered by the parsers and collected in
/// [`ParsedCues::skipped`](super::ParsedCues::skipped). Only `MissingSection`,
/// `EncodingError` and `LowCoverage` abort a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Invalid or malformed time format.
    #[error("Invalid time format at line {line}: '{value}'")]
    InvalidTime { line: usize, value: String },

    /// Block does not start with a numeric index.
    #[error("Invalid cue index at line {line}: '{value}'")]
    InvalidIndex { line: usize, value: String },

    /// Block has no timing line.
    #[error("Missing timing line in block at line {line}")]
    MissingTiming { line: usize },

    /// Block has timing but no text.
    #[error("Cue at line {line} has no text")]
    EmptyText { line: usize },

    /// Invalid event/dialogue line.
    #[error("Invalid event at line {line}: {message}")]
    InvalidEvent { line: usize, message: String },

    /// Missing required section.
    #[error("Missing required section: {0}")]
    MissingSection(String),

    /// Encoding error.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Too few blocks could be parsed.
    #[error("Only {parsed} of {seen} cue blocks could be parsed")]
    LowCoverage { parsed: usize, seen: usize },
}

impl SubtitleError {
    /// Create a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteError {
            path: path.into(),
            source,
        }
    }
}

impl ParseError {
    /// Create an invalid time error.
    pub fn invalid_time(line: usize, value: impl Into<String>) -> Self {
        Self::InvalidTime {
            line,
            value: value.into(),
        }
    }

    /// Create an invalid index error.
    pub fn invalid_index(line: usize, value: impl Into<String>) -> Self {
        Self::InvalidIndex {
            line,
            value: value.into(),
        }
    }

    /// Create an invalid event error.
    pub fn invalid_event(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            line,
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole document.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingSection(_) | Self::EncodingError(_) | Self::LowCoverage { .. }
        )
    }
}
