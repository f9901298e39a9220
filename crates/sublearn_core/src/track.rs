//! Track model.
//!
//! A [`Track`] is an ordered cue list tagged with the role it plays in the
//! merged output. Tracks are values: validation reports problems instead of
//! fixing them, and gap normalization returns a new track.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::subtitles::Cue;

/// Role of a track in the merged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Subtitles in the film's original language.
    Original,
    /// Subtitles of the dubbed audio; the timing master.
    Dub,
    /// Translation of the dub into the learner's language.
    Native,
}

impl Role {
    /// All roles in layer order.
    pub const ALL: [Role; 3] = [Role::Original, Role::Dub, Role::Native];

    /// ASS style name used for this role.
    pub fn style_name(&self) -> &'static str {
        match self {
            Self::Original => "Style_Orig",
            Self::Dub => "Style_Dub",
            Self::Native => "Style_Trans",
        }
    }

    /// ASS layer number.
    pub fn layer(&self) -> u32 {
        match self {
            Self::Original => 0,
            Self::Dub => 1,
            Self::Native => 2,
        }
    }

    /// Lowercase name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Dub => "dub",
            Self::Native => "native",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single timing-invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Cue does not satisfy `start < end`.
    InvertedTiming { index: usize, start_ms: u64, end_ms: u64 },
    /// Cue starts before its predecessor.
    OutOfOrder {
        index: usize,
        previous_start_ms: u64,
        start_ms: u64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedTiming {
                index,
                start_ms,
                end_ms,
            } => write!(
                f,
                "cue {} has start {}ms not before end {}ms",
                index, start_ms, end_ms
            ),
            Self::OutOfOrder {
                index,
                previous_start_ms,
                start_ms,
            } => write!(
                f,
                "cue {} starts at {}ms, before previous cue at {}ms",
                index, start_ms, previous_start_ms
            ),
        }
    }
}

/// A track failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{role} track failed validation with {} violation(s); first: {}", .violations.len(), first_violation(.violations))]
pub struct TrackValidationError {
    pub role: Role,
    pub violations: Vec<Violation>,
}

fn first_violation(violations: &[Violation]) -> String {
    violations
        .first()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// An ordered cue sequence with its role and language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub role: Role,
    /// Language code (e.g. "en", "hu").
    pub language: String,
    pub cues: Vec<Cue>,
}

impl Track {
    pub fn new(role: Role, language: impl Into<String>, cues: Vec<Cue>) -> Self {
        Self {
            role,
            language: language.into(),
            cues,
        }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Copy of this track with new cues.
    pub fn with_cues(&self, cues: Vec<Cue>) -> Self {
        Self {
            role: self.role,
            language: self.language.clone(),
            cues,
        }
    }

    /// Copy of this track keeping only the first `len` cues.
    pub fn truncated(&self, len: usize) -> Self {
        self.with_cues(self.cues.iter().take(len).cloned().collect())
    }

    /// List every violation of `start < end` and non-decreasing start order.
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (index, cue) in self.cues.iter().enumerate() {
            if !cue.is_well_formed() {
                violations.push(Violation::InvertedTiming {
                    index,
                    start_ms: cue.start_ms,
                    end_ms: cue.end_ms,
                });
            }
            if index > 0 {
                let previous = &self.cues[index - 1];
                if cue.start_ms < previous.start_ms {
                    violations.push(Violation::OutOfOrder {
                        index,
                        previous_start_ms: previous.start_ms,
                        start_ms: cue.start_ms,
                    });
                }
            }
        }

        violations
    }

    /// Validate timing invariants.
    ///
    /// # Returns
    /// * `Ok(())` - Track is well-formed.
    /// * `Err(TrackValidationError)` - Carries every violation found.
    pub fn validate(&self) -> Result<(), TrackValidationError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(TrackValidationError {
                role: self.role,
                violations,
            })
        }
    }

    /// Enforce a minimum gap between consecutive non-overlapping cues.
    ///
    /// When the gap to the next cue is below `min_gap_ms`, the earlier cue's
    /// end is pulled back, keeping at least 1ms of duration. A run of cues
    /// sharing one interval is retimed as a unit so it still stacks into a
    /// single event. Overlapping neighbours are left untouched. A gap of 0
    /// disables the pass.
    ///
    /// # Returns
    /// The adjusted track and the number of cues whose end changed.
    pub fn normalize_gaps(&self, min_gap_ms: u64) -> (Track, usize) {
        let mut cues = self.cues.clone();
        let mut adjusted = 0;

        if min_gap_ms == 0 {
            return (self.with_cues(cues), adjusted);
        }

        let mut group_start = 0;
        while group_start < cues.len() {
            let (start_ms, end_ms) = (cues[group_start].start_ms, cues[group_start].end_ms);
            let group_end = cues[group_start..]
                .iter()
                .position(|c| c.start_ms != start_ms || c.end_ms != end_ms)
                .map_or(cues.len(), |offset| group_start + offset);

            if let Some(next) = cues.get(group_end) {
                let next_start = next.start_ms;
                if end_ms <= next_start && next_start - end_ms < min_gap_ms {
                    let new_end = next_start.saturating_sub(min_gap_ms).max(start_ms + 1);
                    if new_end < end_ms {
                        for cue in &mut cues[group_start..group_end] {
                            *cue = cue.retimed(start_ms, new_end);
                        }
                        adjusted += group_end - group_start;
                    }
                }
            }

            group_start = group_end;
        }

        (self.with_cues(cues), adjusted)
    }

    /// Build the Native track from translated dub lines.
    ///
    /// Each text takes the timing of the dub cue at the same position. When
    /// the counts differ only the common prefix is used and a
    /// `CountMismatch` diagnostic is returned.
    pub fn translated_from(
        dub: &Track,
        language: impl Into<String>,
        texts: &[String],
    ) -> (Track, Option<Diagnostic>) {
        let count = dub.len().min(texts.len());
        let mismatch = (dub.len() != texts.len()).then(|| {
            Diagnostic::new(
                DiagnosticKind::CountMismatch,
                Some(Role::Native),
                format!(
                    "{} translated lines for {} dub cues; using the first {}",
                    texts.len(),
                    dub.len(),
                    count
                ),
            )
        });

        let cues = dub
            .cues
            .iter()
            .zip(texts)
            .map(|(cue, text)| Cue::from_text(cue.start_ms, cue.end_ms, text, cue.source_index))
            .collect();

        (Track::new(Role::Native, language, cues), mismatch)
    }
}
