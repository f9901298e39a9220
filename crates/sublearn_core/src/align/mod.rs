//! Track alignment.
//!
//! Re-times a source track onto a timing master (the Dub track).
//!
//! # Architecture
//!
//! Strategies implement the `Aligner` trait and are created via
//! [`create_aligner`]. Each strategy only builds an [`AlignmentMap`]
//! (source cue index to new interval); validation of the master, applying
//! the map and the confidence check are shared by the provided
//! [`Aligner::align`].
//!
//! # Available Strategies
//!
//! - **PassThrough**: Both tracks share a timing origin; timings are kept.
//! - **ProportionalCadence**: Index-to-index when counts match, otherwise
//!   proportional position mapping.
//! - **SimilarityMatched**: Monotone dynamic time warping over text
//!   similarity plus a positional prior.

mod pass_through;
mod proportional;
mod similarity;

pub use pass_through::PassThrough;
pub use proportional::{proportional_index, ProportionalCadence};
pub use similarity::{text_similarity, SimilarityMatched};

use serde::{Deserialize, Serialize};

use crate::subtitles::Cue;
use crate::track::{Track, TrackValidationError};

/// Alignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignStrategy {
    /// Keep all timings unchanged.
    PassThrough,
    /// Dub cadence, index or proportional-position mapping.
    ProportionalCadence,
    /// Dub cadence, text-similarity DTW mapping.
    SimilarityMatched,
}

impl AlignStrategy {
    /// Get the display name for this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PassThrough => "pass-through",
            Self::ProportionalCadence => "proportional-cadence",
            Self::SimilarityMatched => "similarity-matched",
        }
    }

    /// Get a description of this strategy.
    pub fn description(&self) -> &'static str {
        match self {
            Self::PassThrough => "Keep original timings of both tracks",
            Self::ProportionalCadence => "Retime onto the dub by index or proportional position",
            Self::SimilarityMatched => "Retime onto the dub by text similarity warping",
        }
    }
}

/// Strategy selection as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignMode {
    /// Choose from the provenance of the inputs.
    #[default]
    Auto,
    PassThrough,
    ProportionalCadence,
    SimilarityMatched,
}

impl AlignMode {
    /// Resolve to a concrete strategy for one pair of inputs.
    pub fn resolve(&self, original: Provenance, dub: Provenance) -> AlignStrategy {
        match self {
            Self::Auto => select_strategy(original, dub),
            Self::PassThrough => AlignStrategy::PassThrough,
            Self::ProportionalCadence => AlignStrategy::ProportionalCadence,
            Self::SimilarityMatched => AlignStrategy::SimilarityMatched,
        }
    }
}

/// How a subtitle track was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Found by exact video content hash.
    HashMatched,
    /// Found by title search; may belong to another release.
    TitleSearched,
    /// Transcribed from the video's own audio.
    Transcribed,
}

impl Provenance {
    /// Whether the track's timings are known to match the video.
    pub fn is_anchored(&self) -> bool {
        matches!(self, Self::HashMatched | Self::Transcribed)
    }
}

/// Pick the strategy for a pair of input provenances.
///
/// Pass-through only when both tracks are anchored to the same video,
/// otherwise the Original is retimed onto the Dub's cadence.
pub fn select_strategy(original: Provenance, dub: Provenance) -> AlignStrategy {
    if original.is_anchored() && dub.is_anchored() {
        AlignStrategy::PassThrough
    } else {
        AlignStrategy::ProportionalCadence
    }
}

/// Errors that can occur during alignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlignError {
    /// The timing master has no cues.
    #[error("No timing master: dub track is empty")]
    NoTimingMaster,

    /// The timing master violates timing invariants.
    #[error("Invalid timing master: {0}")]
    InvalidMaster(#[from] TrackValidationError),
}

/// Configuration for one alignment pass.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    /// Source/master count ratio above which the result is low-confidence.
    pub low_confidence_ratio: f64,
    /// Weight of the positional prior in similarity matching.
    pub position_weight: f64,
    /// Comparison text per master cue for similarity matching.
    pub reference: Option<Vec<String>>,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            low_confidence_ratio: 2.0,
            position_weight: 0.5,
            reference: None,
        }
    }
}

impl AlignConfig {
    /// Attach reference texts for the master side.
    pub fn with_reference(mut self, reference: Vec<String>) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// New interval for every source cue index.
///
/// Built and consumed within a single [`Aligner::align`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentMap {
    spans: Vec<(u64, u64)>,
}

impl AlignmentMap {
    /// Map that keeps every cue's own timing.
    pub fn identity(source: &Track) -> Self {
        Self {
            spans: source.cues.iter().map(|c| (c.start_ms, c.end_ms)).collect(),
        }
    }

    /// Map each source index to the interval of a master cue.
    pub fn from_master_indices(master: &Track, indices: &[usize]) -> Self {
        Self {
            spans: indices
                .iter()
                .map(|&j| {
                    let cue = &master.cues[j.min(master.len().saturating_sub(1))];
                    (cue.start_ms, cue.end_ms)
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Interval for a source cue.
    pub fn get(&self, index: usize) -> Option<(u64, u64)> {
        self.spans.get(index).copied()
    }

    /// Produce re-timed copies of the source cues.
    ///
    /// Cues without an entry keep their own timing.
    pub fn apply(&self, source: &Track) -> Track {
        let cues: Vec<Cue> = source
            .cues
            .iter()
            .enumerate()
            .map(|(i, cue)| match self.get(i) {
                Some((start, end)) => cue.retimed(start, end),
                None => cue.clone(),
            })
            .collect();
        source.with_cues(cues)
    }
}

/// Result of an alignment pass.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// The re-timed source track.
    pub track: Track,
    pub strategy: AlignStrategy,
    /// Summary message.
    pub summary: String,
    /// Reason the mapping should be reviewed, if any.
    pub low_confidence: Option<String>,
}

/// Trait for alignment strategies.
///
/// Implementations are stateless; the same instance may align many file
/// pairs concurrently.
pub trait Aligner: Send + Sync {
    /// Get the name of this strategy.
    fn name(&self) -> &str;

    /// Get a description of this strategy.
    fn description(&self) -> &str;

    /// Strategy identifier.
    fn strategy(&self) -> AlignStrategy;

    /// Build the source-index to interval map.
    ///
    /// # Arguments
    /// * `master` - Validated timing master (Dub).
    /// * `source` - Track to re-time (Original).
    /// * `config` - Alignment configuration.
    fn build_map(
        &self,
        master: &Track,
        source: &Track,
        config: &AlignConfig,
    ) -> Result<AlignmentMap, AlignError>;

    /// Check whether the mapping should be flagged for review.
    fn assess(&self, _master: &Track, _source: &Track, _config: &AlignConfig) -> Option<String> {
        None
    }

    /// Align `source` onto `master`.
    ///
    /// # Returns
    /// * `Ok(Alignment)` - Re-timed copy of `source`; inputs are not modified.
    /// * `Err(AlignError)` - Master is invalid or (for cadence strategies) empty.
    fn align(
        &self,
        master: &Track,
        source: &Track,
        config: &AlignConfig,
    ) -> Result<Alignment, AlignError> {
        master.validate()?;

        let map = self.build_map(master, source, config)?;
        let track = map.apply(source);
        let low_confidence = self.assess(master, source, config);

        let summary = format!(
            "{}: {} {} cues aligned onto {} {} cues",
            self.name(),
            track.len(),
            source.role,
            master.len(),
            master.role
        );
        tracing::debug!("{}", summary);

        Ok(Alignment {
            track,
            strategy: self.strategy(),
            summary,
            low_confidence,
        })
    }
}

/// Create an aligner from its strategy.
pub fn create_aligner(strategy: AlignStrategy) -> Box<dyn Aligner> {
    match strategy {
        AlignStrategy::PassThrough => Box::new(PassThrough),
        AlignStrategy::ProportionalCadence => Box::new(ProportionalCadence),
        AlignStrategy::SimilarityMatched => Box::new(SimilarityMatched),
    }
}

/// Low-confidence check shared by the cadence strategies.
pub(crate) fn cadence_confidence(master: &Track, source: &Track, ratio: f64) -> Option<String> {
    let limit = ratio * master.len() as f64;
    (source.len() as f64 > limit).then(|| {
        format!(
            "{} {} cues for {} {} cues exceeds ratio {}",
            source.len(),
            source.role,
            master.len(),
            master.role,
            ratio
        )
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::subtitles::Cue;
    use crate::track::{Role, Track};

    pub fn track(role: Role, cues: &[(u64, u64, &str)]) -> Track {
        let cues = cues
            .iter()
            .enumerate()
            .map(|(i, &(s, e, text))| Cue::from_text(s, e, text, i))
            .collect();
        Track::new(role, "xx", cues)
    }

    /// `n` cues of `len_ms`, one every `step_ms`.
    pub fn even_track(role: Role, n: usize, step_ms: u64, len_ms: u64) -> Track {
        let cues = (0..n)
            .map(|i| {
                let start = i as u64 * step_ms;
                Cue::from_text(start, start + len_ms, &format!("line {}", i), i)
            })
            .collect();
        Track::new(role, "xx", cues)
    }
}
