//! Pass-through alignment.
//!
//! Used when both tracks already share the video's timing origin, e.g. both
//! were found by exact content hash. No cue is re-timed.

use super::{AlignConfig, AlignError, AlignStrategy, Aligner, AlignmentMap};
use crate::track::Track;

/// Keeps every timing unchanged.
pub struct PassThrough;

impl Aligner for PassThrough {
    fn name(&self) -> &str {
        "pass-through"
    }

    fn description(&self) -> &str {
        "Keep original timings of both tracks"
    }

    fn strategy(&self) -> AlignStrategy {
        AlignStrategy::PassThrough
    }

    fn build_map(
        &self,
        _master: &Track,
        source: &Track,
        _config: &AlignConfig,
    ) -> Result<AlignmentMap, AlignError> {
        Ok(AlignmentMap::identity(source))
    }
}
