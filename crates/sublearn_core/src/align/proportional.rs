//! Proportional cadence alignment.
//!
//! The Dub track is the timing master. Source cue `i` takes the interval of
//! master cue `i` when both tracks have the same number of cues, otherwise
//! the master cue nearest the same relative position:
//!
//! ```text
//! p = i / (N_src - 1)
//! j = round(p * (N_master - 1))      // half rounds up
//! ```
//!
//! Several source cues may land on the same master cue (one release splits
//! a line the other doesn't); they then share its interval and are stacked
//! by the compositor.

use super::{cadence_confidence, AlignConfig, AlignError, AlignStrategy, Aligner, AlignmentMap};
use crate::track::Track;

/// Index / proportional-position cadence mapping.
pub struct ProportionalCadence;

impl Aligner for ProportionalCadence {
    fn name(&self) -> &str {
        "proportional-cadence"
    }

    fn description(&self) -> &str {
        "Retime onto the dub by index or proportional position"
    }

    fn strategy(&self) -> AlignStrategy {
        AlignStrategy::ProportionalCadence
    }

    fn build_map(
        &self,
        master: &Track,
        source: &Track,
        _config: &AlignConfig,
    ) -> Result<AlignmentMap, AlignError> {
        if master.is_empty() {
            return Err(AlignError::NoTimingMaster);
        }

        let indices: Vec<usize> = (0..source.len())
            .map(|i| proportional_index(i, source.len(), master.len()))
            .collect();

        Ok(AlignmentMap::from_master_indices(master, &indices))
    }

    fn assess(&self, master: &Track, source: &Track, config: &AlignConfig) -> Option<String> {
        cadence_confidence(master, source, config.low_confidence_ratio)
    }
}

/// Master index for source cue `index` of `source_len`.
///
/// Integer form of `floor(index * (master_len - 1) / (source_len - 1) + 1/2)`.
/// Non-decreasing in `index`.
pub fn proportional_index(index: usize, source_len: usize, master_len: usize) -> usize {
    if source_len == master_len {
        return index;
    }
    if source_len <= 1 || master_len <= 1 {
        return 0;
    }

    let span_src = source_len - 1;
    let span_master = master_len - 1;
    (2 * index * span_master + span_src) / (2 * span_src)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::track::Role;

    #[test]
    fn test_equal_counts_map_index_to_index() {
        for i in 0..8 {
            assert_eq!(proportional_index(i, 8, 8), i);
        }
    }

    #[test]
    fn test_ten_master_five_source() {
        // Source position 0.5 of 4 lands on master position 0.5 of 9 → 4.5 → 5
        assert_eq!(proportional_index(2, 5, 10), 5);
        let all: Vec<usize> = (0..5).map(|i| proportional_index(i, 5, 10)).collect();
        assert_eq!(all, vec![0, 2, 5, 7, 9]);
    }

    #[test]
    fn test_compression_shares_master_cues() {
        let all: Vec<usize> = (0..6).map(|i| proportional_index(i, 6, 3)).collect();
        assert_eq!(all, vec![0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_single_source_cue() {
        assert_eq!(proportional_index(0, 1, 10), 0);
    }

    #[test]
    fn test_scenario_retimes_onto_dub() {
        let original = track(Role::Original, &[(0, 2000, "Hello"), (2000, 4000, "World")]);
        let dub = track(Role::Dub, &[(100, 2100, "Szia"), (2300, 4300, "Világ")]);

        let result = ProportionalCadence
            .align(&dub, &original, &AlignConfig::default())
            .unwrap();

        let timings: Vec<(u64, u64)> = result
            .track
            .cues
            .iter()
            .map(|c| (c.start_ms, c.end_ms))
            .collect();
        assert_eq!(timings, vec![(100, 2100), (2300, 4300)]);
        assert_eq!(result.track.cues[0].lines, vec!["Hello"]);
        assert_eq!(result.track.role, Role::Original);
    }

    #[test]
    fn test_ten_master_five_source_timings() {
        let master = even_track(Role::Dub, 10, 1000, 900);
        let source = even_track(Role::Original, 5, 3000, 2000);

        let result = ProportionalCadence
            .align(&master, &source, &AlignConfig::default())
            .unwrap();

        assert_eq!(result.track.len(), 5);
        assert_eq!(result.track.cues[2].start_ms, master.cues[5].start_ms);
        assert_eq!(result.track.cues[2].end_ms, master.cues[5].end_ms);
    }

    #[test]
    fn test_empty_master_fails() {
        let master = track(Role::Dub, &[]);
        let source = track(Role::Original, &[(0, 1000, "a")]);
        let err = ProportionalCadence
            .align(&master, &source, &AlignConfig::default())
            .unwrap_err();
        assert_eq!(err, AlignError::NoTimingMaster);
    }

    #[test]
    fn test_low_confidence_when_source_much_longer() {
        let master = even_track(Role::Dub, 3, 1000, 900);
        let source = even_track(Role::Original, 7, 400, 300);

        let result = ProportionalCadence
            .align(&master, &source, &AlignConfig::default())
            .unwrap();
        assert_eq!(result.track.len(), 7);
        assert!(result.low_confidence.is_some());

        let source = even_track(Role::Original, 6, 400, 300);
        let result = ProportionalCadence
            .align(&master, &source, &AlignConfig::default())
            .unwrap();
        assert!(result.low_confidence.is_none());
    }
}
