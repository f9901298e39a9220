//! Similarity-matched alignment.
//!
//! Monotone dynamic time warping between source cues and master cues. The
//! local cost of pairing source cue `i` with master cue `j` is
//!
//! ```text
//! cost(i, j) = (1 - jaccard(words_i, words_j)) + w * |i/(n-1) - j/(m-1)|
//! ```
//!
//! where the master side's words come from the configured reference texts
//! (one per master cue) or from the master cues themselves. After the
//! optimal warping path is found, each source cue takes the master cell on
//! the path with the lowest local cost. Path monotonicity keeps the result
//! ordered.

use std::collections::HashSet;

use super::{cadence_confidence, AlignConfig, AlignError, AlignStrategy, Aligner, AlignmentMap};
use crate::track::Track;

/// Text-similarity DTW mapping.
pub struct SimilarityMatched;

impl Aligner for SimilarityMatched {
    fn name(&self) -> &str {
        "similarity-matched"
    }

    fn description(&self) -> &str {
        "Retime onto the dub by text similarity warping"
    }

    fn strategy(&self) -> AlignStrategy {
        AlignStrategy::SimilarityMatched
    }

    fn build_map(
        &self,
        master: &Track,
        source: &Track,
        config: &AlignConfig,
    ) -> Result<AlignmentMap, AlignError> {
        if master.is_empty() {
            return Err(AlignError::NoTimingMaster);
        }
        if source.is_empty() {
            return Ok(AlignmentMap::from_master_indices(master, &[]));
        }

        let source_words: Vec<HashSet<String>> =
            source.cues.iter().map(|c| word_set(&c.text())).collect();
        let master_words: Vec<HashSet<String>> = match &config.reference {
            Some(reference) if reference.len() == master.len() => {
                reference.iter().map(|t| word_set(t)).collect()
            }
            Some(reference) => {
                tracing::warn!(
                    "Reference has {} texts for {} master cues, comparing against master text",
                    reference.len(),
                    master.len()
                );
                master.cues.iter().map(|c| word_set(&c.text())).collect()
            }
            None => master.cues.iter().map(|c| word_set(&c.text())).collect(),
        };

        let cost = cost_matrix(&source_words, &master_words, config.position_weight);
        let path = warping_path(&cost);

        // Best master cell per source row along the path
        let mut best: Vec<Option<(usize, f64)>> = vec![None; source.len()];
        for &(i, j) in &path {
            let c = cost[i][j];
            match best[i] {
                Some((_, current)) if current <= c => {}
                _ => best[i] = Some((j, c)),
            }
        }
        let indices: Vec<usize> = best
            .into_iter()
            .map(|cell| cell.map(|(j, _)| j).unwrap_or(0))
            .collect();

        Ok(AlignmentMap::from_master_indices(master, &indices))
    }

    fn assess(&self, master: &Track, source: &Track, config: &AlignConfig) -> Option<String> {
        cadence_confidence(master, source, config.low_confidence_ratio)
    }
}

/// Jaccard similarity of the word sets of two texts (0.0 - 1.0).
pub fn text_similarity(a: &str, b: &str) -> f64 {
    jaccard(&word_set(a), &word_set(b))
}

/// Lowercased alphanumeric words.
fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn relative_position(index: usize, len: usize) -> f64 {
    if len <= 1 {
        0.0
    } else {
        index as f64 / (len - 1) as f64
    }
}

fn cost_matrix(
    source: &[HashSet<String>],
    master: &[HashSet<String>],
    position_weight: f64,
) -> Vec<Vec<f64>> {
    let n = source.len();
    let m = master.len();

    source
        .iter()
        .enumerate()
        .map(|(i, words_i)| {
            let p = relative_position(i, n);
            master
                .iter()
                .enumerate()
                .map(|(j, words_j)| {
                    let q = relative_position(j, m);
                    (1.0 - jaccard(words_i, words_j)) + position_weight * (p - q).abs()
                })
                .collect()
        })
        .collect()
}

/// Optimal monotone warping path through a local cost matrix.
fn warping_path(cost: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let n = cost.len();
    let m = cost.first().map_or(0, Vec::len);

    if n == 0 || m == 0 {
        return vec![];
    }

    // Accumulated cost
    let mut d = vec![vec![f64::INFINITY; m]; n];
    d[0][0] = cost[0][0];

    for i in 1..n {
        d[i][0] = d[i - 1][0] + cost[i][0];
    }
    for j in 1..m {
        d[0][j] = d[0][j - 1] + cost[0][j];
    }
    for i in 1..n {
        for j in 1..m {
            d[i][j] = cost[i][j] + d[i - 1][j].min(d[i][j - 1]).min(d[i - 1][j - 1]);
        }
    }

    // Backtrack
    let mut path = Vec::new();
    let mut i = n - 1;
    let mut j = m - 1;
    path.push((i, j));

    while i > 0 || j > 0 {
        if i == 0 {
            j -= 1;
        } else if j == 0 {
            i -= 1;
        } else {
            let diag = d[i - 1][j - 1];
            let left = d[i][j - 1];
            let up = d[i - 1][j];

            if diag <= left && diag <= up {
                i -= 1;
                j -= 1;
            } else if left <= up {
                j -= 1;
            } else {
                i -= 1;
            }
        }
        path.push((i, j));
    }

    path.reverse();
    path
}
