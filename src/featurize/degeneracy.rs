//! Rejection of conformers with coinciding atoms.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneracyPolicy {
    /// Reject when fewer distinct position rows than atoms exist.
    UniquePositions,
    /// Reject unless every off-diagonal Euclidean distance is `> 0`; NaN distances reject.
    #[default]
    PairwiseDistance,
}

impl fmt::Display for DegeneracyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegeneracyPolicy::UniquePositions => write!(f, "unique_positions"),
            DegeneracyPolicy::PairwiseDistance => write!(f, "pairwise_distance"),
        }
    }
}

impl DegeneracyPolicy {
    pub fn is_degenerate(&self, positions: &[[f32; 3]]) -> bool {
        match self {
            DegeneracyPolicy::UniquePositions => unique_rows(positions) < positions.len(),
            DegeneracyPolicy::PairwiseDistance => find_overlap(positions).is_some(),
        }
    }
}

fn unique_rows(positions: &[[f32; 3]]) -> usize {
    // Adding 0.0 folds -0.0 into 0.0 so the bit patterns compare like the values.
    let mut keys: Vec<[u32; 3]> = positions
        .iter()
        .map(|p| [(p[0] + 0.0).to_bits(), (p[1] + 0.0).to_bits(), (p[2] + 0.0).to_bits()])
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}

fn distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Returns the first pair `(i, j)`, `i < j`, whose distance is not positive.
///
/// A NaN distance (from NaN coordinates, or two infinities on one axis) counts as overlapping.
pub fn find_overlap(positions: &[[f32; 3]]) -> Option<(usize, usize)> {
    for i in 0..positions.len() {
        for j in i + 1..positions.len() {
            let d = distance(&positions[i], &positions[j]);
            if d.is_nan() || d <= 0.0 {
                return Some((i, j));
            }
        }
    }
    None
}
