use crate::{Correspondence, RankedCandidatePair};

/// Lowe's ratio test.
///
/// A target feature is only trusted when its nearest model feature is
/// substantially closer than the runner-up; ambiguous features are dropped.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RatioFilter {
    /// The best distance must be strictly below this fraction of the second best distance.
    pub ratio_threshold: f64,
}

impl RatioFilter {
    pub fn new(ratio_threshold: f64) -> Self {
        Self { ratio_threshold }
    }

    /// Whether the best candidate of `pair` is distinct enough to keep.
    ///
    /// When the second best distance is `0` nothing can be strictly below it,
    /// so the pair is rejected.
    pub fn accepts(&self, pair: &RankedCandidatePair) -> bool {
        (pair.best.distance as f64) < self.ratio_threshold * pair.second.distance as f64
    }

    /// Keeps the best candidate of every pair that passes the test, in input order.
    pub fn filter(&self, pairs: &[RankedCandidatePair]) -> Vec<Correspondence> {
        pairs
            .iter()
            .filter(|pair| self.accepts(pair))
            .map(|pair| pair.best)
            .collect()
    }
}

impl Default for RatioFilter {
    fn default() -> Self {
        Self {
            ratio_threshold: 0.8,
        }
    }
}
