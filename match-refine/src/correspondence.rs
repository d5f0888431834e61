use derive_more::Constructor;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A candidate pairing of a target feature with a model feature.
///
/// `target` and `model` index into the keypoint (and descriptor) arrays of the
/// target and model images respectively. `distance` is the Hamming distance
/// between the two descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Constructor)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CandidateMatch {
    pub target: usize,
    pub model: usize,
    pub distance: u32,
}

/// A candidate that survived a filter stage.
///
/// Before duplicate resolution the `target` indices of a correspondence set
/// are unique; afterwards the `model` indices are unique as well.
pub type Correspondence = CandidateMatch;

/// The two nearest model features of one target feature.
///
/// `best.distance <= second.distance` is expected by the ratio test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RankedCandidatePair {
    pub best: CandidateMatch,
    pub second: CandidateMatch,
}

impl RankedCandidatePair {
    /// Ranks two candidates by ascending distance.
    ///
    /// On a tie `a` is treated as the best candidate.
    pub fn new(a: CandidateMatch, b: CandidateMatch) -> Self {
        if b.distance < a.distance {
            Self { best: b, second: a }
        } else {
            Self { best: a, second: b }
        }
    }
}
