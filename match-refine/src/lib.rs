//! # Match Refine
//!
//! Decides whether a small model image appears inside a larger target image,
//! given keypoints and binary descriptors of both.
//!
//! Raw descriptor matching is noisy. This crate turns the two nearest model
//! features of every target feature into a small, geometrically verified set
//! of correspondences:
//!
//! 1. [`RatioFilter`] drops ambiguous matches with Lowe's ratio test.
//! 2. [`DuplicateResolver`] keeps one target feature per model feature, the closest.
//! 3. [`GeometricValidator`] fits a homography through a [`HomographyEstimator`]
//!    and accepts it only if it does not distort the model implausibly. The
//!    inliers of an accepted homography are the verified correspondences.
//!
//! [`Pipeline`] runs the stages in that order and reports the count after each.
//! A non-empty result means the model was found; how many verified
//! correspondences are enough is up to the caller.
//!
//! ```
//! use cv_core::{nalgebra::Point2, KeyPoint};
//! use match_refine::{CandidateMatch, ConsensusEstimator, Pipeline, RankedCandidatePair};
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! // The target shows the model shifted by (40, 25).
//! let model: Vec<KeyPoint> = (0..16)
//!     .map(|i| KeyPoint(Point2::new((i % 4) as f64 * 30.0, (i / 4) as f64 * 20.0 + (i % 3) as f64)))
//!     .collect();
//! let target: Vec<KeyPoint> = model
//!     .iter()
//!     .map(|kp| KeyPoint(Point2::new(kp.x + 40.0, kp.y + 25.0)))
//!     .collect();
//! let candidates: Vec<RankedCandidatePair> = (0..16)
//!     .map(|i| RankedCandidatePair::new(
//!         CandidateMatch::new(i, i, 5),
//!         CandidateMatch::new(i, (i + 1) % 16, 60),
//!     ))
//!     .collect();
//!
//! let mut estimator = ConsensusEstimator::arrsac(3.0, SmallRng::seed_from_u64(0));
//! let report = Pipeline::default()
//!     .run(&candidates, &model, &target, &mut estimator)
//!     .unwrap();
//! assert!(report.is_detected());
//! ```

mod correspondence;
mod duplicates;
mod error;
#[cfg(feature = "extract")]
pub mod extract;
mod homography;
mod matcher;
mod pipeline;
mod ratio;
mod settings;
mod validate;

pub use correspondence::*;
pub use duplicates::*;
pub use error::*;
pub use homography::*;
pub use matcher::*;
pub use pipeline::*;
pub use ratio::*;
pub use settings::*;
pub use validate::*;
