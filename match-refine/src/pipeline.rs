use crate::{
    Correspondence, DuplicateResolver, GeometricValidator, HomographyEstimator, PipelineSettings,
    RankedCandidatePair, RatioFilter, Rejection, Result,
};
use cv_core::ImagePoint;
use log::*;

/// The number of correspondences left after each stage.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct StageCounts {
    pub candidates: usize,
    pub ratio_filtered: usize,
    pub duplicate_filtered: usize,
    pub verified: usize,
}

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub counts: StageCounts,
    /// The geometrically verified correspondences, in duplicate-resolved order.
    pub correspondences: Vec<Correspondence>,
    /// Set when geometric validation turned the run into a negative result.
    pub rejection: Option<Rejection>,
}

impl PipelineReport {
    /// Whether any correspondence survived verification.
    ///
    /// Callers wanting a stricter policy should look at `counts.verified`.
    pub fn is_detected(&self) -> bool {
        !self.correspondences.is_empty()
    }
}

/// Ratio test, duplicate resolution, then homography validation.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Pipeline {
    pub ratio: RatioFilter,
    pub duplicates: DuplicateResolver,
    pub validator: GeometricValidator,
}

impl Pipeline {
    pub fn new(settings: &PipelineSettings) -> Self {
        Self {
            ratio: settings.ratio_filter(),
            duplicates: DuplicateResolver::new(),
            validator: settings.validator(),
        }
    }

    /// Refines the raw two-nearest-neighbor candidates into verified correspondences.
    ///
    /// `estimator` is called at most once, with the duplicate-resolved set.
    pub fn run<K, E>(
        &self,
        candidates: &[RankedCandidatePair],
        model_keypoints: &[K],
        target_keypoints: &[K],
        estimator: &mut E,
    ) -> Result<PipelineReport>
    where
        K: ImagePoint,
        E: HomographyEstimator + ?Sized,
    {
        let ratio_filtered = self.ratio.filter(candidates);
        debug!(
            "ratio filter kept {} of {} candidates",
            ratio_filtered.len(),
            candidates.len()
        );
        let duplicate_filtered = self.duplicates.resolve(&ratio_filtered);
        debug!(
            "duplicate resolution kept {} of {} correspondences",
            duplicate_filtered.len(),
            ratio_filtered.len()
        );
        let validation = self.validator.validate(
            &duplicate_filtered,
            model_keypoints,
            target_keypoints,
            estimator,
        )?;
        let counts = StageCounts {
            candidates: candidates.len(),
            ratio_filtered: ratio_filtered.len(),
            duplicate_filtered: duplicate_filtered.len(),
            verified: validation.correspondences.len(),
        };
        info!(
            "matches: {} unfiltered, {} ratio filtered, {} duplicate filtered, {} homography filtered",
            counts.candidates, counts.ratio_filtered, counts.duplicate_filtered, counts.verified
        );
        Ok(PipelineReport {
            counts,
            correspondences: validation.correspondences,
            rejection: validation.rejection,
        })
    }
}
