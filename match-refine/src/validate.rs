use crate::{
    Correspondence, Error, HomographyEstimate, HomographyEstimator, Result, ShapeMetrics,
};
use cv_core::{
    nalgebra::{Matrix3, Point2},
    ImagePoint,
};
use derive_more::Display;
use log::*;

/// Bounds on how much a plausible model-to-target homography may distort the model.
///
/// The defaults were tuned by hand; they are the main lever for trading
/// precision against recall.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeLimits {
    /// Smallest accepted area scaling.
    pub min_determinant: f64,
    /// Largest accepted area scaling.
    pub max_determinant: f64,
    /// Smallest accepted length of a transformed unit basis vector.
    pub scale_lower: f64,
    /// Largest accepted length of a transformed unit basis vector.
    pub scale_upper: f64,
    /// Largest accepted magnitude of the perspective row.
    pub perspective_limit: f64,
}

impl Default for ShapeLimits {
    fn default() -> Self {
        Self {
            min_determinant: 0.05,
            max_determinant: 20.0,
            scale_lower: 0.05,
            scale_upper: 20.0,
            perspective_limit: 0.0025,
        }
    }
}

/// The shape check that a homography failed, with the offending value.
#[derive(Debug, Display, Copy, Clone, PartialEq)]
pub enum ShapeCheck {
    #[display(fmt = "determinant {} out of range", _0)]
    Determinant(f64),
    #[display(fmt = "first basis vector scale {} out of range", _0)]
    FirstBasisScale(f64),
    #[display(fmt = "second basis vector scale {} out of range", _0)]
    SecondBasisScale(f64),
    #[display(fmt = "perspective magnitude {} above limit", _0)]
    Perspective(f64),
}

impl ShapeLimits {
    /// Runs the determinant, basis scale and perspective checks in that order.
    ///
    /// A non-finite metric never passes.
    pub fn check(&self, matrix: &Matrix3<f64>) -> core::result::Result<ShapeMetrics, ShapeCheck> {
        let metrics = ShapeMetrics::from_matrix(matrix);
        let scales = self.scale_lower..=self.scale_upper;
        if !(self.min_determinant..=self.max_determinant).contains(&metrics.determinant) {
            Err(ShapeCheck::Determinant(metrics.determinant))
        } else if !scales.contains(&metrics.n1) {
            Err(ShapeCheck::FirstBasisScale(metrics.n1))
        } else if !scales.contains(&metrics.n2) {
            Err(ShapeCheck::SecondBasisScale(metrics.n2))
        } else if !(..=self.perspective_limit).contains(&metrics.n3) {
            Err(ShapeCheck::Perspective(metrics.n3))
        } else {
            Ok(metrics)
        }
    }
}

/// Why a correspondence set produced no verified match.
///
/// These are ordinary negative results, not errors.
#[derive(Debug, Display, Copy, Clone, PartialEq)]
pub enum Rejection {
    #[display(
        fmt = "insufficient candidates: {} correspondences, {} required",
        found,
        required
    )]
    InsufficientCandidates { found: usize, required: usize },
    #[display(fmt = "no homography could be fitted")]
    DegenerateHomography,
    #[display(fmt = "homography rejected: {}", _0)]
    ShapeRejected(ShapeCheck),
}

/// The outcome of geometric validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Validation {
    /// The verified correspondences; empty when `rejection` is set.
    pub correspondences: Vec<Correspondence>,
    pub rejection: Option<Rejection>,
}

impl Validation {
    fn rejected(rejection: Rejection) -> Self {
        info!("{}", rejection);
        Self {
            correspondences: Vec::new(),
            rejection: Some(rejection),
        }
    }
}

/// Decides whether a homography over the correspondences is trustworthy and
/// keeps its inliers if so.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeometricValidator {
    /// Below this many correspondences no homography is requested.
    pub min_matches_for_homography: usize,
    pub limits: ShapeLimits,
}

impl Default for GeometricValidator {
    fn default() -> Self {
        Self {
            min_matches_for_homography: 10,
            limits: ShapeLimits::default(),
        }
    }
}

impl GeometricValidator {
    pub fn new(min_matches_for_homography: usize, limits: ShapeLimits) -> Self {
        Self {
            min_matches_for_homography,
            limits,
        }
    }

    /// Fits a homography with `estimator` and validates it.
    ///
    /// Keypoint indices are checked before anything else; an index outside of
    /// its keypoint slice is an [`Error`]. The estimator is not called at all
    /// when there are fewer than `min_matches_for_homography` correspondences.
    pub fn validate<K, E>(
        &self,
        correspondences: &[Correspondence],
        model_keypoints: &[K],
        target_keypoints: &[K],
        estimator: &mut E,
    ) -> Result<Validation>
    where
        K: ImagePoint,
        E: HomographyEstimator + ?Sized,
    {
        check_indices(correspondences, model_keypoints.len(), target_keypoints.len())?;
        if let Some(rejection) = self.support_rejection(correspondences.len()) {
            return Ok(Validation::rejected(rejection));
        }
        let (model, target): (Vec<Point2<f64>>, Vec<Point2<f64>>) = correspondences
            .iter()
            .map(|c| {
                (
                    model_keypoints[c.model].image_point(),
                    target_keypoints[c.target].image_point(),
                )
            })
            .unzip();
        match estimator.estimate(&model, &target) {
            Some(estimate) => self.apply(correspondences, &estimate),
            None => Ok(Validation::rejected(Rejection::DegenerateHomography)),
        }
    }

    /// Validates an estimate that was already fitted over `correspondences`.
    ///
    /// The minimum support requirement still applies. A mask that is not
    /// aligned with `correspondences` is an [`Error`].
    pub fn apply(
        &self,
        correspondences: &[Correspondence],
        estimate: &HomographyEstimate,
    ) -> Result<Validation> {
        if let Some(rejection) = self.support_rejection(correspondences.len()) {
            return Ok(Validation::rejected(rejection));
        }
        if estimate.inliers.len() != correspondences.len() {
            return Err(Error::MaskLengthMismatch {
                expected: correspondences.len(),
                found: estimate.inliers.len(),
            });
        }
        if !estimate.matrix.iter().all(|v| v.is_finite()) {
            return Ok(Validation::rejected(Rejection::DegenerateHomography));
        }
        let metrics = match self.limits.check(&estimate.matrix) {
            Ok(metrics) => metrics,
            Err(check) => return Ok(Validation::rejected(Rejection::ShapeRejected(check))),
        };
        debug!(
            "homography accepted with determinant {}, basis scales {} and {}, perspective {}",
            metrics.determinant, metrics.n1, metrics.n2, metrics.n3
        );
        let correspondences = correspondences
            .iter()
            .zip(&estimate.inliers)
            .filter(|&(_, &inlier)| inlier)
            .map(|(&c, _)| c)
            .collect();
        Ok(Validation {
            correspondences,
            rejection: None,
        })
    }

    fn support_rejection(&self, found: usize) -> Option<Rejection> {
        (found < self.min_matches_for_homography).then(|| Rejection::InsufficientCandidates {
            found,
            required: self.min_matches_for_homography,
        })
    }
}

fn check_indices(
    correspondences: &[Correspondence],
    model_len: usize,
    target_len: usize,
) -> Result<()> {
    for (index, c) in correspondences.iter().enumerate() {
        if c.target >= target_len {
            return Err(Error::TargetKeypointOutOfRange {
                index,
                keypoint: c.target,
                len: target_len,
            });
        }
        if c.model >= model_len {
            return Err(Error::ModelKeypointOutOfRange {
                index,
                keypoint: c.model,
                len: model_len,
            });
        }
    }
    Ok(())
}
