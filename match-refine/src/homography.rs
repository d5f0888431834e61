use arrsac::Arrsac;
use cv_core::{
    nalgebra::{Matrix3, Point2},
    sample_consensus::{Consensus, Estimator},
};
use four_point::{FourPoint, PointPair};
use log::*;
use rand::RngCore;

/// A fitted planar transform together with the inlier mask of the fit.
///
/// `matrix` maps model image coordinates onto target image coordinates.
/// `inliers` is aligned by position with the correspondences that were fitted.
#[derive(Debug, Clone, PartialEq)]
pub struct HomographyEstimate {
    pub matrix: Matrix3<f64>,
    pub inliers: Vec<bool>,
}

impl HomographyEstimate {
    pub fn inlier_count(&self) -> usize {
        self.inliers.iter().filter(|&&inlier| inlier).count()
    }
}

/// The quantities the shape checks look at.
///
/// Only the linear block and the perspective row of the homography are used:
///
/// * `determinant` of the top-left 2x2 block, the area scaling
/// * `n1` and `n2`, the lengths of the transformed unit basis vectors
///   (the columns of the 2x2 block)
/// * `n3`, the length of the bottom-left 1x2 perspective row
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeMetrics {
    pub determinant: f64,
    pub n1: f64,
    pub n2: f64,
    pub n3: f64,
}

impl ShapeMetrics {
    pub fn from_matrix(h: &Matrix3<f64>) -> Self {
        Self {
            determinant: h[(0, 0)] * h[(1, 1)] - h[(0, 1)] * h[(1, 0)],
            n1: h[(0, 0)].hypot(h[(1, 0)]),
            n2: h[(0, 1)].hypot(h[(1, 1)]),
            n3: h[(2, 0)].hypot(h[(2, 1)]),
        }
    }
}

/// Fits a homography between aligned model and target point arrays.
///
/// `model[i]` and `target[i]` are the two ends of the `i`th correspondence.
/// Returns `None` if no transform could be fitted.
pub trait HomographyEstimator {
    fn estimate(
        &mut self,
        model: &[Point2<f64>],
        target: &[Point2<f64>],
    ) -> Option<HomographyEstimate>;
}

impl<T> HomographyEstimator for &mut T
where
    T: HomographyEstimator + ?Sized,
{
    fn estimate(
        &mut self,
        model: &[Point2<f64>],
        target: &[Point2<f64>],
    ) -> Option<HomographyEstimate> {
        (**self).estimate(model, target)
    }
}

/// Robust homography fitting: a sample consensus algorithm driving [`FourPoint`].
#[derive(Debug, Clone)]
pub struct ConsensusEstimator<C> {
    pub consensus: C,
    pub four_point: FourPoint,
}

impl<C> ConsensusEstimator<C> {
    pub fn new(consensus: C) -> Self {
        Self {
            consensus,
            four_point: FourPoint::new(),
        }
    }
}

impl<R> ConsensusEstimator<Arrsac<R>>
where
    R: RngCore,
{
    /// ARRSAC with `reprojection_threshold` as the inlier distance in target pixels.
    pub fn arrsac(reprojection_threshold: f64, rng: R) -> Self {
        Self::new(Arrsac::new(reprojection_threshold, rng))
    }
}

impl<C> HomographyEstimator for ConsensusEstimator<C>
where
    C: Consensus<FourPoint, PointPair>,
{
    fn estimate(
        &mut self,
        model: &[Point2<f64>],
        target: &[Point2<f64>],
    ) -> Option<HomographyEstimate> {
        if model.len() != target.len()
            || model.len() < <FourPoint as Estimator<PointPair>>::MIN_SAMPLES
        {
            return None;
        }
        let pairs = model.iter().zip(target).map(|(&a, &b)| PointPair(a, b));
        let (homography, inlier_indices) = self.consensus.model_inliers(&self.four_point, pairs)?;
        let mut inliers = vec![false; model.len()];
        for ix in inlier_indices {
            if let Some(inlier) = inliers.get_mut(ix) {
                *inlier = true;
            }
        }
        trace!("consensus homography: {:?}", homography.0);
        Some(HomographyEstimate {
            matrix: homography.0,
            inliers,
        })
    }
}
