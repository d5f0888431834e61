//! # Four Point
//!
//! Estimates the planar homography `H` that maps points `a` on one image plane
//! to points `b` on another, so that `b ~ H a` in homogeneous coordinates.
//!
//! Four point pairs in general position determine a homography exactly (eight
//! degrees of freedom, two constraints per pair). The estimator in this crate
//! is the normalized direct linear transform (DLT) of Hartley and Zisserman:
//! both point sets are translated to their centroid and scaled so that the mean
//! distance from the origin is `sqrt(2)`, the linear system `A h = 0` is solved
//! for the null vector of `A`, and the result is de-normalized. With more than
//! four pairs the same system gives the algebraic least-squares fit.
//!
//! [`FourPoint`] implements [`Estimator`] so it can be driven by any
//! [`sample_consensus::Consensus`](cv_core::sample_consensus::Consensus)
//! algorithm, such as ARRSAC:
//!
//! ```
//! use cv_core::nalgebra::Point2;
//! use cv_core::sample_consensus::Model;
//! use four_point::{FourPoint, PointPair};
//!
//! let pairs = [
//!     PointPair(Point2::new(0.0, 0.0), Point2::new(10.0, 20.0)),
//!     PointPair(Point2::new(1.0, 0.0), Point2::new(12.0, 20.0)),
//!     PointPair(Point2::new(1.0, 1.0), Point2::new(12.0, 22.0)),
//!     PointPair(Point2::new(0.0, 1.0), Point2::new(10.0, 22.0)),
//! ];
//! let homography = FourPoint::new().from_pairs(pairs.iter().copied()).unwrap();
//! assert!(homography.residual(&pairs[2]) < 1e-6);
//! ```
#![no_std]

use cv_core::{
    nalgebra::{Matrix3, MatrixMN as OMatrix, Point2, Vector2, VectorN as OVector, U9},
    sample_consensus::{Estimator, Model},
};
use derive_more::{AsRef, Deref, From, Into};
use num_traits::Float;

/// Below this magnitude a homogeneous coordinate is treated as a point at infinity.
const HOMOGENEOUS_EPSILON: f64 = 1e-12;

/// A correspondence between a point on the source plane and a point on the destination plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointPair(pub Point2<f64>, pub Point2<f64>);

/// A planar projective transform from the source plane to the destination plane.
///
/// The matrix is scaled so that `H[(2, 2)] == 1` whenever that entry is not vanishingly small.
#[derive(Debug, Clone, Copy, PartialEq, AsRef, Deref, From, Into)]
pub struct Homography(pub Matrix3<f64>);

impl Homography {
    /// Maps a source point onto the destination plane.
    ///
    /// Returns `None` if the point maps to infinity.
    pub fn transform(&self, point: Point2<f64>) -> Option<Point2<f64>> {
        let projected = self.0 * point.to_homogeneous();
        let w = projected.z;
        if !w.is_finite() || w.abs() <= HOMOGENEOUS_EPSILON {
            return None;
        }
        Some(Point2::new(projected.x / w, projected.y / w))
    }
}

impl Model<PointPair> for Homography {
    /// The euclidean reprojection error of the source point on the destination plane.
    fn residual(&self, data: &PointPair) -> f64 {
        let PointPair(a, b) = *data;
        self.transform(a)
            .map(|projected| (projected - b).norm())
            .filter(|error| error.is_finite())
            .unwrap_or(f64::INFINITY)
    }
}

/// Performs the normalized direct linear transform.
///
/// `epsilon` and `iterations` configure the symmetric eigen decomposition
/// of `AᵀA` used to find the null vector.
#[derive(Copy, Clone, Debug)]
pub struct FourPoint {
    pub epsilon: f64,
    pub iterations: usize,
}

impl FourPoint {
    pub fn new() -> Self {
        Default::default()
    }

    /// Fits a homography to all of the given pairs.
    ///
    /// Returns `None` when fewer than four pairs are given, when either point set
    /// collapses onto a single location, or when the fitted matrix is singular.
    pub fn from_pairs<I>(&self, data: I) -> Option<Homography>
    where
        I: Iterator<Item = PointPair> + Clone,
    {
        let count = data.clone().count();
        if count < <Self as Estimator<PointPair>>::MIN_SAMPLES {
            return None;
        }
        let source = Normalization::from_points(data.clone().map(|PointPair(a, _)| a))?;
        let destination = Normalization::from_points(data.clone().map(|PointPair(_, b)| b))?;

        let mut ata: OMatrix<f64, U9, U9> = OMatrix::zeros();
        for PointPair(a, b) in data {
            let a = source.apply(a);
            let b = destination.apply(b);
            let first = OVector::<f64, U9>::from_column_slice(&[
                -a.x,
                -a.y,
                -1.0,
                0.0,
                0.0,
                0.0,
                b.x * a.x,
                b.x * a.y,
                b.x,
            ]);
            let second = OVector::<f64, U9>::from_column_slice(&[
                0.0,
                0.0,
                0.0,
                -a.x,
                -a.y,
                -1.0,
                b.y * a.x,
                b.y * a.y,
                b.y,
            ]);
            ata += first * first.transpose() + second * second.transpose();
        }

        let eigens = ata.try_symmetric_eigen(self.epsilon, self.iterations)?;
        let h = eigens
            .eigenvalues
            .iter()
            .enumerate()
            .min_by_key(|&(_, &n)| float_ord::FloatOrd(n))
            .map(|(ix, _)| eigens.eigenvectors.column(ix).into_owned())?;
        let normalized = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);

        let mut matrix = destination.inverse() * normalized * source.matrix();
        let scale = matrix[(2, 2)];
        if scale.abs() > HOMOGENEOUS_EPSILON {
            matrix /= scale;
        }
        if !matrix.iter().all(|v| v.is_finite()) || matrix.determinant().abs() <= HOMOGENEOUS_EPSILON
        {
            return None;
        }
        Some(Homography(matrix))
    }
}

impl Default for FourPoint {
    fn default() -> Self {
        Self {
            epsilon: 1e-12,
            iterations: 1000,
        }
    }
}

impl Estimator<PointPair> for FourPoint {
    type Model = Homography;
    type ModelIter = Option<Homography>;
    const MIN_SAMPLES: usize = 4;

    fn estimate<I>(&self, data: I) -> Self::ModelIter
    where
        I: Iterator<Item = PointPair> + Clone,
    {
        self.from_pairs(data)
    }
}

/// Similarity transform moving a point set's centroid to the origin with a mean distance of `sqrt(2)`.
#[derive(Copy, Clone, Debug)]
struct Normalization {
    centroid: Vector2<f64>,
    scale: f64,
}

impl Normalization {
    fn from_points(points: impl Iterator<Item = Point2<f64>> + Clone) -> Option<Self> {
        let count = points.clone().count() as f64;
        let sum = points
            .clone()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords);
        let centroid = sum / count;
        let mean_distance = points
            .map(|p| (p.coords - centroid).norm())
            .sum::<f64>()
            / count;
        if !mean_distance.is_finite() || mean_distance <= HOMOGENEOUS_EPSILON {
            return None;
        }
        Some(Self {
            centroid,
            scale: core::f64::consts::SQRT_2 / mean_distance,
        })
    }

    fn apply(&self, point: Point2<f64>) -> Point2<f64> {
        Point2::from((point.coords - self.centroid) * self.scale)
    }

    fn matrix(&self) -> Matrix3<f64> {
        let s = self.scale;
        Matrix3::new(
            s,
            0.0,
            -s * self.centroid.x,
            0.0,
            s,
            -s * self.centroid.y,
            0.0,
            0.0,
            1.0,
        )
    }

    fn inverse(&self) -> Matrix3<f64> {
        let s = self.scale.recip();
        Matrix3::new(
            s,
            0.0,
            self.centroid.x,
            0.0,
            s,
            self.centroid.y,
            0.0,
            0.0,
            1.0,
        )
    }
}
