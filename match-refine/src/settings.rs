use crate::{GeometricValidator, RatioFilter, ShapeLimits};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// All tunable thresholds of a pipeline run.
///
/// Settings are plain values bound at construction, so differently tuned
/// pipelines can run side by side.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Lowe's ratio for the nearest neighbor test
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_ratio_threshold")
    )]
    pub ratio_threshold: f64,
    /// The minimum number of correspondences before a homography is fitted
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_min_matches_for_homography")
    )]
    pub min_matches_for_homography: usize,
    /// The smallest accepted determinant of the homography's linear block
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_min_determinant")
    )]
    pub min_determinant: f64,
    /// The largest accepted determinant of the homography's linear block
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_max_determinant")
    )]
    pub max_determinant: f64,
    /// The smallest accepted length of a transformed basis vector
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_scale_lower"))]
    pub scale_lower: f64,
    /// The largest accepted length of a transformed basis vector
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_scale_upper"))]
    pub scale_upper: f64,
    /// The largest accepted magnitude of the homography's perspective row
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_perspective_limit")
    )]
    pub perspective_limit: f64,
    /// The reprojection distance in target pixels under which a correspondence is a consensus inlier
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_reprojection_threshold")
    )]
    pub reprojection_threshold: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            ratio_threshold: default_ratio_threshold(),
            min_matches_for_homography: default_min_matches_for_homography(),
            min_determinant: default_min_determinant(),
            max_determinant: default_max_determinant(),
            scale_lower: default_scale_lower(),
            scale_upper: default_scale_upper(),
            perspective_limit: default_perspective_limit(),
            reprojection_threshold: default_reprojection_threshold(),
        }
    }
}

impl PipelineSettings {
    pub fn ratio_filter(&self) -> RatioFilter {
        RatioFilter::new(self.ratio_threshold)
    }

    pub fn shape_limits(&self) -> ShapeLimits {
        ShapeLimits {
            min_determinant: self.min_determinant,
            max_determinant: self.max_determinant,
            scale_lower: self.scale_lower,
            scale_upper: self.scale_upper,
            perspective_limit: self.perspective_limit,
        }
    }

    pub fn validator(&self) -> GeometricValidator {
        GeometricValidator::new(self.min_matches_for_homography, self.shape_limits())
    }
}

fn default_ratio_threshold() -> f64 {
    0.8
}

fn default_min_matches_for_homography() -> usize {
    10
}

fn default_min_determinant() -> f64 {
    0.05
}

fn default_max_determinant() -> f64 {
    20.0
}

fn default_scale_lower() -> f64 {
    0.05
}

fn default_scale_upper() -> f64 {
    20.0
}

fn default_perspective_limit() -> f64 {
    0.0025
}

fn default_reprojection_threshold() -> f64 {
    5.0
}
