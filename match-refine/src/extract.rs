//! Loading images from disk and extracting AKAZE features from them.

use crate::{
    match_two_nearest, ConsensusEstimator, Pipeline, PipelineReport, PipelineSettings, Result,
};
use akaze::Akaze;
use bitarray::BitArray;
use cv_core::{nalgebra::Point2, KeyPoint};
use image::{imageops::FilterType, DynamicImage, GrayImage};
use log::*;
use rand::RngCore;
use std::path::Path;

/// Images are rescaled so that their longer side has this many pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;

/// Edge preserving smoothing applied to every image before it is rescaled.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BilateralFilter {
    /// Width of the filter window in pixels.
    pub diameter: u32,
    /// Intensity difference at which neighbors stop contributing.
    pub sigma_color: f32,
    /// Spatial falloff of the neighbor weights.
    pub sigma_space: f32,
}

impl BilateralFilter {
    pub fn apply(&self, image: &GrayImage) -> GrayImage {
        imageproc::filter::bilateral_filter(
            image,
            self.diameter,
            self.sigma_color,
            self.sigma_space,
        )
    }
}

impl Default for BilateralFilter {
    fn default() -> Self {
        Self {
            diameter: 9,
            sigma_color: 150.0,
            sigma_space: 150.0,
        }
    }
}

/// How images are prepared and which AKAZE detector runs on them.
#[derive(Debug, Copy, Clone)]
pub struct Extraction {
    pub smoothing: BilateralFilter,
    pub max_dimension: u32,
    pub akaze: Akaze,
}

impl Extraction {
    /// The AKAZE detector tuned for finding small planar objects.
    ///
    /// Uses a response threshold of `0.005`, four octaves and eleven sublevels per octave.
    pub fn tuned_akaze() -> Akaze {
        Akaze {
            detector_threshold: 0.005,
            max_octave_evolution: 4,
            num_sublevels: 11,
            ..Default::default()
        }
    }
}

impl Default for Extraction {
    fn default() -> Self {
        Self {
            smoothing: BilateralFilter::default(),
            max_dimension: DEFAULT_MAX_DIMENSION,
            akaze: Self::tuned_akaze(),
        }
    }
}

/// The factor that brings the longer side of a `width` by `height` image to `max_dimension`.
pub fn scale_factor(width: u32, height: u32, max_dimension: u32) -> f64 {
    max_dimension as f64 / width.max(height) as f64
}

/// Opens an image as 8-bit grayscale, smooths it and rescales it to `max_dimension` on its longer side.
///
/// Enlarging uses Catmull-Rom interpolation; shrinking uses a triangle filter.
pub fn load_gray_scale_image(
    path: impl AsRef<Path>,
    smoothing: &BilateralFilter,
    max_dimension: u32,
) -> Result<DynamicImage> {
    let path = path.as_ref();
    debug!("loading image from {}", path.display());
    let gray = image::open(path)?.to_luma8();
    let (width, height) = gray.dimensions();
    debug!("original width: {}, original height: {}", width, height);
    if width == 0 || height == 0 {
        return Ok(DynamicImage::ImageLuma8(gray));
    }
    let filtered = smoothing.apply(&gray);

    let scale = scale_factor(width, height, max_dimension);
    debug!("scale factor: {}", scale);
    if scale == 1.0 {
        return Ok(DynamicImage::ImageLuma8(filtered));
    }
    let filter = if scale > 1.0 {
        FilterType::CatmullRom
    } else {
        FilterType::Triangle
    };
    let resized_width = ((width as f64 * scale).round() as u32).max(1);
    let resized_height = ((height as f64 * scale).round() as u32).max(1);
    let resized = image::imageops::resize(&filtered, resized_width, resized_height, filter);
    debug!(
        "resized width: {}, resized height: {}",
        resized.width(),
        resized.height()
    );
    Ok(DynamicImage::ImageLuma8(resized))
}

/// Extracts AKAZE keypoints in pixel coordinates together with their binary descriptors.
pub fn extract_features(
    akaze: &Akaze,
    image: &DynamicImage,
) -> (Vec<KeyPoint>, Vec<BitArray<64>>) {
    let (keypoints, descriptors) = akaze.extract(image);
    let keypoints = keypoints
        .iter()
        .map(|kp| KeyPoint(Point2::new(kp.point.0 as f64, kp.point.1 as f64)))
        .collect();
    (keypoints, descriptors)
}

/// Runs the whole detection on two image files.
///
/// `rng` seeds the ARRSAC homography fit.
pub fn find_model_in_target<R>(
    model_path: impl AsRef<Path>,
    target_path: impl AsRef<Path>,
    extraction: &Extraction,
    settings: &PipelineSettings,
    rng: R,
) -> Result<PipelineReport>
where
    R: RngCore,
{
    let model_image =
        load_gray_scale_image(model_path, &extraction.smoothing, extraction.max_dimension)?;
    let target_image =
        load_gray_scale_image(target_path, &extraction.smoothing, extraction.max_dimension)?;

    let (model_keypoints, model_descriptors) = extract_features(&extraction.akaze, &model_image);
    let (target_keypoints, target_descriptors) =
        extract_features(&extraction.akaze, &target_image);
    info!(
        "matching {} target descriptors against {} model descriptors",
        target_descriptors.len(),
        model_descriptors.len()
    );

    let candidates = match_two_nearest(&model_descriptors, &target_descriptors);
    let mut estimator = ConsensusEstimator::arrsac(settings.reprojection_threshold, rng);
    Pipeline::new(settings).run(
        &candidates,
        &model_keypoints,
        &target_keypoints,
        &mut estimator,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::GenericImageView;

    #[test]
    fn longer_side_decides_scale() {
        assert_relative_eq!(scale_factor(2048, 512, 1024), 0.5);
        assert_relative_eq!(scale_factor(256, 512, 1024), 2.0);
        assert_relative_eq!(scale_factor(1024, 700, 1024), 1.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_gray_scale_image(
            "does/not/exist.png",
            &BilateralFilter::default(),
            DEFAULT_MAX_DIMENSION,
        );
        assert!(matches!(result, Err(crate::Error::Image(_))));
    }

    #[test]
    fn default_extraction_is_tuned() {
        let extraction = Extraction::default();
        assert_eq!(extraction.max_dimension, 1024);
        assert_eq!(extraction.smoothing.diameter, 9);
        assert_relative_eq!(extraction.smoothing.sigma_color, 150.0);
        assert_relative_eq!(extraction.smoothing.sigma_space, 150.0);
        assert_relative_eq!(extraction.akaze.detector_threshold, 0.005);
        assert_eq!(extraction.akaze.max_octave_evolution, 4);
        assert_eq!(extraction.akaze.num_sublevels, 11);
    }

    #[test]
    fn smoothing_keeps_flat_regions_and_size() {
        let flat = GrayImage::from_pixel(40, 30, image::Luma([90]));
        let smoothed = BilateralFilter::default().apply(&flat);
        assert_eq!(smoothed.dimensions(), (40, 30));
        assert!(smoothed.pixels().all(|p| p.0[0] == 90));
    }

    #[test]
    fn loaded_image_is_smoothed_and_rescaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        GrayImage::from_fn(64, 32, |x, y| {
            image::Luma([if (x / 8 + y / 8) % 2 == 0 { 30 } else { 220 }])
        })
        .save(&path)
        .unwrap();

        let image = load_gray_scale_image(&path, &BilateralFilter::default(), 256).unwrap();
        assert_eq!((image.width(), image.height()), (256, 128));
        let original = load_gray_scale_image(&path, &BilateralFilter::default(), 64).unwrap();
        assert_eq!((original.width(), original.height()), (64, 32));
    }
}
