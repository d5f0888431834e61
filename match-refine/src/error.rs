use thiserror::Error;

/// Contract violations by the caller.
///
/// Geometric rejections are not errors; see [`Rejection`](crate::Rejection).
#[derive(Debug, Error)]
pub enum Error {
    #[error("correspondence {index} references target keypoint {keypoint}, but there are only {len} target keypoints")]
    TargetKeypointOutOfRange {
        index: usize,
        keypoint: usize,
        len: usize,
    },
    #[error("correspondence {index} references model keypoint {keypoint}, but there are only {len} model keypoints")]
    ModelKeypointOutOfRange {
        index: usize,
        keypoint: usize,
        len: usize,
    },
    #[error("inlier mask has {found} entries for {expected} correspondences")]
    MaskLengthMismatch { expected: usize, found: usize },
    #[cfg(feature = "extract")]
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = core::result::Result<T, Error>;
