use image::{GrayImage, Luma};
use match_refine::{
    extract::{find_model_in_target, Extraction},
    PipelineSettings,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::path::Path;

const OFFSET: (u32, u32) = (300, 200);

/// Square blocks of random intensity, which AKAZE finds plenty of corners in.
fn blocks(width: u32, height: u32, block: u32, seed: u64) -> GrayImage {
    let mut rng = Pcg64::seed_from_u64(seed);
    let columns = (width + block - 1) / block;
    let rows = (height + block - 1) / block;
    let shades: Vec<u8> = (0..columns * rows).map(|_| rng.gen()).collect();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([shades[((y / block) * columns + x / block) as usize]])
    })
}

fn write_scene(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let model = blocks(512, 384, 16, 1);
    let mut target = GrayImage::from_pixel(1024, 768, Luma([128]));
    image::imageops::replace(&mut target, &model, OFFSET.0 as i64, OFFSET.1 as i64);
    let noise = blocks(1024, 768, 5, 2);

    let model_path = dir.join("model.png");
    let target_path = dir.join("target.png");
    let noise_path = dir.join("noise.png");
    model.save(&model_path).unwrap();
    target.save(&target_path).unwrap();
    noise.save(&noise_path).unwrap();
    (model_path, target_path, noise_path)
}

#[test]
fn finds_pasted_model_and_ignores_noise() {
    let _ = pretty_env_logger::try_init();
    let dir = tempfile::tempdir().unwrap();
    let (model_path, target_path, noise_path) = write_scene(dir.path());
    let extraction = Extraction::default();
    let settings = PipelineSettings::default();

    let report = find_model_in_target(
        &model_path,
        &target_path,
        &extraction,
        &settings,
        Pcg64::seed_from_u64(0),
    )
    .unwrap();
    assert_eq!(report.rejection, None);
    assert!(report.is_detected());
    assert!(report.counts.verified >= settings.min_matches_for_homography);

    let report = find_model_in_target(
        &model_path,
        &noise_path,
        &extraction,
        &settings,
        Pcg64::seed_from_u64(0),
    )
    .unwrap();
    assert!(!report.is_detected());
    assert!(report.rejection.is_some());
}
