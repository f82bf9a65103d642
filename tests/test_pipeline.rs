use image::{DynamicImage, Rgb};
use skincal::segmentation::steps::{SkinThresholdStep, YccConversionStep};
use skincal::{ColorSpace, Pipeline, SegmentationPipeline};

mod common;
use common::*;

#[test]
fn test_segmentation_pipeline_masks_background() -> anyhow::Result<()> {
    let segmentation = SegmentationPipeline::new(background_frame(), ThresholdTable::default());
    let result = segmentation.segment(&hand_frame())?;

    assert_eq!(result.space, ColorSpace::Rgb);
    let image = result.image.to_rgb8();
    assert_eq!(*image.get_pixel(10, 10), SKIN);
    assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));

    assert_eq!(result.get_float("foreground_ratio"), Some(0.25));
    assert_eq!(result.get_float("skin_ratio"), Some(0.25));
    assert_eq!(result.get_bool("masked"), Some(true));

    let skin = result.skin_mask.expect("skin mask");
    assert_eq!(skin.get_pixel(10, 10)[0], 255);
    assert_eq!(skin.get_pixel(0, 0)[0], 0);
    Ok(())
}

#[test]
fn test_cleanup_step_only_added_when_enabled() -> anyhow::Result<()> {
    let segmentation = SegmentationPipeline::new(background_frame(), ThresholdTable::default());
    let names = segmentation.build().step_names().join(",");
    assert!(!names.contains("Mask Cleanup"));

    let segmentation = segmentation.with_settings(SessionSettings {
        open_radius: 1,
        ..SessionSettings::default()
    });
    let pipeline = segmentation.build();
    assert!(pipeline.step_names().contains(&"Mask Cleanup"));

    let result = segmentation.segment(&hand_frame())?;
    assert_eq!(result.get_int("open_radius"), Some(1));
    Ok(())
}

#[test]
fn test_segment_rejects_mismatched_frame() {
    let segmentation = SegmentationPipeline::new(background_frame(), ThresholdTable::default());
    let frame = image::RgbImage::new(WIDTH / 2, HEIGHT);
    assert!(segmentation.segment(&frame).is_err());
}

#[test]
fn test_steps_check_color_space() {
    let pipeline = Pipeline::new().add_step(Box::new(SkinThresholdStep {
        thresholds: ThresholdTable::default(),
    }));
    let err = pipeline
        .run(DynamicImage::ImageRgb8(hand_frame()))
        .err()
        .expect("threshold step needs YCrCb input");
    assert!(err.to_string().contains("Skin Threshold"));
}

#[test]
fn test_run_partial_stops_early() -> anyhow::Result<()> {
    let pipeline = Pipeline::new()
        .add_step(Box::new(YccConversionStep))
        .add_step(Box::new(SkinThresholdStep {
            thresholds: ThresholdTable::default(),
        }));

    let data = pipeline.run_partial(DynamicImage::ImageRgb8(hand_frame()), 1)?;
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].space, ColorSpace::YCrCb);
    assert!(data[0].skin_mask.is_none());
    assert_eq!(*data[0].image.to_rgb8().get_pixel(10, 10), Rgb([168, 151, 118]));
    Ok(())
}

#[test]
fn test_debug_mode_saves_every_step() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");

    let segmentation = SegmentationPipeline::new(background_frame(), ThresholdTable::default())
        .with_debug(debug_dir.clone())?;
    segmentation.segment(&hand_frame())?;

    let frame_dir = debug_dir.join("frame_001");
    assert!(frame_dir.join("00_input/01.png").exists());
    assert!(frame_dir.join("01_ycrcb_conversion/01.png").exists());
    assert!(frame_dir.join("02_foreground_mask/01_mask.png").exists());
    assert!(frame_dir.join("03_skin_threshold/01_skin.png").exists());
    assert!(frame_dir.join("05_apply_mask/01.png").exists());
    Ok(())
}

#[test]
fn test_debug_mode_keeps_each_frame_apart() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let segmentation = SegmentationPipeline::new(background_frame(), ThresholdTable::default())
        .with_verbose(true)
        .with_debug(dir.path().to_path_buf())?;

    segmentation.segment(&hand_frame())?;
    let second = segmentation.segment(&corner_hand_frame())?;

    assert_eq!(*second.image.to_rgb8().get_pixel(2, 2), SKIN);
    assert!(dir.path().join("frame_001/00_input/01.png").exists());
    assert!(dir.path().join("frame_002/00_input/01.png").exists());
    assert!(dir.path().join("frame_002/05_apply_mask/01.png").exists());
    Ok(())
}

#[test]
fn test_debug_dir_must_be_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.txt"), "x")?;

    let result = Pipeline::new().with_debug(dir.path().to_path_buf());
    assert!(result.is_err());

    let segmentation = SegmentationPipeline::new(background_frame(), ThresholdTable::default())
        .with_debug(dir.path().to_path_buf());
    assert!(segmentation.is_err());
    Ok(())
}
