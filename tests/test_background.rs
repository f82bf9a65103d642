use image::{Rgb, RgbImage};
use skincal::CalibrationError;
use skincal::segmentation::background::{
    BACKGROUND, BackgroundSubtractor, FOREGROUND, MixtureConfig, foreground_mask,
};
use skincal::segmentation::color::ycrcb_from_rgb;

mod common;
use common::*;

#[test]
fn test_first_frame_is_all_foreground() -> anyhow::Result<()> {
    let mut subtractor = BackgroundSubtractor::new(MixtureConfig::quick_learning());
    let mask = subtractor.apply(&ycrcb_from_rgb(&background_frame()), None)?;

    assert_eq!(subtractor.frames_seen(), 1);
    assert!(mask.pixels().all(|p| p[0] == FOREGROUND));
    Ok(())
}

#[test]
fn test_quick_learning_isolates_the_hand() -> anyhow::Result<()> {
    let background = ycrcb_from_rgb(&background_frame());
    let hand = ycrcb_from_rgb(&hand_frame());
    let mask = foreground_mask(&background, &hand, &MixtureConfig::quick_learning())?;

    for (x, y, p) in mask.enumerate_pixels() {
        let expected = if in_patch(x, y) { FOREGROUND } else { BACKGROUND };
        assert_eq!(p[0], expected, "pixel ({}, {})", x, y);
    }
    Ok(())
}

#[test]
fn test_small_changes_stay_background() -> anyhow::Result<()> {
    let background = ycrcb_from_rgb(&background_frame());
    // A few levels of sensor noise
    let noisy = ycrcb_from_rgb(&RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([45, 63, 86])));
    let mask = foreground_mask(&background, &noisy, &MixtureConfig::quick_learning())?;

    assert!(mask.pixels().all(|p| p[0] == BACKGROUND));
    Ok(())
}

#[test]
fn test_static_scene_is_learned_over_time() -> anyhow::Result<()> {
    let mut subtractor = BackgroundSubtractor::new(MixtureConfig::default());
    let background = ycrcb_from_rgb(&background_frame());
    for _ in 0..5 {
        subtractor.apply(&background, None)?;
    }
    let mask = subtractor.apply(&background, None)?;
    assert!(mask.pixels().all(|p| p[0] == BACKGROUND));

    let mask = subtractor.apply(&ycrcb_from_rgb(&hand_frame()), None)?;
    assert_eq!(mask.get_pixel(10, 10)[0], FOREGROUND);
    assert_eq!(mask.get_pixel(0, 0)[0], BACKGROUND);
    Ok(())
}

#[test]
fn test_darker_copy_is_reported_as_shadow() -> anyhow::Result<()> {
    let config = MixtureConfig::default();
    let mut subtractor = BackgroundSubtractor::new(config.clone());
    let lit = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
    let shaded = RgbImage::from_pixel(4, 4, Rgb([60, 60, 60]));

    // Feed the YCrCb-packed buffers directly so the shadow ratio is exact
    subtractor.apply(&lit, None)?;
    subtractor.apply(&lit, None)?;
    let mask = subtractor.apply(&shaded, None)?;

    assert!(mask.pixels().all(|p| p[0] == config.shadow_value));
    Ok(())
}

#[test]
fn test_shadows_disabled_reports_foreground() -> anyhow::Result<()> {
    let config = MixtureConfig {
        detect_shadows: false,
        ..MixtureConfig::default()
    };
    let mut subtractor = BackgroundSubtractor::new(config);
    let lit = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
    let shaded = RgbImage::from_pixel(4, 4, Rgb([60, 60, 60]));

    subtractor.apply(&lit, None)?;
    subtractor.apply(&lit, None)?;
    let mask = subtractor.apply(&shaded, None)?;

    assert!(mask.pixels().all(|p| p[0] == FOREGROUND));
    Ok(())
}

#[test]
fn test_frame_size_change_is_rejected() -> anyhow::Result<()> {
    let mut subtractor = BackgroundSubtractor::new(MixtureConfig::quick_learning());
    subtractor.apply(&RgbImage::new(4, 4), None)?;

    let err = subtractor.apply(&RgbImage::new(5, 4), None).unwrap_err();
    assert!(matches!(err, CalibrationError::DimensionMismatch { .. }));

    subtractor.reset();
    assert_eq!(subtractor.frames_seen(), 0);
    subtractor.apply(&RgbImage::new(5, 4), None)?;
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut subtractor = BackgroundSubtractor::new(MixtureConfig {
        history: 0,
        ..MixtureConfig::quick_learning()
    });
    let err = subtractor.apply(&RgbImage::new(2, 2), None).unwrap_err();
    assert!(matches!(err, CalibrationError::InvalidParameter { .. }));
}

#[test]
fn test_empty_first_frame_still_fixes_the_size() -> anyhow::Result<()> {
    let mut subtractor = BackgroundSubtractor::new(MixtureConfig::quick_learning());
    let mask = subtractor.apply(&RgbImage::new(0, 0), None)?;
    assert_eq!(mask.dimensions(), (0, 0));

    let err = subtractor.apply(&RgbImage::new(4, 4), None).unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::DimensionMismatch { expected_width: 0, actual_width: 4, .. }
    ));
    assert_eq!(subtractor.frames_seen(), 1);
    Ok(())
}

#[test]
fn test_zero_learning_rate_freezes_the_model() -> anyhow::Result<()> {
    let background = ycrcb_from_rgb(&background_frame());
    let hand = ycrcb_from_rgb(&hand_frame());

    let mut subtractor = BackgroundSubtractor::new(MixtureConfig::quick_learning());
    // The first frame always initialises the model, whatever rate is asked for
    subtractor.apply(&background, Some(0.0))?;
    let mask = subtractor.apply(&background, Some(0.0))?;
    assert!(mask.pixels().all(|p| p[0] == BACKGROUND));

    for _ in 0..2 {
        let mask = subtractor.apply(&hand, Some(0.0))?;
        assert_eq!(mask.get_pixel(10, 10)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(0, 0)[0], BACKGROUND);
    }
    Ok(())
}

#[test]
fn test_automatic_rate_absorbs_a_still_hand() -> anyhow::Result<()> {
    let background = ycrcb_from_rgb(&background_frame());
    let hand = ycrcb_from_rgb(&hand_frame());

    let mut subtractor = BackgroundSubtractor::new(MixtureConfig::quick_learning());
    subtractor.apply(&background, None)?;
    let mask = subtractor.apply(&hand, None)?;
    assert_eq!(mask.get_pixel(10, 10)[0], FOREGROUND);

    let mask = subtractor.apply(&hand, None)?;
    assert_eq!(mask.get_pixel(10, 10)[0], BACKGROUND);
    Ok(())
}
