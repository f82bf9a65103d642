use image::{Rgb, RgbImage};
use std::path::PathBuf;
use tempfile::TempDir;

pub const WIDTH: u32 = 20;
pub const HEIGHT: u32 = 20;

/// Dark blue-gray backdrop; rejected by every default band
pub const BACKDROP: Rgb<u8> = Rgb([40, 60, 90]);

/// Converts to YCrCb (168, 151, 118), inside every default band
pub const SKIN: Rgb<u8> = Rgb([200, 155, 150]);

/// Hand patch occupies x, y in PATCH_START..PATCH_END
pub const PATCH_START: u32 = 5;
pub const PATCH_END: u32 = 15;

pub fn in_patch(x: u32, y: u32) -> bool {
    (PATCH_START..PATCH_END).contains(&x) && (PATCH_START..PATCH_END).contains(&y)
}

/// Frame with nothing but the backdrop
pub fn background_frame() -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, BACKDROP)
}

/// Backdrop with a 10x10 skin-colored square in the middle
pub fn hand_frame() -> RgbImage {
    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| if in_patch(x, y) { SKIN } else { BACKDROP })
}

/// Backdrop with a small 4x4 skin square near the top-left corner
pub fn corner_hand_frame() -> RgbImage {
    let blob = 1..5;
    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        if blob.contains(&x) && blob.contains(&y) { SKIN } else { BACKDROP }
    })
}

/// Writes the background and hand frames as PNGs.
/// Returns the temp directory (which must be kept alive) and both paths.
pub fn write_frames() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let background = dir.path().join("background.png");
    let hand = dir.path().join("hand.png");
    background_frame().save(&background).expect("Failed to save background frame");
    hand_frame().save(&hand).expect("Failed to save hand frame");
    (dir, background, hand)
}

/// Session over the hand frame and the corner frame, default thresholds
pub fn session() -> skincal::CalibrationSession {
    skincal::CalibrationSession::new(
        background_frame(),
        vec![hand_frame(), corner_hand_frame()],
        skincal::ThresholdTable::default(),
        skincal::SessionSettings::default(),
    )
    .expect("Failed to create calibration session")
}
