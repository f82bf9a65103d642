//! Interactive calibration state.
//!
//! A [`CalibrationSession`] owns the background frame, the sample frames and
//! the current thresholds. Every view the calibrator shows is derived from it
//! on demand, so a slider move is just [`CalibrationSession::set_threshold`]
//! followed by a redraw.

use anyhow::Context;
use image::{GrayImage, ImageReader, RgbImage};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::config::{CalibrationFile, SessionSettings};
use crate::error::CalibrationError;
use crate::models::{Bound, Channel, SampleReport, ThresholdTable};
use crate::segmentation::background::foreground_mask;
use crate::segmentation::color::{self, YccImage};
use crate::segmentation::{morphology, threshold};

#[derive(Clone)]
pub struct CalibrationSession {
    background: YccImage,
    samples_rgb: Vec<RgbImage>,
    samples: Vec<YccImage>,
    active: usize,
    foreground: GrayImage,
    thresholds: ThresholdTable,
    settings: SessionSettings,
}

impl CalibrationSession {
    /// Convert all frames and learn the foreground of the first sample
    pub fn new(
        background: RgbImage,
        samples: Vec<RgbImage>,
        thresholds: ThresholdTable,
        settings: SessionSettings,
    ) -> Result<Self, CalibrationError> {
        if samples.is_empty() {
            return Err(CalibrationError::NoSamples);
        }
        let dims = background.dimensions();
        if let Some(bad) = samples.iter().find(|s| s.dimensions() != dims) {
            return Err(CalibrationError::dimension_mismatch(dims, bad.dimensions()));
        }

        let background = color::ycrcb_from_rgb(&background);
        let converted: Vec<YccImage> = samples.iter().map(color::ycrcb_from_rgb).collect();
        let foreground = foreground_mask(&background, &converted[0], &settings.mixture)?;

        info!(
            "Calibration session: {}x{} frames, {} sample(s), thresholds {}",
            dims.0,
            dims.1,
            samples.len(),
            thresholds
        );

        Ok(Self {
            background,
            samples_rgb: samples,
            samples: converted,
            active: 0,
            foreground,
            thresholds,
            settings,
        })
    }

    pub fn thresholds(&self) -> ThresholdTable {
        self.thresholds
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Move one slider; returns the value it replaced
    pub fn set_threshold(&mut self, bound: Bound, channel: Channel, value: u8) -> u8 {
        let old = self.thresholds.set(bound, channel, value);
        debug!("{} {} threshold: {} -> {}", bound, channel, old, value);
        old
    }

    pub fn set_thresholds(&mut self, thresholds: ThresholdTable) {
        self.thresholds = thresholds;
    }

    /// Replace the settings and relearn the foreground mask
    pub fn set_settings(&mut self, settings: SessionSettings) -> Result<(), CalibrationError> {
        self.foreground = foreground_mask(&self.background, &self.samples[self.active], &settings.mixture)?;
        self.settings = settings;
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn active_sample(&self) -> usize {
        self.active
    }

    /// Switch to another sample frame and relearn its foreground
    pub fn select_sample(&mut self, index: usize) -> Result<(), CalibrationError> {
        if index >= self.samples.len() {
            return Err(CalibrationError::SampleIndexOutOfRange {
                index,
                count: self.samples.len(),
            });
        }
        if index != self.active {
            self.foreground = foreground_mask(&self.background, &self.samples[index], &self.settings.mixture)?;
            self.active = index;
            debug!("Active sample is now #{}", index + 1);
        }
        Ok(())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.background.dimensions()
    }

    /// The active sample as loaded
    pub fn original_rgb(&self) -> &RgbImage {
        &self.samples_rgb[self.active]
    }

    pub fn active_ycc(&self) -> &YccImage {
        &self.samples[self.active]
    }

    /// Raw output of the background model for the active sample
    pub fn foreground_mask(&self) -> &GrayImage {
        &self.foreground
    }

    /// Thresholded active sample, still in YCrCb
    pub fn segmented_ycc(&self) -> YccImage {
        threshold::threshold_skin_color(self.active_ycc(), &self.thresholds)
    }

    /// Thresholded active sample converted back for display
    pub fn segmented_rgb(&self) -> RgbImage {
        color::rgb_from_ycrcb(&self.segmented_ycc())
    }

    /// Segmented view with everything outside the foreground blacked out
    pub fn final_image(&self) -> RgbImage {
        let mask = morphology::open_mask(&self.foreground, self.settings.open_radius);
        morphology::apply_mask(&self.segmented_rgb(), &mask)
    }

    /// Binary mask of skin pixels inside the foreground
    pub fn skin_mask(&self) -> GrayImage {
        let skin = threshold::skin_mask(self.active_ycc(), &self.thresholds);
        let combined = morphology::intersect_masks(&self.foreground, &skin);
        morphology::open_mask(&combined, self.settings.open_radius)
    }

    /// Probe one pixel of the active sample
    pub fn sample(&self, x: u32, y: u32) -> Result<SampleReport, CalibrationError> {
        let (width, height) = self.dimensions();
        if x >= width || y >= height {
            return Err(CalibrationError::PixelOutOfBounds { x, y, width, height });
        }

        let pixel = *self.active_ycc().get_pixel(x, y);
        let luts = threshold::ChannelLuts::from_table(&self.thresholds);
        let report = SampleReport {
            x,
            y,
            original_ycc: pixel.0,
            original_rgb: color::rgb_pixel(pixel).0,
            segmented_ycc: luts.apply_pixel(pixel).0,
        };
        info!("{}", report);
        Ok(report)
    }
}

/// Decode an image file into an 8-bit RGB frame
pub fn load_frame(path: &Path) -> anyhow::Result<RgbImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;
    debug!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.to_rgb8())
}

impl CalibrationSession {
    /// Load the background and sample frames from disk
    pub fn open(
        background: &Path,
        samples: &[PathBuf],
        calibration: CalibrationFile,
    ) -> anyhow::Result<Self> {
        let background = load_frame(background)?;
        let samples = samples
            .iter()
            .map(|p| load_frame(p))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self::new(background, samples, calibration.thresholds, calibration.settings)?)
    }

    /// Adopt a loaded calibration; the session is left untouched when its settings are invalid
    pub fn apply_calibration(&mut self, file: CalibrationFile) -> Result<ThresholdTable, CalibrationError> {
        self.set_settings(file.settings)?;
        self.thresholds = file.thresholds;
        info!("Applied calibration: {}", self.thresholds);
        Ok(self.thresholds)
    }

    /// Snapshot of the current thresholds and settings for saving
    pub fn calibration_file(&self) -> CalibrationFile {
        CalibrationFile::new(self.thresholds, self.settings.clone())
    }
}
