pub mod background;
pub mod color;
pub mod morphology;
pub mod steps;
pub mod threshold;

use anyhow::Result;
use image::{DynamicImage, RgbImage};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::SessionSettings;
use crate::models::ThresholdTable;
use crate::pipeline::{Pipeline, PipelineData, prepare_debug_dir};
use steps::*;

/// Headless segmentation orchestrator: background frame + thresholds in, masked frames out
pub struct SegmentationPipeline {
    pub background: RgbImage,
    pub thresholds: ThresholdTable,
    pub settings: SessionSettings,
    pub verbose: bool,
    debug_out: Option<PathBuf>,
    /// Frames segmented so far; names each frame's debug subdirectory
    runs: AtomicUsize,
}

impl SegmentationPipeline {
    pub fn new(background: RgbImage, thresholds: ThresholdTable) -> Self {
        Self {
            background,
            thresholds,
            settings: SessionSettings::default(),
            verbose: false,
            debug_out: None,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Save every frame's intermediate images under `dir/frame_NNN/`.
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, dir: PathBuf) -> Result<Self> {
        prepare_debug_dir(&dir)?;
        self.debug_out = Some(dir);
        Ok(self)
    }

    /// Assemble the standard step chain
    pub fn build(&self) -> Pipeline {
        let mut pipeline = Pipeline::new()
            .with_verbose(self.verbose)
            .add_step(Box::new(YccConversionStep))
            .add_step(Box::new(ForegroundMaskStep {
                background: color::ycrcb_from_rgb(&self.background),
                config: self.settings.mixture.clone(),
            }))
            .add_step(Box::new(SkinThresholdStep {
                thresholds: self.thresholds,
            }));

        if self.settings.open_radius > 0 {
            pipeline = pipeline.add_step(Box::new(MaskCleanupStep {
                radius: self.settings.open_radius,
            }));
        }

        pipeline
            .add_step(Box::new(RgbConversionStep))
            .add_step(Box::new(ApplyMaskStep))
    }

    /// Segment one frame showing the hand
    pub fn segment(&self, frame: &RgbImage) -> Result<PipelineData> {
        if frame.dimensions() != self.background.dimensions() {
            return Err(crate::error::CalibrationError::dimension_mismatch(
                self.background.dimensions(),
                frame.dimensions(),
            )
            .into());
        }

        let mut pipeline = self.build();
        if let Some(dir) = &self.debug_out {
            let run = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
            pipeline = pipeline.with_debug(dir.join(format!("frame_{:03}", run)))?;
        }
        let mut results = pipeline.run(DynamicImage::ImageRgb8(frame.clone()))?;
        results
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Segmentation pipeline produced no output"))
    }
}
