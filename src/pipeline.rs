use image::{DynamicImage, GrayImage};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use anyhow::Result;

/// How the three channels of a pipeline image must be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    YCrCb,
}

/// Data that flows through the pipeline
/// Each PipelineData is one frame plus whatever the steps learned about it
#[derive(Clone)]
pub struct PipelineData {
    /// The image data (RGB, YCrCb packed as RGB, or a grayscale mask)
    pub image: DynamicImage,

    /// Interpretation of `image`'s channels
    pub space: ColorSpace,

    /// Foreground mask attached by the background step
    pub mask: Option<GrayImage>,

    /// Pixels accepted by every channel threshold (and the foreground mask, if any)
    pub skin_mask: Option<GrayImage>,

    /// Metadata for tracking properties (e.g., "foreground_ratio", "skin_ratio")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone)]
pub enum MetadataValue {
    Bool(bool),
    Float(f32),
    Int(i32),
}

impl PipelineData {
    /// Create PipelineData for a full RGB frame
    pub fn from_image(image: DynamicImage) -> Self {
        let image = DynamicImage::ImageRgb8(image.to_rgb8());
        Self {
            image,
            space: ColorSpace::Rgb,
            mask: None,
            skin_mask: None,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get metadata as bool
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as float
    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Fail with the step name when an earlier step did not run
    pub fn require_space(&self, space: ColorSpace, step: &str) -> Result<()> {
        if self.space != space {
            return Err(anyhow::anyhow!(
                "{} expects {:?} input but got {:?}",
                step,
                space,
                self.space
            ));
        }
        Ok(())
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Create `dir`, or check that an existing one is empty
pub fn prepare_debug_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        let entries = std::fs::read_dir(dir)?;
        if entries.count() > 0 {
            return Err(anyhow::anyhow!("Debug directory is not empty: {}", dir.display()));
        }
    } else {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Context available to all pipeline steps
#[derive(Clone)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    fn debug_dir(&self) -> Option<&Path> {
        self.debug.as_ref().map(|d| d.output_dir.as_path())
    }
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in verbose output)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext {
                verbose: false,
                debug: None,
            },
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        prepare_debug_dir(&output_dir)?;
        self.context.debug = Some(DebugConfig {
            output_dir,
        });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step on an input frame
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<Vec<PipelineData>> {
        if let Some(dir) = self.context.debug_dir() {
            let input_dir = dir.join("00_input");
            std::fs::create_dir_all(&input_dir)?;
            input.save(input_dir.join("01.png"))
                .map_err(|e| anyhow::anyhow!("Failed to save debug input: {}", e))?;
            debug!("Debug: saved 00_input/01.png");
        }

        let mut data = vec![PipelineData::from_image(input)];

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            if self.context.verbose {
                info!("Running step {}: {} (processing {} items)", step_idx + 1, step.name(), data.len());
            }

            data = step.process(data, &self.context)?;
            self.save_debug_outputs(step_idx, step.name(), &data)?;

            debug!("  → {} items", data.len());
        }

        Ok(data)
    }

    fn save_debug_outputs(&self, step_idx: usize, step_name: &str, data: &[PipelineData]) -> Result<()> {
        let Some(dir) = self.context.debug_dir() else {
            return Ok(());
        };

        let step_dir_name = format!("{:02}_{}", step_idx + 1,
            step_name.to_lowercase().replace(' ', "_"));
        let step_dir = dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        for (idx, item) in data.iter().enumerate() {
            let output_path = step_dir.join(format!("{:02}.png", idx + 1));
            item.image.save(&output_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

            let masks = [("mask", &item.mask), ("skin", &item.skin_mask)];
            for (suffix, mask) in masks {
                if let Some(mask) = mask {
                    let mask_path = step_dir.join(format!("{:02}_{}.png", idx + 1, suffix));
                    mask.save(&mask_path)
                        .map_err(|e| anyhow::anyhow!("Failed to save debug mask: {}", e))?;
                }
            }
        }

        debug!("Debug: saved {} images to {}/", data.len(), step_dir_name);
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
