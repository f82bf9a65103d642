pub mod calibration;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod segmentation;

pub use calibration::{CalibrationSession, load_frame};
pub use config::{CalibrationFile, SessionSettings};
pub use error::CalibrationError;
pub use models::{Bound, Channel, SampleReport, ThresholdTable};
pub use segmentation::SegmentationPipeline;
pub use pipeline::{
    ColorSpace, Pipeline, PipelineData, PipelineStep, PipelineContext,
    MetadataValue, DebugConfig
};

#[cfg(feature = "gui")]
pub mod gui;
