//! Error types for calibration sessions and the background model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrationError {
    /// A session needs at least one frame showing the hand
    #[error("No sample images were provided")]
    NoSamples,

    #[error("Sample index {index} out of range (have {count} samples)")]
    SampleIndexOutOfRange { index: usize, count: usize },

    /// Every frame has to share the background frame's size
    #[error("Frame size {actual_width}x{actual_height} does not match expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Pixel ({x}, {y}) lies outside the {width}x{height} frame")]
    PixelOutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },
}

impl CalibrationError {
    pub fn dimension_mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }
}
