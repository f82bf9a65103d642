mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from skincal for tests
pub use skincal::{
    Bound, CalibrationError, CalibrationFile, CalibrationSession, Channel, SessionSettings,
    ThresholdTable,
};
