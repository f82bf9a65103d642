use std::path::PathBuf;

use iced::Point;

use crate::config::CalibrationFile;
use crate::models::{Bound, Channel};

#[derive(Debug, Clone)]
pub enum Message {
    ThresholdChanged(Bound, Channel, u8),
    CursorMoved(Point),
    /// Left click on the original picture
    Probe,
    PreviousSample,
    NextSample,
    ResetThresholds,
    Save,
    /// `Ok(None)` when the dialog was cancelled
    Saved(Result<Option<PathBuf>, String>),
    Load,
    Loaded(Result<Option<CalibrationFile>, String>),
}
