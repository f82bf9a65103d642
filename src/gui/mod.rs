mod app;
mod message;
mod widgets;

pub use app::{CalibratorApp, run};
pub use message::Message;
