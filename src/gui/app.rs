use iced::{
    ContentFit, Element, Length, Point, Task, Theme,
    widget::{button, column, image, image::Handle, mouse_area, row, scrollable, text},
};
use log::{info, warn};
use rfd::AsyncFileDialog;

use super::Message;
use super::widgets::{mask_handle, panel, rgb_handle, threshold_slider};
use crate::calibration::CalibrationSession;
use crate::config::CalibrationFile;
use crate::models::{Bound, Channel, SampleReport, ThresholdTable};

/// Rendered views, refreshed whenever the session changes
struct Views {
    original: Handle,
    foreground: Handle,
    segmented: Handle,
    final_image: Handle,
}

impl Views {
    fn render(session: &CalibrationSession) -> Self {
        Self {
            original: rgb_handle(session.original_rgb()),
            foreground: mask_handle(session.foreground_mask()),
            segmented: rgb_handle(&session.segmented_rgb()),
            final_image: rgb_handle(&session.final_image()),
        }
    }
}

pub struct CalibratorApp {
    session: CalibrationSession,
    views: Views,
    cursor: Option<Point>,
    last_sample: Option<SampleReport>,
    status: String,
}

/// Open the calibrator window and block until it is closed
pub fn run(session: CalibrationSession) -> iced::Result {
    iced::application(
        move || CalibratorApp::new(session.clone()),
        CalibratorApp::update,
        CalibratorApp::view,
    )
    .title("Skin color calibration")
    .theme(CalibratorApp::theme)
    .run()
}

impl CalibratorApp {
    pub fn new(session: CalibrationSession) -> Self {
        let views = Views::render(&session);
        Self {
            session,
            views,
            cursor: None,
            last_sample: None,
            status: "Click the original picture to sample a pixel".to_string(),
        }
    }

    fn refresh(&mut self) {
        self.views = Views::render(&self.session);
    }

    /// Re-render only what depends on the thresholds
    fn refresh_thresholded(&mut self) {
        self.views.segmented = rgb_handle(&self.session.segmented_rgb());
        self.views.final_image = rgb_handle(&self.session.final_image());
    }

    fn select_sample(&mut self, index: usize) {
        match self.session.select_sample(index) {
            Ok(()) => {
                self.last_sample = None;
                self.refresh();
                self.status = format!(
                    "Sample {} of {}",
                    self.session.active_sample() + 1,
                    self.session.sample_count()
                );
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ThresholdChanged(bound, channel, value) => {
                let old = self.session.set_threshold(bound, channel, value);
                if old != value {
                    self.refresh_thresholded();
                    if let Some((x, y)) = self.last_sample.as_ref().map(|r| (r.x, r.y)) {
                        self.last_sample = self.session.sample(x, y).ok();
                    }
                }
                Task::none()
            }
            Message::CursorMoved(point) => {
                self.cursor = Some(point);
                Task::none()
            }
            Message::Probe => {
                if let Some(point) = self.cursor {
                    let x = point.x.max(0.0) as u32;
                    let y = point.y.max(0.0) as u32;
                    match self.session.sample(x, y) {
                        Ok(report) => {
                            self.status = report.to_string();
                            self.last_sample = Some(report);
                        }
                        Err(e) => self.status = e.to_string(),
                    }
                }
                Task::none()
            }
            Message::PreviousSample => {
                let index = self.session.active_sample();
                if index > 0 {
                    self.select_sample(index - 1);
                }
                Task::none()
            }
            Message::NextSample => {
                let index = self.session.active_sample() + 1;
                if index < self.session.sample_count() {
                    self.select_sample(index);
                }
                Task::none()
            }
            Message::ResetThresholds => {
                self.session.set_thresholds(ThresholdTable::CALIBRATED);
                self.refresh_thresholded();
                self.status = format!("Thresholds reset to {}", ThresholdTable::CALIBRATED);
                Task::none()
            }
            Message::Save => {
                let file = self.session.calibration_file();
                Task::perform(
                    async move {
                        let handle = AsyncFileDialog::new()
                            .set_title("Save calibration")
                            .add_filter("Calibration", &["json"])
                            .save_file()
                            .await;
                        match handle {
                            Some(handle) => {
                                let path = handle.path().to_path_buf();
                                match file.save_async(&path).await {
                                    Ok(()) => Ok(Some(path)),
                                    Err(e) => Err(e.to_string()),
                                }
                            }
                            None => Ok(None),
                        }
                    },
                    Message::Saved,
                )
            }
            Message::Saved(result) => {
                match result {
                    Ok(Some(path)) => {
                        info!("Saved calibration to {}", path.display());
                        self.status = format!("Saved {}", path.display());
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Saving calibration failed: {}", e);
                        self.status = e;
                    }
                }
                Task::none()
            }
            Message::Load => Task::perform(
                async {
                    let handle = AsyncFileDialog::new()
                        .set_title("Load calibration")
                        .add_filter("Calibration", &["json"])
                        .pick_file()
                        .await;
                    match handle {
                        Some(handle) => CalibrationFile::load_async(handle.path())
                            .await
                            .map(Some)
                            .map_err(|e| e.to_string()),
                        None => Ok(None),
                    }
                },
                Message::Loaded,
            ),
            Message::Loaded(result) => {
                match result {
                    Ok(Some(file)) => match self.session.apply_calibration(file) {
                        Ok(thresholds) => {
                            self.refresh();
                            self.status = format!("Loaded thresholds {}", thresholds);
                        }
                        Err(e) => {
                            warn!("Rejected calibration file: {}", e);
                            self.status = e.to_string();
                        }
                    },
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Loading calibration failed: {}", e);
                        self.status = e;
                    }
                }
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let original = mouse_area(
            image(self.views.original.clone()).content_fit(ContentFit::None),
        )
        .on_move(Message::CursorMoved)
        .on_press(Message::Probe);

        let frames = column![
            row![
                panel("Original picture for calibration", original),
                panel(
                    "Foreground mask",
                    image(self.views.foreground.clone()).content_fit(ContentFit::None)
                ),
            ]
            .spacing(10),
            row![
                panel(
                    "Calibrated YCC threshold",
                    image(self.views.segmented.clone()).content_fit(ContentFit::None)
                ),
                panel(
                    "Final image",
                    image(self.views.final_image.clone()).content_fit(ContentFit::None)
                ),
            ]
            .spacing(10),
        ]
        .spacing(10);

        let thresholds = self.session.thresholds();
        let mut sliders = column![].spacing(4);
        for channel in Channel::ALL {
            for bound in Bound::ALL {
                sliders = sliders.push(threshold_slider(bound, channel, thresholds.get(bound, channel)));
            }
        }

        let active = self.session.active_sample();
        let count = self.session.sample_count();
        let controls = row![
            button("Previous").on_press_maybe((active > 0).then_some(Message::PreviousSample)),
            text(format!("Sample {} / {}", active + 1, count)),
            button("Next").on_press_maybe((active + 1 < count).then_some(Message::NextSample)),
            button("Reset").on_press(Message::ResetThresholds),
            button("Save...").on_press(Message::Save),
            button("Load...").on_press(Message::Load),
        ]
        .spacing(10);

        let skin = self
            .last_sample
            .as_ref()
            .map(|r| if r.is_skin() { "skin" } else { "rejected" })
            .unwrap_or("");

        let content = column![
            frames,
            panel("Thresholds", sliders),
            controls,
            text(&self.status),
            text(skin),
        ]
        .spacing(12)
        .padding(20);

        scrollable(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}
