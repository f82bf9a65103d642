use iced::{
    Element, Length,
    widget::{column, container, image::Handle, row, slider, text},
};
use ::image::{DynamicImage, GrayImage, RgbImage};

use crate::gui::Message;
use crate::models::{Bound, Channel};

/// Upload an RGB frame for display
pub fn rgb_handle(img: &RgbImage) -> Handle {
    let rgba = DynamicImage::ImageRgb8(img.clone()).to_rgba8();
    Handle::from_rgba(rgba.width(), rgba.height(), rgba.into_raw())
}

pub fn mask_handle(mask: &GrayImage) -> Handle {
    let rgba = DynamicImage::ImageLuma8(mask.clone()).to_rgba8();
    Handle::from_rgba(rgba.width(), rgba.height(), rgba.into_raw())
}

/// Titled, bordered box around one view
pub fn panel<'a>(title: &'a str, content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(column![text(title).size(16), content.into()].spacing(6))
        .style(container::bordered_box)
        .padding(8)
        .into()
}

/// One trackbar: label, 0..=255 slider and current value
pub fn threshold_slider<'a>(bound: Bound, channel: Channel, value: u8) -> Element<'a, Message> {
    row![
        text(format!("{} {}", bound, channel)).width(Length::Fixed(70.0)),
        slider(0..=255u8, value, move |v| Message::ThresholdChanged(bound, channel, v))
            .width(Length::Fixed(300.0)),
        text(value.to_string()).width(Length::Fixed(40.0)),
    ]
    .spacing(10)
    .into()
}
