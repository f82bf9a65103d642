use image::{GrayImage, Luma, Rgb};

use crate::models::{Channel, ThresholdTable};
use crate::segmentation::color::YccImage;

/// Build a 256-entry table that zeroes everything outside the open band `(low, high)`
pub fn build_lut(low: u8, high: u8) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (j, entry) in lut.iter_mut().enumerate() {
        let value = j as u8;
        *entry = if value <= low || value >= high { 0 } else { value };
    }
    lut
}

/// One lookup table per YCrCb channel
#[derive(Clone)]
pub struct ChannelLuts {
    tables: [[u8; 256]; 3],
}

impl ChannelLuts {
    pub fn from_table(thresholds: &ThresholdTable) -> Self {
        let tables = Channel::ALL.map(|ch| {
            let (low, high) = thresholds.band(ch);
            build_lut(low, high)
        });
        Self { tables }
    }

    pub fn lookup(&self, channel: Channel, value: u8) -> u8 {
        self.tables[channel.index()][value as usize]
    }

    /// Run every channel of a pixel through its table
    pub fn apply_pixel(&self, pixel: Rgb<u8>) -> Rgb<u8> {
        Rgb([
            self.tables[0][pixel[0] as usize],
            self.tables[1][pixel[1] as usize],
            self.tables[2][pixel[2] as usize],
        ])
    }

    /// All three channels survive the lookup
    pub fn accepts(&self, pixel: Rgb<u8>) -> bool {
        (0..3).all(|c| self.tables[c][pixel[c] as usize] != 0)
    }
}

/// Apply each channel's threshold table and recombine the channels
pub fn threshold_skin_color(img: &YccImage, thresholds: &ThresholdTable) -> YccImage {
    let luts = ChannelLuts::from_table(thresholds);
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        *pixel = luts.apply_pixel(*pixel);
    }
    out
}

/// Binary skin mask: 255 where every channel passes its band
pub fn skin_mask(img: &YccImage, thresholds: &ThresholdTable) -> GrayImage {
    let luts = ChannelLuts::from_table(thresholds);
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        if luts.accepts(*img.get_pixel(x, y)) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
