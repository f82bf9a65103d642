use image::{ImageBuffer, Rgb, RgbImage};

/// Three-channel 8-bit image whose channels are Y, Cr, Cb
pub type YccImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Convert one RGB pixel to YCrCb (BT.601, full range)
pub fn ycrcb_pixel(pixel: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = pixel.0.map(f32::from);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cr = (r - y) * 0.713 + 128.0;
    let cb = (b - y) * 0.564 + 128.0;
    Rgb([saturate(y), saturate(cr), saturate(cb)])
}

/// Convert one YCrCb pixel back to RGB
pub fn rgb_pixel(pixel: Rgb<u8>) -> Rgb<u8> {
    let [y, cr, cb] = pixel.0.map(f32::from);
    let cr = cr - 128.0;
    let cb = cb - 128.0;
    let r = y + 1.403 * cr;
    let g = y - 0.714 * cr - 0.344 * cb;
    let b = y + 1.773 * cb;
    Rgb([saturate(r), saturate(g), saturate(b)])
}

pub fn ycrcb_from_rgb(img: &RgbImage) -> YccImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| ycrcb_pixel(*img.get_pixel(x, y)))
}

pub fn rgb_from_ycrcb(img: &YccImage) -> RgbImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| rgb_pixel(*img.get_pixel(x, y)))
}
