use image::{GrayImage, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;

/// Morphological opening to drop speckles smaller than `radius`
pub fn open_mask(mask: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }
    open(mask, Norm::LInf, radius)
}

/// Copy only the pixels whose mask value is non-zero; the rest stay black
pub fn apply_mask(img: &RgbImage, mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let keep = x < mask.width() && y < mask.height() && mask.get_pixel(x, y)[0] != 0;
        if keep { *img.get_pixel(x, y) } else { Rgb([0, 0, 0]) }
    })
}

/// Pixel-wise AND of two masks of equal size
pub fn intersect_masks(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let both = a.get_pixel(x, y)[0] != 0
            && x < b.width()
            && y < b.height()
            && b.get_pixel(x, y)[0] != 0;
        image::Luma([if both { 255 } else { 0 }])
    })
}
