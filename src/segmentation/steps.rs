use crate::models::ThresholdTable;
use crate::pipeline::{ColorSpace, MetadataValue, PipelineContext, PipelineData, PipelineStep};
use crate::segmentation::background::{self, MixtureConfig};
use crate::segmentation::color::{self, YccImage};
use crate::segmentation::{morphology, threshold};
use anyhow::Result;
use image::{DynamicImage, GrayImage};
use log::{debug, info};

/// Fraction of non-zero mask pixels
pub fn coverage(mask: &GrayImage) -> f32 {
    let total = mask.width() as usize * mask.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let set = mask.pixels().filter(|p| p[0] != 0).count();
    set as f32 / total as f32
}

/// Convert RGB frames to YCrCb
pub struct YccConversionStep;

impl PipelineStep for YccConversionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for mut item in data {
            item.require_space(ColorSpace::Rgb, self.name())?;
            let ycc = color::ycrcb_from_rgb(&item.image.to_rgb8());
            item.image = DynamicImage::ImageRgb8(ycc);
            item.space = ColorSpace::YCrCb;
            result.push(item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "YCrCb Conversion"
    }
}

/// Attach a foreground mask learned from a background-only frame
pub struct ForegroundMaskStep {
    /// Background frame, already in YCrCb
    pub background: YccImage,
    pub config: MixtureConfig,
}

impl PipelineStep for ForegroundMaskStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for mut item in data {
            item.require_space(ColorSpace::YCrCb, self.name())?;
            let frame = item.image.to_rgb8();
            let mask = background::foreground_mask(&self.background, &frame, &self.config)?;

            let ratio = coverage(&mask);
            if context.verbose {
                info!("  Foreground covers {:.1}% of the frame", ratio * 100.0);
            } else {
                debug!("Foreground covers {:.1}% of the frame", ratio * 100.0);
            }
            item.mask = Some(mask);
            result.push(item.with_metadata("foreground_ratio", MetadataValue::Float(ratio)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Foreground Mask"
    }
}

/// Zero every YCrCb channel value outside its threshold band
pub struct SkinThresholdStep {
    pub thresholds: ThresholdTable,
}

impl PipelineStep for SkinThresholdStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for mut item in data {
            item.require_space(ColorSpace::YCrCb, self.name())?;
            let ycc = item.image.to_rgb8();
            let skin = threshold::skin_mask(&ycc, &self.thresholds);
            let segmented = threshold::threshold_skin_color(&ycc, &self.thresholds);

            let ratio = coverage(&skin);
            if context.verbose {
                info!("  {} passes {:.1}% of the frame", self.thresholds, ratio * 100.0);
            }
            item.image = DynamicImage::ImageRgb8(segmented);
            item.metadata.insert("skin_ratio".to_string(), MetadataValue::Float(ratio));
            item.skin_mask = Some(match &item.mask {
                Some(foreground) => morphology::intersect_masks(foreground, &skin),
                None => skin,
            });
            result.push(item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Skin Threshold"
    }
}

/// Remove speckles from the attached masks with a morphological opening
pub struct MaskCleanupStep {
    pub radius: u8,
}

impl PipelineStep for MaskCleanupStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for mut item in data {
            if item.mask.is_none() && item.skin_mask.is_none() {
                return Err(anyhow::anyhow!("{} needs a mask from an earlier step", self.name()));
            }
            item.mask = item.mask.map(|m| morphology::open_mask(&m, self.radius));
            item.skin_mask = item.skin_mask.map(|m| morphology::open_mask(&m, self.radius));
            result.push(item.with_metadata("open_radius", MetadataValue::Int(self.radius as i32)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Mask Cleanup"
    }
}

/// Convert YCrCb frames back to RGB for display
pub struct RgbConversionStep;

impl PipelineStep for RgbConversionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for mut item in data {
            item.require_space(ColorSpace::YCrCb, self.name())?;
            let rgb = color::rgb_from_ycrcb(&item.image.to_rgb8());
            item.image = DynamicImage::ImageRgb8(rgb);
            item.space = ColorSpace::Rgb;
            result.push(item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "RGB Conversion"
    }
}

/// Black out everything the foreground mask rejects
pub struct ApplyMaskStep;

impl PipelineStep for ApplyMaskStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for mut item in data {
            item.require_space(ColorSpace::Rgb, self.name())?;
            if let Some(mask) = &item.mask {
                let masked = morphology::apply_mask(&item.image.to_rgb8(), mask);
                item.image = DynamicImage::ImageRgb8(masked);
                item.metadata.insert("masked".to_string(), MetadataValue::Bool(true));
            }
            result.push(item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Apply Mask"
    }
}
