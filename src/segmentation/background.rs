//! Adaptive Gaussian-mixture background model.
//!
//! Every pixel keeps up to `max_modes` Gaussians (shared variance across the
//! three channels), sorted by weight. A pixel belongs to the background when it
//! lies close to one of the heaviest modes whose cumulative weight stays below
//! `background_ratio`. The model learns from every frame passed to
//! [`BackgroundSubtractor::apply`].

use image::{GrayImage, Luma, Rgb};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;
use crate::segmentation::color::YccImage;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Tunables of the mixture model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixtureConfig {
    /// Frames that influence the model; sets the automatic learning rate
    pub history: u32,
    /// Squared Mahalanobis distance under which a pixel matches a background mode
    pub var_threshold: f32,
    pub detect_shadows: bool,
    pub max_modes: usize,
    /// Cumulative weight of the modes that describe the background
    pub background_ratio: f32,
    /// Squared distance under which a pixel updates an existing mode
    pub var_threshold_gen: f32,
    pub var_init: f32,
    pub var_min: f32,
    pub var_max: f32,
    /// Prior that pulls weights of unsupported modes towards zero
    pub complexity_reduction: f32,
    pub shadow_value: u8,
    /// Darkest brightness ratio still reported as shadow
    pub shadow_threshold: f32,
}

impl MixtureConfig {
    /// Learns almost instantly from two static frames: background then hand
    pub fn quick_learning() -> Self {
        Self {
            history: 1,
            var_threshold: 75.0,
            detect_shadows: false,
            ..Self::default()
        }
    }
}

impl Default for MixtureConfig {
    fn default() -> Self {
        Self {
            history: 500,
            var_threshold: 16.0,
            detect_shadows: true,
            max_modes: 5,
            background_ratio: 0.9,
            var_threshold_gen: 9.0,
            var_init: 15.0,
            var_min: 4.0,
            var_max: 75.0,
            complexity_reduction: 0.05,
            shadow_value: 127,
            shadow_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Mode {
    weight: f32,
    variance: f32,
    mean: [f32; 3],
}

impl Mode {
    fn distance2(&self, data: &[f32; 3]) -> f32 {
        (0..3).map(|c| (self.mean[c] - data[c]).powi(2)).sum()
    }
}

/// Per-pixel Gaussian mixture background subtractor
pub struct BackgroundSubtractor {
    config: MixtureConfig,
    width: u32,
    height: u32,
    modes: Vec<Vec<Mode>>,
    frames: u32,
}

impl BackgroundSubtractor {
    pub fn new(config: MixtureConfig) -> Self {
        Self {
            config,
            width: 0,
            height: 0,
            modes: Vec::new(),
            frames: 0,
        }
    }

    pub fn config(&self) -> &MixtureConfig {
        &self.config
    }

    pub fn frames_seen(&self) -> u32 {
        self.frames
    }

    /// Forget everything learned so far
    pub fn reset(&mut self) {
        self.width = 0;
        self.height = 0;
        self.modes.clear();
        self.frames = 0;
    }

    fn validate(&self) -> Result<(), CalibrationError> {
        let c = &self.config;
        if c.max_modes == 0 {
            return Err(CalibrationError::invalid_parameter("max_modes", c.max_modes));
        }
        if c.history == 0 {
            return Err(CalibrationError::invalid_parameter("history", c.history));
        }
        if c.var_min > c.var_max || c.var_min <= 0.0 {
            return Err(CalibrationError::invalid_parameter(
                "var_min",
                format!("{} (var_max {})", c.var_min, c.var_max),
            ));
        }
        Ok(())
    }

    /// Classify every pixel of `frame` and learn from it.
    ///
    /// Returns a mask with [`FOREGROUND`], [`BACKGROUND`] or the configured
    /// shadow value. `learning_rate` of `None` uses `1 / min(2 * frames, history)`.
    pub fn apply(
        &mut self,
        frame: &YccImage,
        learning_rate: Option<f32>,
    ) -> Result<GrayImage, CalibrationError> {
        self.validate()?;
        let dims = frame.dimensions();
        if self.frames == 0 {
            self.width = dims.0;
            self.height = dims.1;
            let pixels = dims.0 as usize * dims.1 as usize;
            self.modes = vec![Vec::with_capacity(self.config.max_modes); pixels];
        } else if dims != (self.width, self.height) {
            return Err(CalibrationError::dimension_mismatch((self.width, self.height), dims));
        }

        self.frames += 1;
        let alpha = match learning_rate {
            Some(rate) if rate >= 0.0 && self.frames > 1 => rate,
            _ => 1.0 / (2 * self.frames).min(self.config.history) as f32,
        };
        debug!("Background model frame {} (learning rate {:.3})", self.frames, alpha);

        let mut mask = GrayImage::new(self.width, self.height);
        let width = self.width as usize;
        for (idx, modes) in self.modes.iter_mut().enumerate() {
            let x = (idx % width) as u32;
            let y = (idx / width) as u32;
            let value = classify_and_update(&self.config, modes, *frame.get_pixel(x, y), alpha);
            mask.put_pixel(x, y, Luma([value]));
        }

        Ok(mask)
    }
}

fn classify_and_update(config: &MixtureConfig, modes: &mut Vec<Mode>, pixel: Rgb<u8>, alpha: f32) -> u8 {
    let data = pixel.0.map(f32::from);
    let one_minus_alpha = 1.0 - alpha;
    let prune = -alpha * config.complexity_reduction;

    let mut background = false;
    let mut fits = false;
    let mut total_weight = 0.0f32;

    let mut i = 0;
    while i < modes.len() {
        let mut weight = one_minus_alpha * modes[i].weight + prune;
        let mut pos = i;

        if !fits {
            let variance = modes[i].variance;
            let dist2 = modes[i].distance2(&data);

            if total_weight < config.background_ratio && dist2 < config.var_threshold * variance {
                background = true;
            }

            if dist2 < config.var_threshold_gen * variance {
                fits = true;
                weight += alpha;
                let k = alpha / weight;
                let mode = &mut modes[i];
                for c in 0..3 {
                    mode.mean[c] += k * (data[c] - mode.mean[c]);
                }
                mode.variance = (variance + k * (dist2 - variance)).clamp(config.var_min, config.var_max);

                // keep modes ordered by weight
                while pos > 0 && weight >= modes[pos - 1].weight {
                    modes.swap(pos, pos - 1);
                    pos -= 1;
                }
            }
        }

        if weight < -prune {
            modes.remove(pos);
            continue;
        }

        modes[pos].weight = weight;
        total_weight += weight;
        i += 1;
    }

    if total_weight > 0.0 {
        let norm = 1.0 / total_weight;
        for mode in modes.iter_mut() {
            mode.weight *= norm;
        }
    }

    if !fits {
        if modes.len() >= config.max_modes {
            modes.pop();
        }
        let weight = if modes.is_empty() {
            1.0
        } else {
            for mode in modes.iter_mut() {
                mode.weight *= one_minus_alpha;
            }
            alpha
        };
        modes.push(Mode {
            weight,
            variance: config.var_init,
            mean: data,
        });
        let mut j = modes.len() - 1;
        while j > 0 && modes[j].weight >= modes[j - 1].weight {
            modes.swap(j, j - 1);
            j -= 1;
        }
    }

    if background {
        BACKGROUND
    } else if config.detect_shadows && is_shadow(config, modes, &data) {
        config.shadow_value
    } else {
        FOREGROUND
    }
}

/// A pixel is a shadow when it is a darker copy of a background mode
fn is_shadow(config: &MixtureConfig, modes: &[Mode], data: &[f32; 3]) -> bool {
    let mut total_weight = 0.0f32;
    for mode in modes {
        let numerator: f32 = (0..3).map(|c| data[c] * mode.mean[c]).sum();
        let denominator: f32 = mode.mean.iter().map(|m| m * m).sum();
        if denominator == 0.0 {
            return false;
        }

        if numerator <= denominator && numerator >= config.shadow_threshold * denominator {
            let a = numerator / denominator;
            let dist2a: f32 = (0..3).map(|c| (a * mode.mean[c] - data[c]).powi(2)).sum();
            if dist2a < config.var_threshold * mode.variance * a * a {
                return true;
            }
        }

        total_weight += mode.weight;
        if total_weight > config.background_ratio {
            return false;
        }
    }
    false
}

/// Learn `background`, then return the foreground mask of `frame`
pub fn foreground_mask(
    background: &YccImage,
    frame: &YccImage,
    config: &MixtureConfig,
) -> Result<GrayImage, CalibrationError> {
    let mut subtractor = BackgroundSubtractor::new(config.clone());
    subtractor.apply(background, None)?;
    subtractor.apply(frame, None)
}
