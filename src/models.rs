use serde::{Deserialize, Serialize};
use std::fmt;

/// Channels of a YCrCb image, in buffer order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Y,
    Cr,
    Cb,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Y, Channel::Cr, Channel::Cb];

    /// Position of the channel inside a pixel
    pub fn index(self) -> usize {
        match self {
            Channel::Y => 0,
            Channel::Cr => 1,
            Channel::Cb => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Y => "Y",
            Channel::Cr => "Cr",
            Channel::Cb => "Cb",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bound {
    Low,
    High,
}

impl Bound {
    pub const ALL: [Bound; 2] = [Bound::Low, Bound::High];

    pub fn index(self) -> usize {
        match self {
            Bound::Low => 0,
            Bound::High => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bound::Low => "Low",
            Bound::High => "High",
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Low/high cutoffs for each YCrCb channel, indexed `[bound][channel]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub values: [[u8; 3]; 2],
}

impl ThresholdTable {
    /// Values found by hand calibration on indoor footage
    pub const CALIBRATED: ThresholdTable = ThresholdTable {
        values: [[112, 132, 114], [211, 156, 133]],
    };

    pub fn new(low: [u8; 3], high: [u8; 3]) -> Self {
        Self { values: [low, high] }
    }

    pub fn get(&self, bound: Bound, channel: Channel) -> u8 {
        self.values[bound.index()][channel.index()]
    }

    /// Store a new cutoff and hand back the one it replaced
    pub fn set(&mut self, bound: Bound, channel: Channel, value: u8) -> u8 {
        std::mem::replace(&mut self.values[bound.index()][channel.index()], value)
    }

    pub fn band(&self, channel: Channel) -> (u8, u8) {
        (self.get(Bound::Low, channel), self.get(Bound::High, channel))
    }

    /// Whether `value` lies strictly between the channel's cutoffs
    pub fn passes(&self, channel: Channel, value: u8) -> bool {
        let (low, high) = self.band(channel);
        value > low && value < high
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::CALIBRATED
    }
}

impl fmt::Display for ThresholdTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Channel::ALL
            .iter()
            .map(|&ch| {
                let (low, high) = self.band(ch);
                format!("{}=({}, {})", ch, low, high)
            })
            .collect();
        f.write_str(&parts.join(" "))
    }
}

/// Result of probing a single pixel of the active sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleReport {
    pub x: u32,
    pub y: u32,
    /// Pixel as stored in the YCrCb frame
    pub original_ycc: [u8; 3],
    /// Same pixel converted back to RGB
    pub original_rgb: [u8; 3],
    /// Pixel after the threshold lookup
    pub segmented_ycc: [u8; 3],
}

impl SampleReport {
    /// True when no channel was zeroed by the lookup
    pub fn is_skin(&self) -> bool {
        self.original_ycc == self.segmented_ycc && self.segmented_ycc.iter().all(|&v| v != 0)
    }
}

impl fmt::Display for SampleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sample at ({},{}): original YCC {:?} (RGB {:?}) segmented YCC {:?}",
            self.x, self.y, self.original_ycc, self.original_rgb, self.segmented_ycc
        )
    }
}
