//! # Histogram Module
//!
//! Computes the colour histogram used as each image's similarity fingerprint.
//!
//! ## How It Works
//! 1. Decode the file (zune-jpeg for JPEG, image crate otherwise)
//! 2. Convert every pixel to HSV
//! 3. Count pixels per bin for hue, saturation and value separately
//! 4. Concatenate the three channel histograms and normalise the whole
//!    vector to sum to 1
//!
//! The vector length is `bins * 3`, so every image in one run produces
//! vectors of the same length. More bins give finer matching at the cost of
//! slower comparisons.
//!
//! ## Example
//! ```rust,ignore
//! use histogram_sorter::core::histogram::HistogramConfig;
//!
//! let extractor = HistogramConfig::new().bins(16).build()?;
//! let histogram = extractor.extract(&path)?;
//! ```

pub mod decode;
pub mod hsv;

pub use decode::FastDecoder;

use crate::error::{ExtractError, SorterError};
use hsv::{bin_index, rgb_to_hsv};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of channels per histogram (hue, saturation, value)
pub const CHANNELS: usize = 3;

/// Default number of bins per channel
pub const DEFAULT_BINS: u32 = 10;

/// A normalised HSV histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    bins: u32,
    values: Vec<f64>,
}

impl Histogram {
    /// Wrap precomputed values.
    ///
    /// No normalisation is applied; callers building vectors by hand are
    /// responsible for their scale.
    pub fn from_values(bins: u32, values: Vec<f64>) -> Self {
        Self { bins, values }
    }

    /// Bins per channel
    pub fn bins(&self) -> u32 {
        self.bins
    }

    /// Total vector length
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// The slice belonging to one channel (0 = hue, 1 = saturation, 2 = value)
    pub fn channel(&self, channel: usize) -> &[f64] {
        let bins = self.bins as usize;
        &self.values[channel * bins..(channel + 1) * bins]
    }
}

/// Configuration builder for the extractor
#[derive(Debug, Clone)]
pub struct HistogramConfig {
    bins: u32,
}

impl HistogramConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self { bins: DEFAULT_BINS }
    }

    /// Set the number of bins per channel.
    ///
    /// Larger values distinguish finer colour differences but make every
    /// pairwise comparison proportionally slower.
    pub fn bins(mut self, bins: u32) -> Self {
        self.bins = bins;
        self
    }

    /// Build the extractor
    pub fn build(self) -> Result<HistogramExtractor, SorterError> {
        if self.bins == 0 {
            return Err(SorterError::Config(
                "bins must be a positive integer".to_string(),
            ));
        }
        Ok(HistogramExtractor { bins: self.bins })
    }
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes HSV histograms from images
#[derive(Debug, Clone)]
pub struct HistogramExtractor {
    bins: u32,
}

impl HistogramExtractor {
    /// Bins per channel
    pub fn bins(&self) -> u32 {
        self.bins
    }

    /// Length of every vector this extractor produces
    pub fn vector_len(&self) -> usize {
        self.bins as usize * CHANNELS
    }

    /// Decode `path` and compute its histogram
    pub fn extract(&self, path: &Path) -> Result<Histogram, ExtractError> {
        let image = FastDecoder::decode(path)?;
        self.histogram_of(&image)
            .ok_or_else(|| ExtractError::EmptyImage {
                path: path.to_path_buf(),
            })
    }

    /// Compute the histogram of an already-decoded image.
    ///
    /// Returns `None` for images without pixels.
    pub fn histogram_of(&self, image: &DynamicImage) -> Option<Histogram> {
        let rgb = image.to_rgb8();
        let pixel_count = rgb.width() as u64 * rgb.height() as u64;
        if pixel_count == 0 {
            return None;
        }

        let bins = self.bins as usize;
        let mut counts = vec![0u64; bins * CHANNELS];

        for pixel in rgb.pixels() {
            let hsv = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
            counts[bin_index(hsv.hue, 360.0, bins)] += 1;
            counts[bins + bin_index(hsv.saturation, 1.0, bins)] += 1;
            counts[2 * bins + bin_index(hsv.value, 1.0, bins)] += 1;
        }

        let total = (pixel_count * CHANNELS as u64) as f64;
        let values = counts.into_iter().map(|c| c as f64 / total).collect();

        Some(Histogram {
            bins: self.bins,
            values,
        })
    }
}
