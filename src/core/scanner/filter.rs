//! File filtering logic for input resolution.

use std::collections::HashSet;
use std::path::Path;

/// Extensions the decoder stack may be able to read.
///
/// Whether a given file actually decodes is decided later; this list only
/// keeps obviously unrelated files out of the run.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "bmp", "dib", // Windows bitmaps
    "jpeg", "jpg", "jpe", // JPEG
    "jp2", // JPEG 2000
    "png", // Portable Network Graphics
    "webp", // WebP
    "pbm", "pgm", "ppm", "pxm", "pnm", // Portable image formats
    "pfm", // Portable float map
    "sr", "ras", // Sun rasters
    "tiff", "tif", // TIFF
    "exr", // OpenEXR
    "hdr", "pic", // Radiance HDR
];

/// Filters files to determine if they are supported images
pub struct ImageFilter {
    extensions: HashSet<String>,
    include_hidden: bool,
}

impl ImageFilter {
    /// Create a new filter with default supported extensions
    pub fn new() -> Self {
        Self {
            extensions: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Whether the extension of `path` is one we accept
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Check if a file found while walking a directory should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }
        self.is_supported(path)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
