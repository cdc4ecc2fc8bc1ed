//! Image decoding with a fast path for JPEG.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than image crate),
//! falls back to image crate for everything else.

use crate::error::ExtractError;
use image::{DynamicImage, ImageBuffer, ImageReader, Luma, Rgb, Rgba};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Which decoder a file is routed to first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Jpeg,
    Other,
}

impl SourceKind {
    /// Detect from file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg" | "jpe") => Self::Jpeg,
            _ => Self::Other,
        }
    }
}

/// Decoder that picks the fastest available backend per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image from a file path.
    pub fn decode(path: &Path) -> Result<DynamicImage, ExtractError> {
        let bytes = fs::read(path).map_err(|e| ExtractError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        match SourceKind::from_path(path) {
            SourceKind::Jpeg => {
                Self::decode_jpeg(path, &bytes).or_else(|_| Self::decode_fallback(path, &bytes))
            }
            SourceKind::Other => Self::decode_fallback(path, &bytes),
        }
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(path: &Path, bytes: &[u8]) -> Result<DynamicImage, ExtractError> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder.decode().map_err(|e| ExtractError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| ExtractError::DecodeError {
            path: path.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;
        let buffer_error = |kind: &str| ExtractError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("Failed to create {} buffer", kind),
        };

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| buffer_error("RGB"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| buffer_error("RGBA"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| buffer_error("Luma"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            _ => return Self::decode_fallback(path, bytes),
        };

        Ok(image)
    }

    /// image crate decoding; the extension is a hint, magic bytes win
    fn decode_fallback(path: &Path, bytes: &[u8]) -> Result<DynamicImage, ExtractError> {
        let decode_error = |reason: String| ExtractError::DecodeError {
            path: path.to_path_buf(),
            reason,
        };

        let mut reader = ImageReader::new(Cursor::new(bytes));
        if let Ok(format) = image::ImageFormat::from_path(path) {
            reader.set_format(format);
        }

        reader
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?
            .decode()
            .map_err(|e| decode_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    #[test]
    fn source_kind_detection() {
        assert_eq!(SourceKind::from_path(Path::new("a.jpg")), SourceKind::Jpeg);
        assert_eq!(SourceKind::from_path(Path::new("a.JPEG")), SourceKind::Jpeg);
        assert_eq!(SourceKind::from_path(Path::new("a.png")), SourceKind::Other);
        assert_eq!(SourceKind::from_path(Path::new("noext")), SourceKind::Other);
    }

    #[test]
    fn decodes_png_written_by_image_crate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("red.png");
        RgbImage::from_pixel(4, 3, Rgb([255, 0, 0])).save(&path).unwrap();

        let image = FastDecoder::decode(&path).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 3);
    }

    #[test]
    fn decodes_jpeg_through_fast_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("grey.jpg");
        RgbImage::from_pixel(16, 16, Rgb([128, 128, 128]))
            .save(&path)
            .unwrap();

        let image = FastDecoder::decode(&path).unwrap();
        assert_eq!(image.width(), 16);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.png");
        fs::write(&path, b"this is not a valid image file").unwrap();

        let err = FastDecoder::decode(&path).unwrap_err();
        assert!(matches!(err, ExtractError::DecodeError { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FastDecoder::decode(Path::new("/nonexistent/photo.png")).unwrap_err();
        assert!(matches!(err, ExtractError::IoError { .. }));
    }
}
