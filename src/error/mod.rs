//! # Error Module
//!
//! Error types for the histogram sorter.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, indices, which invariant broke
//! - **Per-item vs fatal** - extraction and output failures name the file,
//!   sequencing failures name the violated invariant

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SorterError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Sequencing error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while resolving input paths
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Image doesn't exist: {path}")]
    NotFound { path: PathBuf },

    #[error("Not a regular file or directory: {path}")]
    NotAFile { path: PathBuf },

    #[error("Unsupported image format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read directory {path}: {reason}")]
    ReadDirectory { path: PathBuf, reason: String },

    #[error("No input images given")]
    NoInputs,
}

impl InputError {
    /// Path the error is about, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            InputError::NotFound { path }
            | InputError::NotAFile { path }
            | InputError::UnsupportedFormat { path }
            | InputError::ReadDirectory { path, .. } => Some(path),
            InputError::NoInputs => None,
        }
    }
}

/// Errors that occur while computing an image histogram
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Path of the image that failed
    pub fn path(&self) -> &PathBuf {
        match self {
            ExtractError::DecodeError { path, .. }
            | ExtractError::EmptyImage { path }
            | ExtractError::IoError { path, .. } => path,
        }
    }
}

/// Invariant violations in the distance matrix or sequencer.
///
/// These indicate a logic or configuration bug and always halt the run.
#[derive(Error, Debug, PartialEq)]
pub enum SequenceError {
    #[error("Nothing to sequence: no images survived histogram extraction")]
    EmptyInput,

    #[error(
        "Histogram dimension mismatch at item {index}: expected length {expected}, found {found}"
    )]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid distance matrix: {reason}")]
    InvalidMatrix { reason: String },

    #[error("Invalid permutation: {reason}")]
    InvalidPermutation { reason: String },
}

/// Errors that occur while writing the sorted sequence
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} of {total} files could not be written")]
    Incomplete { failed: usize, total: usize },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SorterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_includes_path() {
        let error = InputError::NotFound {
            path: PathBuf::from("/photos/missing.jpg"),
        };
        assert!(error.to_string().contains("/photos/missing.jpg"));
        assert_eq!(error.path(), Some(Path::new("/photos/missing.jpg")));
        assert_eq!(InputError::NoInputs.path(), None);
    }

    #[test]
    fn extract_error_includes_path_and_reason() {
        let error = ExtractError::DecodeError {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
        assert_eq!(error.path(), &PathBuf::from("/photos/broken.jpg"));
    }

    #[test]
    fn dimension_mismatch_names_the_invariant() {
        let error = SequenceError::DimensionMismatch {
            index: 3,
            expected: 30,
            found: 24,
        };
        let message = error.to_string();
        assert!(message.contains("dimension mismatch"));
        assert!(message.contains("item 3"));
    }

    #[test]
    fn empty_input_reads_as_nothing_to_sequence() {
        let error: SorterError = SequenceError::EmptyInput.into();
        assert!(error.to_string().contains("Nothing to sequence"));
    }
}
