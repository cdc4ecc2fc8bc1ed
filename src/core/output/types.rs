//! Types for the output module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Operation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Copy files to destination (keep originals)
    #[default]
    Copy,
    /// Move files to destination
    Move,
}

/// One file in the output sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFile {
    /// 1-based position in the sequence
    pub position: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Where every sequenced image will be written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPlan {
    pub destination_dir: PathBuf,
    pub files: Vec<PlannedFile>,
}

impl OutputPlan {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A file that could not be written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Result of executing the plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputResult {
    /// Destinations written successfully, in sequence order
    pub written: Vec<PathBuf>,
    pub total_size_bytes: u64,
    pub duration_ms: u64,
    pub failures: Vec<OutputFailure>,
    /// Entries already in the destination before writing started
    pub existing_entries: usize,
}
