//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the sorting pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Histogram extraction events
    Extract(ExtractEvent),
    /// Distance matrix events
    Matrix(MatrixEvent),
    /// Output materialization events
    Output(OutputEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during histogram extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractEvent {
    /// Extraction has started
    Started { total_images: usize },
    /// Progress update during extraction
    Progress(ExtractProgress),
    /// An image could not be read and was dropped from the run
    Skipped { path: PathBuf, message: String },
    /// Extraction completed
    Completed { extracted: usize, skipped: usize },
}

/// Progress information during extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractProgress {
    /// Number of images processed so far
    pub completed: usize,
    /// Total number of images
    pub total: usize,
    /// Image just processed
    pub current_path: PathBuf,
}

/// Events while building the distance matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatrixEvent {
    /// Matrix construction has started
    Started {
        total_images: usize,
        total_comparisons: usize,
        workers: usize,
    },
    /// Matrix construction completed
    Completed { duration_ms: u64 },
}

/// Events while writing the sequence to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputEvent {
    /// Writing has started
    Started { total_files: usize },
    /// Progress update while writing
    Progress {
        completed: usize,
        total: usize,
        file_name: String,
    },
    /// A single file failed to write
    Error { path: PathBuf, message: String },
    /// Writing completed
    Completed { written: usize, failed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Extracting,
    Measuring,
    Sequencing,
    Writing,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Images given as input
    pub total_images: usize,
    /// Images placed in the sequence
    pub sequenced: usize,
    /// Images dropped because they could not be read
    pub skipped: usize,
    /// Sum of distances between neighbours in the sequence
    pub total_distance: f64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Extracting => write!(f, "Reading histograms"),
            PipelinePhase::Measuring => write!(f, "Comparing"),
            PipelinePhase::Sequencing => write!(f, "Ordering"),
            PipelinePhase::Writing => write!(f, "Writing"),
        }
    }
}
