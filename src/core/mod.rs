//! # Core Module
//!
//! The UI-agnostic sorting engine.
//!
//! ## Modules
//! - `scanner` - Resolves input paths into image files
//! - `histogram` - Decodes images and computes HSV histograms
//! - `comparator` - Histogram metrics and the pairwise distance matrix
//! - `sequencer` - Greedy nearest-neighbour ordering
//! - `output` - Writes the ordered images into the output folder
//! - `pipeline` - Orchestrates the full workflow

pub mod comparator;
pub mod histogram;
pub mod output;
pub mod pipeline;
pub mod scanner;
pub mod sequencer;

// Re-export commonly used types
pub use comparator::{DistanceMatrix, HistogramMetric, MatrixBuilder};
pub use histogram::{Histogram, HistogramExtractor};
pub use pipeline::{SortResult, Sorter};
pub use sequencer::{GreedyChain, Permutation};
