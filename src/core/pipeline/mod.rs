//! # Pipeline Module
//!
//! Orchestrates a full sorting run.
//!
//! ## Pipeline Stages
//! 1. **Resolve** - Validate input files and expand directories
//! 2. **Extract** - Compute an HSV histogram per image
//! 3. **Measure** - Build the pairwise distance matrix
//! 4. **Sequence** - Order images with the greedy nearest-neighbour chain
//! 5. **Write** - Copy (or move) images into the output folder, numbered
//!
//! ## Parallelism
//! Extraction and measuring share one rayon pool sized by `threads`.
//! Sequencing is single-threaded.

mod executor;

pub use executor::{SkippedImage, SortConfig, SortItem, SortResult, Sorter, SorterBuilder};
