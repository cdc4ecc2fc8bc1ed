//! Pipeline execution implementation.

use crate::core::comparator::{worker_pool, HistogramMetric, MatrixBuilder};
use crate::core::histogram::{Histogram, HistogramConfig, DEFAULT_BINS};
use crate::core::output::{OperationMode, OutputExecutor, OutputPlanner, OutputResult};
use crate::core::scanner::{InputResolver, ScanConfig};
use crate::core::sequencer::{GreedyChain, Permutation};
use crate::error::{ExtractError, SequenceError, SorterError};
use crate::events::{
    null_sender, Event, EventSender, ExtractEvent, ExtractProgress, MatrixEvent, OutputEvent,
    PipelineEvent, PipelinePhase, PipelineSummary,
};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// One input image after extraction
#[derive(Debug)]
pub struct SortItem {
    pub path: PathBuf,
    pub histogram: Result<Histogram, ExtractError>,
}

/// An image left out of the sequence
#[derive(Debug, Clone, Serialize)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of pipeline execution
#[derive(Debug, Serialize)]
pub struct SortResult {
    /// Images in their new order
    pub order: Vec<PathBuf>,
    /// Visiting order as indices into the images that survived extraction
    pub permutation: Permutation,
    /// Inputs left out under ignore-errors: bad arguments and unreadable
    /// directory entries first, then images that failed to decode
    pub skipped: Vec<SkippedImage>,
    /// Number of images given as input
    pub total_images: usize,
    /// Sum of distances between neighbours in `order`
    pub total_distance: f64,
    /// What was written; `None` for dry runs
    pub output: Option<OutputResult>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SortResult {
    /// Files that failed to write, if any
    pub fn output_failures(&self) -> usize {
        self.output.as_ref().map(|o| o.failures.len()).unwrap_or(0)
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Input files or directories
    pub paths: Vec<PathBuf>,
    /// Where the numbered sequence is written
    pub output_dir: PathBuf,
    /// Histogram bins per channel
    pub bins: u32,
    /// Worker threads for extraction and comparison
    pub threads: usize,
    /// Histogram distance metric
    pub metric: HistogramMetric,
    /// Drop unreadable images instead of aborting
    pub ignore_errors: bool,
    /// Copy or move into the output directory
    pub operation: OperationMode,
    /// Compute the order without writing anything
    pub dry_run: bool,
    /// Input resolution settings
    pub scan_config: ScanConfig,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            output_dir: PathBuf::from("sorted"),
            bins: DEFAULT_BINS,
            threads: 1,
            metric: HistogramMetric::default(),
            ignore_errors: false,
            operation: OperationMode::default(),
            dry_run: false,
            scan_config: ScanConfig::default(),
        }
    }
}

/// Builder for pipeline configuration
pub struct SorterBuilder {
    config: SortConfig,
}

impl SorterBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: SortConfig::default(),
        }
    }

    /// Input files or directories
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.paths = paths;
        self
    }

    /// Output directory
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output_dir = dir;
        self
    }

    /// Histogram bins per channel
    pub fn bins(mut self, bins: u32) -> Self {
        self.config.bins = bins;
        self
    }

    /// Worker thread count
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Histogram distance metric
    pub fn metric(mut self, metric: HistogramMetric) -> Self {
        self.config.metric = metric;
        self
    }

    /// Skip unreadable images instead of aborting
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.config.ignore_errors = ignore;
        self
    }

    /// Copy or move
    pub fn operation(mut self, operation: OperationMode) -> Self {
        self.config.operation = operation;
        self
    }

    /// Skip writing output
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Descend into subdirectories of directory arguments
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.scan_config.recursive = recursive;
        self
    }

    /// Descend into symlinked directories while recursing
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.scan_config.follow_symlinks = follow;
        self
    }

    /// Include hidden files when expanding directories
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Set input resolution configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Sorter {
        Sorter {
            config: self.config,
        }
    }
}

impl Default for SorterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The sorting pipeline
pub struct Sorter {
    config: SortConfig,
}

impl Sorter {
    /// Create a new pipeline builder
    pub fn builder() -> SorterBuilder {
        SorterBuilder::new()
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<SortResult, SorterError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Files that fail to write do not make this return an error; they are
    /// listed in [`SortResult::output`] so the caller can report them.
    pub fn run_with_events(&self, events: &EventSender) -> Result<SortResult, SorterError> {
        events.send(Event::Pipeline(PipelineEvent::Started));

        let result = self.execute(events);
        if let Err(ref e) = result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    fn execute(&self, events: &EventSender) -> Result<SortResult, SorterError> {
        let start_time = Instant::now();

        if self.config.threads == 0 {
            return Err(SorterError::Config(
                "threads must be at least 1".to_string(),
            ));
        }

        let inputs = InputResolver::new(self.config.scan_config.clone())
            .ignore_errors(self.config.ignore_errors)
            .resolve(&self.config.paths)?;
        let images = inputs.images;
        let total_images = images.len() + inputs.rejected.len();
        info!(images = total_images, threads = self.config.threads, "starting sort");

        let mut skipped: Vec<SkippedImage> = inputs
            .rejected
            .iter()
            .map(|e| SkippedImage {
                path: e.path().map(Path::to_path_buf).unwrap_or_default(),
                reason: e.to_string(),
            })
            .collect();
        for item in &skipped {
            events.skipped(item.path.clone(), item.reason.clone());
        }

        let extractor = HistogramConfig::new().bins(self.config.bins).build()?;
        let pool = worker_pool(self.config.threads)?;

        // Phase 1: histograms
        events.phase(PipelinePhase::Extracting);
        events.send(Event::Extract(ExtractEvent::Started {
            total_images: images.len(),
        }));

        let completed = AtomicUsize::new(0);
        let items: Vec<SortItem> = pool.install(|| {
            images
                .par_iter()
                .map(|path| {
                    let histogram = extractor.extract(path);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    events.send(Event::Extract(ExtractEvent::Progress(ExtractProgress {
                        completed: done,
                        total: images.len(),
                        current_path: path.clone(),
                    })));
                    SortItem {
                        path: path.clone(),
                        histogram,
                    }
                })
                .collect()
        });

        let (paths, histograms, unreadable) = self.partition(items, events)?;
        skipped.extend(unreadable);

        events.send(Event::Extract(ExtractEvent::Completed {
            extracted: histograms.len(),
            skipped: skipped.len(),
        }));

        if histograms.is_empty() {
            return Err(SequenceError::EmptyInput.into());
        }

        // Phase 2: distance matrix
        events.phase(PipelinePhase::Measuring);
        let n = histograms.len();
        events.send(Event::Matrix(MatrixEvent::Started {
            total_images: n,
            total_comparisons: n * (n - 1) / 2,
            workers: self.config.threads,
        }));

        let matrix_start = Instant::now();
        let matrix = MatrixBuilder::new(self.config.metric).build_in(&pool, &histograms)?;
        events.send(Event::Matrix(MatrixEvent::Completed {
            duration_ms: matrix_start.elapsed().as_millis() as u64,
        }));

        // Phase 3: ordering
        events.phase(PipelinePhase::Sequencing);
        let permutation = GreedyChain::new().sequence(&matrix)?;
        let total_distance = permutation.total_distance(&matrix);
        let order = permutation.apply(&paths);
        debug!(total_distance, "sequence built");

        // Phase 4: writing
        let output = if self.config.dry_run {
            None
        } else {
            Some(self.write(&order, events)?)
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images,
                sequenced: order.len(),
                skipped: skipped.len(),
                total_distance,
                duration_ms,
            },
        }));

        Ok(SortResult {
            order,
            permutation,
            skipped,
            total_images,
            total_distance,
            output,
            duration_ms,
        })
    }

    /// Split extraction results into survivors and skipped images, applying
    /// the ignore-errors policy. Input order is preserved.
    fn partition(
        &self,
        items: Vec<SortItem>,
        events: &EventSender,
    ) -> Result<(Vec<PathBuf>, Vec<Histogram>, Vec<SkippedImage>), SorterError> {
        let mut paths = Vec::with_capacity(items.len());
        let mut histograms = Vec::with_capacity(items.len());
        let mut skipped = Vec::new();

        for item in items {
            match item.histogram {
                Ok(histogram) => {
                    paths.push(item.path);
                    histograms.push(histogram);
                }
                Err(e) if self.config.ignore_errors => {
                    warn!(path = %item.path.display(), error = %e, "skipping unreadable image");
                    events.skipped(item.path.clone(), e.to_string());
                    skipped.push(SkippedImage {
                        path: item.path,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok((paths, histograms, skipped))
    }

    fn write(&self, order: &[PathBuf], events: &EventSender) -> Result<OutputResult, SorterError> {
        events.phase(PipelinePhase::Writing);
        events.send(Event::Output(OutputEvent::Started {
            total_files: order.len(),
        }));

        let plan = OutputPlanner::plan(order, &self.config.output_dir);
        let result = OutputExecutor::execute(&plan, self.config.operation, |done, total, name| {
            events.send(Event::Output(OutputEvent::Progress {
                completed: done,
                total,
                file_name: name.to_string(),
            }));
        })?;

        for failure in &result.failures {
            events.send(Event::Output(OutputEvent::Error {
                path: failure.source.clone(),
                message: failure.message.clone(),
            }));
        }
        events.send(Event::Output(OutputEvent::Completed {
            written: result.written.len(),
            failed: result.failures.len(),
        }));

        Ok(result)
    }
}
