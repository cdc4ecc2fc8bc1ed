//! # Comparator Module
//!
//! Builds the pairwise distance matrix over all extracted histograms.
//!
//! ## How It Works
//! 1. Check that every histogram has the same length
//! 2. Compute the upper triangle (`i < j`) with the configured metric,
//!    one matrix row per task, across a bounded rayon pool
//! 3. Mirror the upper triangle into the lower one; the diagonal stays 0
//!
//! ## Cost
//! Building the matrix is `O(N² · L)` for `N` images and histogram length
//! `L`, and it holds `N²` distances in memory. Doubling the number of images
//! quadruples both. This is the dominant cost of a run.

mod metric;

pub use metric::HistogramMetric;

use crate::core::histogram::Histogram;
use crate::error::{SequenceError, SorterError};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// A square, symmetric matrix of pairwise distances with a zero diagonal.
///
/// Stored row-major in one buffer. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    /// Build a matrix from explicit rows, checking every invariant.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SequenceError> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(SequenceError::InvalidMatrix {
                    reason: format!(
                        "matrix is not square: row {} has {} entries, expected {}",
                        i,
                        row.len(),
                        size
                    ),
                });
            }
            cells.extend(row);
        }

        let matrix = Self { size, cells };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Number of items the matrix covers
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance between items `i` and `j`
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.size + j]
    }

    /// All distances from item `i`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.cells[i * self.size..(i + 1) * self.size]
    }

    /// Copy out as nested rows
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.size).map(|i| self.row(i).to_vec()).collect()
    }

    fn validate(&self) -> Result<(), SequenceError> {
        for i in 0..self.size {
            if self.get(i, i) != 0.0 {
                return Err(SequenceError::InvalidMatrix {
                    reason: format!("diagonal entry ({}, {}) is {}, expected 0", i, i, self.get(i, i)),
                });
            }
            for j in 0..self.size {
                let d = self.get(i, j);
                if !d.is_finite() || d < 0.0 {
                    return Err(SequenceError::InvalidMatrix {
                        reason: format!(
                            "entry ({}, {}) is {}, expected a finite non-negative distance",
                            i, j, d
                        ),
                    });
                }
                if d != self.get(j, i) {
                    return Err(SequenceError::InvalidMatrix {
                        reason: format!("matrix is not symmetric at ({}, {})", i, j),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Create a rayon pool with exactly `workers` threads.
pub fn worker_pool(workers: usize) -> Result<ThreadPool, SorterError> {
    ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("imgsort-worker-{}", i))
        .build()
        .map_err(|e| SorterError::Config(format!("failed to start worker pool: {}", e)))
}

/// Computes distance matrices with a fixed metric and worker count.
///
/// Output is identical for every worker count: each cell is written by
/// exactly one task and computed by the same pure function.
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    metric: HistogramMetric,
    workers: usize,
}

impl MatrixBuilder {
    /// Create a sequential builder for `metric`
    pub fn new(metric: HistogramMetric) -> Self {
        Self { metric, workers: 1 }
    }

    /// Set the number of worker threads (minimum 1)
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn metric(&self) -> HistogramMetric {
        self.metric
    }

    /// Build the matrix, starting a dedicated pool when more than one worker
    /// is configured.
    pub fn build(&self, histograms: &[Histogram]) -> Result<DistanceMatrix, SorterError> {
        if self.workers <= 1 {
            return Ok(self.build_sequential(histograms)?);
        }
        let pool = worker_pool(self.workers)?;
        Ok(self.build_in(&pool, histograms)?)
    }

    /// Build the matrix on an existing pool.
    pub fn build_in(
        &self,
        pool: &ThreadPool,
        histograms: &[Histogram],
    ) -> Result<DistanceMatrix, SequenceError> {
        let size = check_dimensions(histograms)?;
        if size == 1 || pool.current_num_threads() <= 1 {
            return self.build_sequential(histograms);
        }

        debug!(
            images = size,
            workers = pool.current_num_threads(),
            metric = %self.metric,
            "building distance matrix in parallel"
        );

        let mut cells = vec![0.0; size * size];
        pool.install(|| {
            cells
                .par_chunks_mut(size)
                .enumerate()
                .for_each(|(i, row)| self.fill_row(i, row, histograms));
        });

        finish(size, cells)
    }

    fn build_sequential(&self, histograms: &[Histogram]) -> Result<DistanceMatrix, SequenceError> {
        let size = check_dimensions(histograms)?;
        debug!(images = size, metric = %self.metric, "building distance matrix");

        let mut cells = vec![0.0; size * size];
        for (i, row) in cells.chunks_mut(size).enumerate() {
            self.fill_row(i, row, histograms);
        }

        finish(size, cells)
    }

    /// Upper-triangle entries of row `i`
    fn fill_row(&self, i: usize, row: &mut [f64], histograms: &[Histogram]) {
        let a = histograms[i].as_slice();
        for (j, cell) in row.iter_mut().enumerate().skip(i + 1) {
            *cell = self.metric.distance(a, histograms[j].as_slice());
        }
    }
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self::new(HistogramMetric::default())
    }
}

fn check_dimensions(histograms: &[Histogram]) -> Result<usize, SequenceError> {
    let first = histograms.first().ok_or(SequenceError::EmptyInput)?;
    let expected = first.len();

    for (index, histogram) in histograms.iter().enumerate().skip(1) {
        if histogram.len() != expected {
            return Err(SequenceError::DimensionMismatch {
                index,
                expected,
                found: histogram.len(),
            });
        }
    }

    Ok(histograms.len())
}

/// Mirror the upper triangle and reject anything that is not a distance.
fn finish(size: usize, mut cells: Vec<f64>) -> Result<DistanceMatrix, SequenceError> {
    for i in 0..size {
        for j in (i + 1)..size {
            let d = cells[i * size + j];
            if !d.is_finite() || d < 0.0 {
                return Err(SequenceError::InvalidMatrix {
                    reason: format!(
                        "metric produced {} for pair ({}, {}), expected a finite non-negative distance",
                        d, i, j
                    ),
                });
            }
            cells[j * size + i] = d;
        }
    }

    Ok(DistanceMatrix { size, cells })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random histograms
    fn sample_histograms(count: usize, len: usize) -> Vec<Histogram> {
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        (0..count)
            .map(|_| {
                let raw: Vec<f64> = (0..len)
                    .map(|_| {
                        state ^= state << 13;
                        state ^= state >> 7;
                        state ^= state << 17;
                        (state % 1000) as f64
                    })
                    .collect();
                let total: f64 = raw.iter().sum::<f64>().max(1.0);
                Histogram::from_values(len as u32, raw.into_iter().map(|v| v / total).collect())
            })
            .collect()
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let histograms = sample_histograms(12, 30);
        for metric in [
            HistogramMetric::Intersection,
            HistogramMetric::ChiSquare,
            HistogramMetric::Bhattacharyya,
            HistogramMetric::Correlation,
        ] {
            let matrix = MatrixBuilder::new(metric).build(&histograms).unwrap();
            assert_eq!(matrix.len(), 12);
            for i in 0..12 {
                assert_eq!(matrix.get(i, i), 0.0);
                for j in 0..12 {
                    assert_eq!(matrix.get(i, j), matrix.get(j, i));
                    assert!(matrix.get(i, j) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn worker_count_does_not_change_result() {
        let histograms = sample_histograms(40, 30);

        let sequential = MatrixBuilder::default().workers(1).build(&histograms).unwrap();
        let parallel = MatrixBuilder::default().workers(4).build(&histograms).unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn single_item_matrix_is_zero() {
        let histograms = sample_histograms(1, 30);
        let matrix = MatrixBuilder::default().workers(4).build(&histograms).unwrap();
        assert_eq!(matrix.to_rows(), vec![vec![0.0]]);
    }

    #[test]
    fn empty_input_is_rejected() {
        let result = MatrixBuilder::default().build(&[]);
        assert!(matches!(
            result,
            Err(SorterError::Sequence(SequenceError::EmptyInput))
        ));
    }

    #[test]
    fn mismatched_lengths_are_fatal() {
        let mut histograms = sample_histograms(3, 30);
        histograms.push(Histogram::from_values(8, vec![0.0; 24]));

        let result = MatrixBuilder::default().build(&histograms);
        match result {
            Err(SorterError::Sequence(SequenceError::DimensionMismatch {
                index,
                expected,
                found,
            })) => {
                assert_eq!((index, expected, found), (3, 30, 24));
            }
            other => panic!("expected dimension mismatch, got {:?}", other),
        }
    }

    #[test]
    fn non_finite_distances_are_rejected() {
        // inf / inf inside chi-square yields NaN
        let histograms = vec![
            Histogram::from_values(2, vec![0.5, 0.5]),
            Histogram::from_values(2, vec![f64::INFINITY, 0.5]),
        ];
        let result = MatrixBuilder::new(HistogramMetric::ChiSquare).build(&histograms);
        assert!(matches!(
            result,
            Err(SorterError::Sequence(SequenceError::InvalidMatrix { .. }))
        ));
    }

    #[test]
    fn from_rows_accepts_valid_matrix() {
        let matrix =
            DistanceMatrix::from_rows(vec![vec![0.0, 2.0], vec![2.0, 0.0]]).unwrap();
        assert_eq!(matrix.get(0, 1), 2.0);
        assert_eq!(matrix.row(1), &[2.0, 0.0]);
    }

    #[test]
    fn from_rows_rejects_broken_invariants() {
        let not_square = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]);
        let asymmetric = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0, 0.0]]);
        let diagonal = DistanceMatrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 0.0]]);
        let negative = DistanceMatrix::from_rows(vec![vec![0.0, -1.0], vec![-1.0, 0.0]]);

        for result in [not_square, asymmetric, diagonal, negative] {
            assert!(matches!(result, Err(SequenceError::InvalidMatrix { .. })));
        }
    }
}
