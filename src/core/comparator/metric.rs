//! Histogram comparison metrics.
//!
//! Every metric is a pure function of two equal-length, non-negative slices
//! returning a non-negative distance with `d(a, a) = 0` and
//! `d(a, b) = d(b, a)`. None of them is required to satisfy the triangle
//! inequality.
//!
//! The sequence order is sensitive to the exact formula, so each variant is
//! spelled out below. `Intersection` is the default.

use serde::{Deserialize, Serialize};

/// Available histogram distance metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramMetric {
    /// `1 - Σ min(aᵢ, bᵢ)`, clamped at 0.
    ///
    /// Expects histograms normalised to a total mass of 1.
    #[default]
    Intersection,
    /// Symmetric chi-square `Σ (aᵢ - bᵢ)² / (aᵢ + bᵢ)`; empty bins on both
    /// sides contribute nothing.
    ChiSquare,
    /// Hellinger form of the Bhattacharyya distance:
    /// `sqrt(1 - Σ sqrt(aᵢ·bᵢ) / sqrt(Σa · Σb))`.
    Bhattacharyya,
    /// `1 - r` where `r` is the Pearson correlation of the two vectors.
    /// Constant vectors are at distance 0 from an identical vector, 1 otherwise.
    Correlation,
}

impl HistogramMetric {
    /// Distance between two histograms.
    ///
    /// Callers guarantee equal lengths; the matrix builder checks this once
    /// for the whole input set.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            HistogramMetric::Intersection => intersection(a, b),
            HistogramMetric::ChiSquare => chi_square(a, b),
            HistogramMetric::Bhattacharyya => bhattacharyya(a, b),
            HistogramMetric::Correlation => correlation(a, b),
        }
    }

    /// Get a human-readable description of the metric
    pub fn description(&self) -> &'static str {
        match self {
            HistogramMetric::Intersection => {
                "Intersection - share of colour mass the two images have in common"
            }
            HistogramMetric::ChiSquare => {
                "Chi-square - penalises bins where one image has much more than the other"
            }
            HistogramMetric::Bhattacharyya => {
                "Bhattacharyya - overlap of the two colour distributions"
            }
            HistogramMetric::Correlation => {
                "Correlation - whether bins rise and fall together"
            }
        }
    }
}

impl std::fmt::Display for HistogramMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistogramMetric::Intersection => write!(f, "intersection"),
            HistogramMetric::ChiSquare => write!(f, "chi-square"),
            HistogramMetric::Bhattacharyya => write!(f, "bhattacharyya"),
            HistogramMetric::Correlation => write!(f, "correlation"),
        }
    }
}

fn intersection(a: &[f64], b: &[f64]) -> f64 {
    let shared: f64 = a.iter().zip(b).map(|(x, y)| x.min(*y)).sum();
    (1.0 - shared).max(0.0)
}

fn chi_square(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let total = x + y;
            if total > 0.0 {
                (x - y) * (x - y) / total
            } else {
                0.0
            }
        })
        .sum()
}

fn bhattacharyya(a: &[f64], b: &[f64]) -> f64 {
    let mass_a: f64 = a.iter().sum();
    let mass_b: f64 = b.iter().sum();
    let norm = (mass_a * mass_b).sqrt();

    if norm == 0.0 {
        return if mass_a == mass_b { 0.0 } else { 1.0 };
    }

    let overlap: f64 = a.iter().zip(b).map(|(x, y)| (x * y).sqrt()).sum();
    (1.0 - overlap / norm).max(0.0).sqrt()
}

fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    if a.is_empty() {
        return 0.0;
    }

    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denominator = (var_a * var_b).sqrt();
    if denominator == 0.0 {
        return if a == b { 0.0 } else { 1.0 };
    }

    (1.0 - covariance / denominator).max(0.0)
}
