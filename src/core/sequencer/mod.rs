//! # Sequencer Module
//!
//! Turns a distance matrix into a visiting order with the greedy
//! nearest-neighbour chain:
//!
//! 1. Start at item 0
//! 2. From the current end of the chain, pick the closest unvisited item
//! 3. On equal distances pick the lowest index
//! 4. Repeat until every item is placed
//!
//! This is `O(N²)` over a precomputed matrix and never backtracks, so it can
//! paint itself into a corner and finish with a long jump. The resulting
//! order is what users see in their output folder; changing the heuristic
//! changes that order.

use crate::core::comparator::DistanceMatrix;
use crate::error::SequenceError;
use serde::{Deserialize, Serialize};

/// An ordering of item indices in which every index appears exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permutation {
    order: Vec<usize>,
}

impl Permutation {
    /// Wrap an ordering, checking that it covers `0..order.len()` exactly once
    pub fn new(order: Vec<usize>) -> Result<Self, SequenceError> {
        let mut seen = vec![false; order.len()];
        for &index in &order {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(SequenceError::InvalidPermutation {
                        reason: format!("index {} appears twice in the ordering", index),
                    })
                }
                None => {
                    return Err(SequenceError::InvalidPermutation {
                        reason: format!(
                            "index {} is out of range for {} items",
                            index,
                            order.len()
                        ),
                    })
                }
            }
        }
        Ok(Self { order })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.order
    }

    /// Sum of distances between consecutive items
    pub fn total_distance(&self, matrix: &DistanceMatrix) -> f64 {
        self.order
            .windows(2)
            .map(|pair| matrix.get(pair[0], pair[1]))
            .sum()
    }

    /// Reorder `items` to follow this permutation
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.order.iter().map(|&i| items[i].clone()).collect()
    }
}

/// Chain under construction: the visited order plus a membership flag per item
struct ChainState {
    visited: Vec<bool>,
    order: Vec<usize>,
}

impl ChainState {
    fn starting_at(start: usize, size: usize) -> Self {
        let mut visited = vec![false; size];
        visited[start] = true;
        let mut order = Vec::with_capacity(size);
        order.push(start);
        Self { visited, order }
    }

    fn tail(&self) -> usize {
        self.order[self.order.len() - 1]
    }

    fn push(&mut self, index: usize) {
        self.visited[index] = true;
        self.order.push(index);
    }

    /// Closest unvisited item to the tail. Scans in index order with a strict
    /// comparison, so the lowest index wins ties.
    fn nearest_unvisited(&self, matrix: &DistanceMatrix) -> Option<usize> {
        let distances = matrix.row(self.tail());
        let mut best: Option<(usize, f64)> = None;

        for (candidate, &distance) in distances.iter().enumerate() {
            if self.visited[candidate] {
                continue;
            }
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((candidate, distance)),
            }
        }

        best.map(|(index, _)| index)
    }
}

/// Greedy nearest-neighbour sequencer
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyChain;

impl GreedyChain {
    pub fn new() -> Self {
        Self
    }

    /// Order every item in `matrix`, starting from item 0.
    pub fn sequence(&self, matrix: &DistanceMatrix) -> Result<Permutation, SequenceError> {
        let size = matrix.len();
        if size == 0 {
            return Err(SequenceError::EmptyInput);
        }

        let mut chain = ChainState::starting_at(0, size);
        while chain.order.len() < size {
            let next = chain
                .nearest_unvisited(matrix)
                .ok_or_else(|| SequenceError::InvalidMatrix {
                    reason: "ran out of unvisited items before the chain was complete"
                        .to_string(),
                })?;
            chain.push(next);
        }

        Ok(Permutation { order: chain.order })
    }
}
