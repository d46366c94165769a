//! Row partitioning for tree training.
//!
//! Manages row indices per leaf, enabling efficient partitioning when applying splits.
//! Uses a single contiguous buffer with ranges per leaf to avoid allocations during training.
//!
//! The partitioner stores:
//! - `indices`: Contiguous buffer of row indices, ordered by leaf
//! - `leaf_begin`: Start position for each leaf in `indices`
//! - `leaf_count`: Number of rows in each leaf
//!
//! Splitting a leaf runs [`BinData::split`] over the leaf's range into scratch
//! buffers and copies the two halves back, lte first. Both halves keep their
//! relative order, so leaf indices stay sorted if they started sorted.

use super::split::SplitThreshold;
use crate::data::binned::BinData;

/// Leaf identifier (index during training).
pub type LeafId = u32;

/// Manages row indices per leaf during tree training.
///
/// ```text
/// Initial (all rows in leaf 0):
///   indices: [0, 1, 2, 3, 4, 5, 6, 7]
///   leaf_begin: [0], leaf_count: [8]
///
/// After splitting leaf 0 (rows 0,2,4,6 go lte to leaf 0, rows 1,3,5,7 go gt to leaf 1):
///   indices: [0, 2, 4, 6, 1, 3, 5, 7]
///   leaf_begin: [0, 4], leaf_count: [4, 4]
/// ```
#[derive(Debug, Clone)]
pub struct RowPartitioner {
    /// Row indices buffer, grouped by leaf.
    indices: Vec<u32>,
    /// Start position for each leaf in `indices`.
    leaf_begin: Vec<u32>,
    /// Number of rows in each leaf.
    leaf_count: Vec<u32>,
    /// Number of leaves currently allocated.
    n_leaves: usize,
    /// Scratch outputs for the splitter.
    lte_scratch: Vec<u32>,
    gt_scratch: Vec<u32>,
}

impl RowPartitioner {
    /// Create a new partitioner with all rows in leaf 0.
    ///
    /// # Arguments
    /// * `n_samples` - Number of rows (samples) in the dataset
    /// * `max_leaves` - Maximum number of leaves to support (at least 1 is reserved)
    pub fn new(n_samples: usize, max_leaves: usize) -> Self {
        let max_leaves = max_leaves.max(1);
        let mut partitioner = Self {
            indices: Vec::new(),
            leaf_begin: vec![0; max_leaves],
            leaf_count: vec![0; max_leaves],
            n_leaves: 0,
            lte_scratch: Vec::new(),
            gt_scratch: Vec::new(),
        };
        partitioner.reset(n_samples, None);
        partitioner
    }

    /// Reset the partitioner for a new tree.
    ///
    /// # Arguments
    /// * `n_samples` - Total number of rows in the dataset
    /// * `sampled` - Optional sampled row indices (None = use all rows)
    pub fn reset(&mut self, n_samples: usize, sampled: Option<&[u32]>) {
        self.indices.clear();
        match sampled {
            None => self.indices.extend(0..n_samples as u32),
            Some(rows) => self.indices.extend_from_slice(rows),
        }

        let n_rows = self.indices.len();
        self.lte_scratch.resize(n_rows, 0);
        self.gt_scratch.resize(n_rows, 0);

        self.leaf_begin.fill(0);
        self.leaf_count.fill(0);
        self.leaf_count[0] = n_rows as u32;
        self.n_leaves = 1;

        tracing::debug!(n_rows, sampled = sampled.is_some(), "row partitioner reset");
    }

    /// Row indices of a leaf.
    #[inline]
    pub fn leaf_indices(&self, leaf: LeafId) -> &[u32] {
        let begin = self.leaf_begin[leaf as usize] as usize;
        let count = self.leaf_count[leaf as usize] as usize;
        &self.indices[begin..begin + count]
    }

    /// Number of rows in a leaf.
    #[inline]
    pub fn leaf_count(&self, leaf: LeafId) -> u32 {
        self.leaf_count[leaf as usize]
    }

    /// Start position of a leaf in the shared index buffer.
    #[inline]
    pub fn leaf_begin(&self, leaf: LeafId) -> u32 {
        self.leaf_begin[leaf as usize]
    }

    /// Number of allocated leaves.
    #[inline]
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Split a leaf on one feature.
    ///
    /// The original leaf keeps the lte rows; a new leaf is allocated for the gt rows.
    ///
    /// # Returns
    /// `(right_leaf, left_count, right_count)` where:
    /// - `right_leaf`: ID of the newly allocated leaf
    /// - `left_count`: Number of rows routed lte (remaining in original leaf)
    /// - `right_count`: Number of rows routed gt (in new leaf)
    ///
    /// # Panics
    ///
    /// Panics if all `max_leaves` leaves are already allocated.
    pub fn split(&mut self, leaf: LeafId, bins: &BinData, threshold: &SplitThreshold) -> (LeafId, u32, u32) {
        assert!(
            self.n_leaves < self.leaf_begin.len(),
            "cannot split leaf {leaf}: all {} leaves allocated",
            self.leaf_begin.len()
        );

        let begin = self.leaf_begin[leaf as usize] as usize;
        let count = self.leaf_count[leaf as usize] as usize;
        let end = begin + count;

        let left_count = bins.split(
            threshold,
            &self.indices[begin..end],
            &mut self.lte_scratch[..count],
            &mut self.gt_scratch[..count],
        );
        let right_count = count - left_count;

        let mid = begin + left_count;
        self.indices[begin..mid].copy_from_slice(&self.lte_scratch[..left_count]);
        self.indices[mid..end].copy_from_slice(&self.gt_scratch[..right_count]);

        self.leaf_count[leaf as usize] = left_count as u32;

        let right_leaf = self.n_leaves as LeafId;
        self.n_leaves += 1;
        self.leaf_begin[right_leaf as usize] = mid as u32;
        self.leaf_count[right_leaf as usize] = right_count as u32;

        tracing::trace!(leaf, right_leaf, left_count, right_count, "split leaf");
        (right_leaf, left_count as u32, right_count as u32)
    }
}
