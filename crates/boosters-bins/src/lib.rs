//! boosters-bins: dense quantized feature storage for GBDT training.
//!
//! This crate holds the two innermost loops of histogram-based tree training:
//! accumulating per-bin gradient statistics over a node's rows, and routing
//! those rows to the two children once a split has been chosen.
//!
//! # Key Types
//!
//! - [`DenseBin`] / [`BinData`] - One bin code per row for a single feature
//! - [`DenseBinIterator`] - Range-restricted positional view over a [`DenseBin`]
//! - [`HistogramEntry`] - Per-bin `(sum_gradients, sum_hessians, count)` aggregate
//! - [`SplitThreshold`] - Split descriptor consumed by [`DenseBin::split`]
//! - [`RowPartitioner`] - Per-leaf row ranges maintained across splits
//!
//! # Example
//!
//! ```
//! use boosters_bins::{BinData, HistogramEntry, SplitThreshold};
//!
//! let mut bins = BinData::for_num_bins(4, 6);
//! for (row, code) in [0u32, 1, 2, 3, 1, 0].into_iter().enumerate() {
//!     bins.push(row, code);
//! }
//!
//! let grad = [1.0f32; 6];
//! let hess = [1.0f32; 6];
//! let mut histogram = vec![HistogramEntry::default(); 4];
//! bins.construct_histogram_full(6, &grad, &hess, &mut histogram);
//! assert_eq!(histogram[1].count, 2);
//!
//! let threshold = SplitThreshold::builder()
//!     .min_bin(0)
//!     .max_bin(3)
//!     .threshold(1)
//!     .build()
//!     .unwrap();
//! let rows: Vec<u32> = (0..6).collect();
//! let (mut lte, mut gt) = (vec![0u32; 6], vec![0u32; 6]);
//! let lte_count = bins.split(&threshold, &rows, &mut lte, &mut gt);
//! assert_eq!(lte_count, 2);
//! ```

pub mod data;
pub mod training;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use data::binned::{
    BinData, BinIterator, BinStorageError, BinValue, BinWidth, DenseBin, DenseBinIterator,
};
pub use data::types::{BinType, MissingType};
pub use training::histograms::HistogramEntry;
pub use training::partition::{LeafId, RowPartitioner};
pub use training::split::{SplitThreshold, ThresholdError};
