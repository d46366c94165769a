//! Histogram construction for gradient boosting tree training.
//!
//! A histogram holds one [`HistogramEntry`] per raw bin code of a feature. The
//! kernels in [`ops`] add a node's gradients into it; the split search reads it back.
//!
//! # Ordered Gradients
//!
//! Kernels take gradients pre-gathered into iteration order: `ordered_gradients[i]`
//! belongs to the `i`-th row processed, not to row `i` of the dataset. Gradient
//! reads are then sequential and only the histogram writes are random.
//!
//! # Accumulation
//!
//! Kernels only ever add. Clear the histogram before a fresh pass, or chain calls
//! deliberately (for example, accumulating several row blocks into one histogram).

pub mod ops;

pub use ops::{
    HistogramEntry, clear_histogram, merge_histogram, subtract_histogram, sum_histogram,
};
