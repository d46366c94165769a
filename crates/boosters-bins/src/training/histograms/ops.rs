//! Histogram building kernels and operations.
//!
//! Four kernels cover the two independent axes of a histogram pass:
//!
//! | rows             | gradients + hessians                     | gradients only                                 |
//! |------------------|------------------------------------------|------------------------------------------------|
//! | explicit indices | [`DenseBin::construct_histogram`]        | [`DenseBin::construct_histogram_gradients`]      |
//! | `0..num_data`    | [`DenseBin::construct_histogram_full`]   | [`DenseBin::construct_histogram_full_gradients`] |
//!
//! All four share one kernel that processes four rows per step and finishes the
//! `num_data % 4` remainder one row at a time. This is the hottest loop in training.
//!
//! # Numeric Precision
//!
//! Sums accumulate in `f64` although gradients arrive as `f32`. The subtraction
//! trick (sibling = parent - child) takes differences of large sums, which drift
//! quickly in `f32`.

use crate::data::binned::{BinData, BinValue, DenseBin, dispatch};

/// Aggregate statistics of the rows falling into one bin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HistogramEntry {
    /// Sum of gradients.
    pub sum_gradients: f64,
    /// Sum of hessians; untouched by the gradients-only kernels.
    pub sum_hessians: f64,
    /// Number of rows.
    pub count: u32,
}

impl HistogramEntry {
    /// Entry with the given sums.
    #[inline]
    pub fn new(sum_gradients: f64, sum_hessians: f64, count: u32) -> Self {
        Self {
            sum_gradients,
            sum_hessians,
            count,
        }
    }
}

// =============================================================================
// Kernels
// =============================================================================

impl<T: BinValue> DenseBin<T> {
    /// Accumulate gradients and hessians for the rows in `data_indices`.
    ///
    /// `ordered_gradients[i]` and `ordered_hessians[i]` belong to row `data_indices[i]`.
    ///
    /// # Panics
    ///
    /// Panics if either gradient slice is shorter than `data_indices`, if an index is
    /// outside the storage, or if a bin code is outside `out`.
    #[inline]
    pub fn construct_histogram(
        &self,
        data_indices: &[u32],
        ordered_gradients: &[f32],
        ordered_hessians: &[f32],
        out: &mut [HistogramEntry],
    ) {
        match contiguous_start(data_indices) {
            Some(start) => accumulate::<T, false, true>(
                &self.data[start..],
                &[],
                data_indices.len(),
                ordered_gradients,
                ordered_hessians,
                out,
            ),
            None => accumulate::<T, true, true>(
                &self.data,
                data_indices,
                data_indices.len(),
                ordered_gradients,
                ordered_hessians,
                out,
            ),
        }
    }

    /// Accumulate gradients and hessians for rows `0..num_data`.
    #[inline]
    pub fn construct_histogram_full(
        &self,
        num_data: usize,
        ordered_gradients: &[f32],
        ordered_hessians: &[f32],
        out: &mut [HistogramEntry],
    ) {
        accumulate::<T, false, true>(&self.data, &[], num_data, ordered_gradients, ordered_hessians, out);
    }

    /// Accumulate gradients (and counts) for the rows in `data_indices`; hessian sums are untouched.
    ///
    /// Used when the hessian is constant and the caller derives it from the count.
    #[inline]
    pub fn construct_histogram_gradients(
        &self,
        data_indices: &[u32],
        ordered_gradients: &[f32],
        out: &mut [HistogramEntry],
    ) {
        match contiguous_start(data_indices) {
            Some(start) => accumulate::<T, false, false>(
                &self.data[start..],
                &[],
                data_indices.len(),
                ordered_gradients,
                &[],
                out,
            ),
            None => accumulate::<T, true, false>(
                &self.data,
                data_indices,
                data_indices.len(),
                ordered_gradients,
                &[],
                out,
            ),
        }
    }

    /// Accumulate gradients (and counts) for rows `0..num_data`.
    #[inline]
    pub fn construct_histogram_full_gradients(
        &self,
        num_data: usize,
        ordered_gradients: &[f32],
        out: &mut [HistogramEntry],
    ) {
        accumulate::<T, false, false>(&self.data, &[], num_data, ordered_gradients, &[], out);
    }
}

/// First row of `indices` if they are exactly `first, first + 1, ..., first + len - 1`.
///
/// Such nodes skip the index indirection, which lets the hardware prefetcher
/// stream the bin codes. The order matters because gradients are aligned with
/// the index order, so a range check on the endpoints alone is not enough.
#[inline]
fn contiguous_start(indices: &[u32]) -> Option<usize> {
    let &first = indices.first()?;
    indices
        .windows(2)
        .all(|pair| pair[1] == pair[0].wrapping_add(1))
        .then_some(first as usize)
}

/// Shared kernel, monomorphized over row source and hessian presence.
///
/// With `INDEXED`, row `i` is `indices[i]`; otherwise row `i` is `i`.
#[inline(always)]
fn accumulate<T: BinValue, const INDEXED: bool, const WITH_HESSIAN: bool>(
    data: &[T],
    indices: &[u32],
    num_data: usize,
    grad: &[f32],
    hess: &[f32],
    out: &mut [HistogramEntry],
) {
    // Hoisted length checks so the loop reads the aligned slices unchecked.
    let grad = &grad[..num_data];
    let hess = if WITH_HESSIAN { &hess[..num_data] } else { hess };
    let indices = if INDEXED { &indices[..num_data] } else { indices };
    let bin_at = |i: usize| -> usize {
        if INDEXED {
            data[indices[i] as usize].to_usize()
        } else {
            data[i].to_usize()
        }
    };

    let rest = num_data & 0x3;
    let mut i = 0;
    while i < num_data - rest {
        let bin0 = bin_at(i);
        let bin1 = bin_at(i + 1);
        let bin2 = bin_at(i + 2);
        let bin3 = bin_at(i + 3);

        out[bin0].sum_gradients += grad[i] as f64;
        out[bin1].sum_gradients += grad[i + 1] as f64;
        out[bin2].sum_gradients += grad[i + 2] as f64;
        out[bin3].sum_gradients += grad[i + 3] as f64;

        if WITH_HESSIAN {
            out[bin0].sum_hessians += hess[i] as f64;
            out[bin1].sum_hessians += hess[i + 1] as f64;
            out[bin2].sum_hessians += hess[i + 2] as f64;
            out[bin3].sum_hessians += hess[i + 3] as f64;
        }

        out[bin0].count += 1;
        out[bin1].count += 1;
        out[bin2].count += 1;
        out[bin3].count += 1;

        i += 4;
    }
    while i < num_data {
        let bin = bin_at(i);
        out[bin].sum_gradients += grad[i] as f64;
        if WITH_HESSIAN {
            out[bin].sum_hessians += hess[i] as f64;
        }
        out[bin].count += 1;
        i += 1;
    }
}

// =============================================================================
// Width-erased Kernels
// =============================================================================

impl BinData {
    /// See [`DenseBin::construct_histogram`].
    #[inline]
    pub fn construct_histogram(
        &self,
        data_indices: &[u32],
        ordered_gradients: &[f32],
        ordered_hessians: &[f32],
        out: &mut [HistogramEntry],
    ) {
        dispatch!(self, bin => bin.construct_histogram(data_indices, ordered_gradients, ordered_hessians, out))
    }

    /// See [`DenseBin::construct_histogram_full`].
    #[inline]
    pub fn construct_histogram_full(
        &self,
        num_data: usize,
        ordered_gradients: &[f32],
        ordered_hessians: &[f32],
        out: &mut [HistogramEntry],
    ) {
        dispatch!(self, bin => bin.construct_histogram_full(num_data, ordered_gradients, ordered_hessians, out))
    }

    /// See [`DenseBin::construct_histogram_gradients`].
    #[inline]
    pub fn construct_histogram_gradients(
        &self,
        data_indices: &[u32],
        ordered_gradients: &[f32],
        out: &mut [HistogramEntry],
    ) {
        dispatch!(self, bin => bin.construct_histogram_gradients(data_indices, ordered_gradients, out))
    }

    /// See [`DenseBin::construct_histogram_full_gradients`].
    #[inline]
    pub fn construct_histogram_full_gradients(
        &self,
        num_data: usize,
        ordered_gradients: &[f32],
        out: &mut [HistogramEntry],
    ) {
        dispatch!(self, bin => bin.construct_histogram_full_gradients(num_data, ordered_gradients, out))
    }
}

// =============================================================================
// Histogram Operations
// =============================================================================

/// Subtract histograms: dst -= src
///
/// Used for the subtraction trick: sibling = parent - child
#[inline]
pub fn subtract_histogram(dst: &mut [HistogramEntry], src: &[HistogramEntry]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src) {
        d.sum_gradients -= s.sum_gradients;
        d.sum_hessians -= s.sum_hessians;
        d.count -= s.count;
    }
}

/// Merge histograms: dst += src
#[inline]
pub fn merge_histogram(dst: &mut [HistogramEntry], src: &[HistogramEntry]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src) {
        d.sum_gradients += s.sum_gradients;
        d.sum_hessians += s.sum_hessians;
        d.count += s.count;
    }
}

/// Zero out a histogram.
#[inline]
pub fn clear_histogram(histogram: &mut [HistogramEntry]) {
    histogram.fill(HistogramEntry::default());
}

/// Sum all bins in a histogram.
#[inline]
pub fn sum_histogram(histogram: &[HistogramEntry]) -> HistogramEntry {
    let mut total = HistogramEntry::default();
    for entry in histogram {
        total.sum_gradients += entry.sum_gradients;
        total.sum_hessians += entry.sum_hessians;
        total.count += entry.count;
    }
    total
}

// =============================================================================
// Tests
// =============================================================================
