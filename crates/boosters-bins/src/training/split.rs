//! Split routing over dense bins.
//!
//! [`SplitThreshold`] describes a chosen split in the feature's range-local bin
//! space (the space [`DenseBinIterator`](crate::DenseBinIterator) maps into).
//! [`DenseBin::split`] applies it to a node's rows, producing a stable partition
//! into rows routed `<=` (lte) and rows routed `>` (gt).
//!
//! # Default and Missing Routing
//!
//! Rows whose code falls outside `[min_bin, max_bin]`, or onto the default bin,
//! all go to one precomputed side:
//!
//! | bin type    | default goes lte when                                                        |
//! |-------------|------------------------------------------------------------------------------|
//! | Numerical   | `missing != Zero && default_bin <= threshold`, or `missing == Zero && default_left` |
//! | Categorical | `default_bin == threshold`                                                   |
//!
//! With `MissingType::NaN` the last bin of the range is the NaN sentinel. It is
//! routed by `default_left` alone.

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::data::binned::{BinData, BinValue, DenseBin, dispatch};
use crate::data::types::{BinType, MissingType};

// =============================================================================
// ThresholdError
// =============================================================================

/// Errors that can occur when building a [`SplitThreshold`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThresholdError {
    #[error("min_bin ({min_bin}) must not exceed max_bin ({max_bin})")]
    InvalidRange { min_bin: u32, max_bin: u32 },

    #[error("threshold {threshold} is outside the local bin range 0..={max_local}")]
    ThresholdOutOfRange { threshold: u32, max_local: u64 },
}

// =============================================================================
// SplitThreshold
// =============================================================================

/// Which child a row is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitSide {
    /// Rows with local bin `<= threshold` (numerical) or `== threshold` (categorical).
    Lte,
    /// All other rows.
    Gt,
}

/// A split decision on one feature.
///
/// `min_bin`/`max_bin` give the feature's raw code range inside its storage;
/// `threshold` and `default_bin` are local bins, as returned by the iterator.
///
/// # Example
///
/// ```
/// use boosters_bins::{MissingType, SplitThreshold};
///
/// let threshold = SplitThreshold::builder()
///     .min_bin(1)
///     .max_bin(8)
///     .threshold(3)
///     .missing_type(MissingType::Zero)
///     .default_left(true)
///     .build()
///     .unwrap();
/// assert_eq!(threshold.default_bin, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
pub struct SplitThreshold {
    /// First raw code belonging to the feature.
    pub min_bin: u32,

    /// Last raw code belonging to the feature.
    pub max_bin: u32,

    /// Local bin of absent (zero) values. Default: 0.
    #[builder(default)]
    #[serde(default)]
    pub default_bin: u32,

    /// Missing value policy. Default: `None`.
    #[builder(default)]
    #[serde(default)]
    pub missing_type: MissingType,

    /// Route missing values to the lte side. Default: `false`.
    #[builder(default)]
    #[serde(default)]
    pub default_left: bool,

    /// Local bin the split compares against.
    pub threshold: u32,

    /// Numerical (`<=`) or categorical (`==`) comparison. Default: `Numerical`.
    #[builder(default)]
    #[serde(default)]
    pub bin_type: BinType,
}

/// Custom finishing function that validates the threshold.
impl<S: split_threshold_builder::IsComplete> SplitThresholdBuilder<S> {
    /// Build and validate the split threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError`] if `min_bin > max_bin` or if `threshold` lies
    /// beyond the last local bin.
    pub fn build(self) -> Result<SplitThreshold, ThresholdError> {
        let threshold = self.__build_internal();
        threshold.validate()?;
        Ok(threshold)
    }
}

impl SplitThreshold {
    /// Check the range invariants.
    ///
    /// Splitting does not call this; it is run by the builder and may be run by
    /// callers that construct thresholds field by field.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.min_bin > self.max_bin {
            return Err(ThresholdError::InvalidRange {
                min_bin: self.min_bin,
                max_bin: self.max_bin,
            });
        }
        // Widened: a full-width u32 range plus the bias exceeds u32::MAX.
        let max_local = u64::from(self.max_bin - self.min_bin) + u64::from(self.bias());
        if u64::from(self.threshold) > max_local {
            return Err(ThresholdError::ThresholdOutOfRange {
                threshold: self.threshold,
                max_local,
            });
        }
        Ok(())
    }

    /// Local-bin shift, 1 iff `default_bin == 0`.
    #[inline]
    pub fn bias(&self) -> u32 {
        u32::from(self.default_bin == 0)
    }

    /// Side for rows outside the feature's range or on the default bin.
    pub fn default_side(&self) -> SplitSide {
        let lte = match self.bin_type {
            BinType::Numerical => {
                (self.missing_type != MissingType::Zero && self.default_bin <= self.threshold)
                    || (self.default_left && self.missing_type == MissingType::Zero)
            }
            BinType::Categorical => self.default_bin == self.threshold,
        };
        if lte { SplitSide::Lte } else { SplitSide::Gt }
    }

    /// Side for rows in the NaN sentinel bin. Only `default_left` decides.
    #[inline]
    pub fn missing_side(&self) -> SplitSide {
        if self.default_left { SplitSide::Lte } else { SplitSide::Gt }
    }
}

// =============================================================================
// Splitting
// =============================================================================

/// Output cursors over the two caller buffers.
struct Routed<'a> {
    lte: &'a mut [u32],
    gt: &'a mut [u32],
    lte_count: usize,
    gt_count: usize,
}

impl Routed<'_> {
    #[inline(always)]
    fn push_lte(&mut self, idx: u32) {
        self.lte[self.lte_count] = idx;
        self.lte_count += 1;
    }

    #[inline(always)]
    fn push_gt(&mut self, idx: u32) {
        self.gt[self.gt_count] = idx;
        self.gt_count += 1;
    }

    #[inline(always)]
    fn push(&mut self, side: SplitSide, idx: u32) {
        match side {
            SplitSide::Lte => self.push_lte(idx),
            SplitSide::Gt => self.push_gt(idx),
        }
    }
}

impl<T: BinValue> DenseBin<T> {
    /// Partition `data_indices` by `split`.
    ///
    /// Writes the lte rows to the front of `lte_indices` and the gt rows to the front
    /// of `gt_indices`, each in input order, and returns the lte count. The gt count
    /// is `data_indices.len()` minus the result. An empty `data_indices` returns 0.
    ///
    /// # Panics
    ///
    /// Panics if an index is outside the storage or an output buffer is too small
    /// for the rows routed to it. Sizing both to `data_indices.len()` always suffices.
    pub fn split(
        &self,
        split: &SplitThreshold,
        data_indices: &[u32],
        lte_indices: &mut [u32],
        gt_indices: &mut [u32],
    ) -> usize {
        if data_indices.is_empty() {
            return 0;
        }

        // Local -> raw code space, wrapping at the storage width.
        let bias = split.bias();
        let th = T::from_u32(split.threshold.wrapping_add(split.min_bin).wrapping_sub(bias));
        let t_default_bin = T::from_u32(split.min_bin.wrapping_add(split.default_bin).wrapping_sub(bias));
        let min_bin = T::from_u32(split.min_bin);
        let max_bin = T::from_u32(split.max_bin);
        let is_default = |bin: T| bin < min_bin || bin > max_bin || bin == t_default_bin;

        let default_side = split.default_side();
        let mut out = Routed {
            lte: lte_indices,
            gt: gt_indices,
            lte_count: 0,
            gt_count: 0,
        };

        match split.bin_type {
            BinType::Numerical if split.missing_type == MissingType::NaN => {
                let missing_side = split.missing_side();
                for &idx in data_indices {
                    let bin = self.data[idx as usize];
                    if is_default(bin) {
                        out.push(default_side, idx);
                    } else if bin == max_bin {
                        out.push(missing_side, idx);
                    } else if bin > th {
                        out.push_gt(idx);
                    } else {
                        out.push_lte(idx);
                    }
                }
            }
            BinType::Numerical => {
                for &idx in data_indices {
                    let bin = self.data[idx as usize];
                    if is_default(bin) {
                        out.push(default_side, idx);
                    } else if bin > th {
                        out.push_gt(idx);
                    } else {
                        out.push_lte(idx);
                    }
                }
            }
            BinType::Categorical => {
                for &idx in data_indices {
                    let bin = self.data[idx as usize];
                    if is_default(bin) {
                        out.push(default_side, idx);
                    } else if bin != th {
                        out.push_gt(idx);
                    } else {
                        out.push_lte(idx);
                    }
                }
            }
        }

        debug_assert_eq!(out.lte_count + out.gt_count, data_indices.len());
        out.lte_count
    }
}

impl BinData {
    /// See [`DenseBin::split`].
    #[inline]
    pub fn split(
        &self,
        split: &SplitThreshold,
        data_indices: &[u32],
        lte_indices: &mut [u32],
        gt_indices: &mut [u32],
    ) -> usize {
        dispatch!(self, bin => bin.split(split, data_indices, lte_indices, gt_indices))
    }
}

// =============================================================================
// Tests
// =============================================================================
