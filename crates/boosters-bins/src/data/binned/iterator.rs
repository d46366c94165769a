//! Positional bin accessors.
//!
//! When several features are bundled into one storage, each feature owns a
//! sub-range `[min_bin, max_bin]` of the raw codes. [`DenseBinIterator`] maps raw
//! codes back into that feature's local bin space:
//!
//! ```text
//! raw code v in [min_bin, max_bin]  ->  v - min_bin + bias
//! raw code v outside the range      ->  default_bin
//! ```
//!
//! `bias` is 1 when `default_bin == 0`, which keeps local slot 0 reserved for rows
//! whose value is absent (zero) for this feature.

use super::{BinValue, DenseBin};

/// Random-access view over one feature's bin codes.
///
/// Despite the name this is not a forward cursor: `get` and `raw_get` may be
/// called at arbitrary positions in any order.
pub trait BinIterator {
    /// Bin code at `position`, remapped into the feature's local range.
    fn get(&self, position: usize) -> u32;

    /// Stored code at `position`, without remapping.
    fn raw_get(&self, position: usize) -> u32;

    /// Hint that subsequent reads start at `position`.
    ///
    /// Layouts that decode sequentially use this to rewind; dense storage ignores it.
    fn reset(&mut self, position: usize);
}

/// Stateless range-remapping view over a [`DenseBin`].
#[derive(Clone, Copy, Debug)]
pub struct DenseBinIterator<'a, T: BinValue> {
    bins: &'a DenseBin<T>,
    min_bin: T,
    max_bin: T,
    default_bin: T,
    bias: u32,
}

impl<'a, T: BinValue> DenseBinIterator<'a, T> {
    /// Create a view for the range `[min_bin, max_bin]`.
    ///
    /// Range bounds are truncated to the storage width, matching how codes were stored.
    pub fn new(bins: &'a DenseBin<T>, min_bin: u32, max_bin: u32, default_bin: u32) -> Self {
        let default_bin = T::from_u32(default_bin);
        let bias = if default_bin == T::default() { 1 } else { 0 };
        Self {
            bins,
            min_bin: T::from_u32(min_bin),
            max_bin: T::from_u32(max_bin),
            default_bin,
            bias,
        }
    }

    /// Offset added to in-range codes (1 iff `default_bin == 0`).
    #[inline]
    pub fn bias(&self) -> u32 {
        self.bias
    }
}

impl<T: BinValue> BinIterator for DenseBinIterator<'_, T> {
    #[inline]
    fn get(&self, position: usize) -> u32 {
        let raw = self.bins.data[position];
        if raw >= self.min_bin && raw <= self.max_bin {
            raw.to_u32() - self.min_bin.to_u32() + self.bias
        } else {
            self.default_bin.to_u32()
        }
    }

    #[inline]
    fn raw_get(&self, position: usize) -> u32 {
        self.bins.data[position].to_u32()
    }

    #[inline]
    fn reset(&mut self, _position: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::binned::BinData;

    #[test]
    fn test_get_shifts_when_default_is_zero() {
        let bins = DenseBin::from_vec(vec![0u8, 1, 2, 3, 1, 0]);
        let iter = bins.iterator(1, 2, 0);
        assert_eq!(iter.bias(), 1);

        let mapped: Vec<u32> = (0..bins.num_data()).map(|i| iter.get(i)).collect();
        assert_eq!(mapped, vec![0, 1, 2, 0, 1, 0]);
    }

    #[test]
    fn test_get_without_shift() {
        let bins = DenseBin::from_vec(vec![4u16, 5, 6, 7, 9]);
        let iter = bins.iterator(5, 7, 3);
        assert_eq!(iter.bias(), 0);

        let mapped: Vec<u32> = (0..bins.num_data()).map(|i| iter.get(i)).collect();
        assert_eq!(mapped, vec![3, 0, 1, 2, 3]);
    }

    #[test]
    fn test_raw_get_and_reset() {
        let bins = DenseBin::from_vec(vec![9u32, 2, 70000]);
        let mut iter = bins.iterator(0, 3, 0);
        iter.reset(2);
        assert_eq!(iter.raw_get(2), 70000);
        assert_eq!(iter.raw_get(0), 9);
        assert_eq!(iter.get(1), 3);
        // Non-sequential access after reset is unaffected
        assert_eq!(iter.get(0), 0);
    }

    #[test]
    fn test_boxed_iterator_from_bin_data() {
        let mut data = BinData::for_num_bins(8, 4);
        for (i, v) in [1u32, 7, 3, 0].into_iter().enumerate() {
            data.push(i, v);
        }
        let iter = data.iterator(1, 3, 0);
        let mapped: Vec<u32> = (0..4).map(|i| iter.get(i)).collect();
        assert_eq!(mapped, vec![1, 0, 3, 0]);
    }
}
