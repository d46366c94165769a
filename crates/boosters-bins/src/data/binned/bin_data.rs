//! Fixed-width dense bin storage.
//!
//! [`DenseBin<T>`] stores exactly one bin code per row for a single feature.
//! The code width `T` is picked per feature to minimize memory: most features
//! fit in `u8`, wide categoricals or bundled features need `u16` or `u32`.
//!
//! [`BinData`] wraps the three widths in one enum so callers that select the
//! width at runtime (from the feature's bin count) can hold storages of
//! different widths side by side.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::{BinIterator, BinStorageError, DenseBinIterator};

// =============================================================================
// BinValue
// =============================================================================

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// An unsigned integer type usable as a bin code.
///
/// Implemented for `u8`, `u16` and `u32` only.
pub trait BinValue:
    sealed::Sealed + Copy + Default + Ord + Send + Sync + std::fmt::Debug + 'static
{
    /// Width tag of this storage type.
    const WIDTH: BinWidth;
    /// Bytes per code in the raw on-disk layout.
    const BYTES: usize;

    /// Truncating cast from `u32`.
    fn from_u32(value: u32) -> Self;

    /// Widening cast to `u32`.
    fn to_u32(self) -> u32;

    /// Widening cast to `usize`, for histogram indexing.
    #[inline]
    fn to_usize(self) -> usize {
        self.to_u32() as usize
    }

    /// Decode one code from exactly `Self::BYTES` little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Append the little-endian encoding of `self` to `out`.
    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_bin_value {
    ($ty:ty, $width:expr) => {
        impl BinValue for $ty {
            const WIDTH: BinWidth = $width;
            const BYTES: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn from_u32(value: u32) -> Self {
                value as $ty
            }

            #[inline]
            fn to_u32(self) -> u32 {
                self as u32
            }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_le_bytes(buf)
            }

            #[inline]
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_bin_value!(u8, BinWidth::U8);
impl_bin_value!(u16, BinWidth::U16);
impl_bin_value!(u32, BinWidth::U32);

// =============================================================================
// BinWidth
// =============================================================================

/// Storage width of a bin code.
///
/// The raw byte layout written by [`DenseBin::save_raw`] is not self-describing,
/// so readers must be told the width out-of-band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinWidth {
    /// 8-bit codes (up to 256 bins).
    #[default]
    U8,
    /// 16-bit codes (up to 65536 bins).
    U16,
    /// 32-bit codes.
    U32,
}

impl BinWidth {
    /// Narrowest width that can hold bin codes `0..num_bins`.
    #[inline]
    pub fn for_num_bins(num_bins: u32) -> Self {
        if num_bins <= 1 << 8 {
            Self::U8
        } else if num_bins <= 1 << 16 {
            Self::U16
        } else {
            Self::U32
        }
    }

    /// Bytes per code.
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

// =============================================================================
// DenseBin
// =============================================================================

/// Dense bin codes for one feature, one code per row.
///
/// Codes are never validated here: the quantization stage guarantees they fit `T`
/// and that callers size their histograms to `max code + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseBin<T: BinValue> {
    pub(crate) data: Vec<T>,
}

impl<T: BinValue> DenseBin<T> {
    /// Zero-filled storage for `num_data` rows.
    pub fn new(num_data: usize) -> Self {
        tracing::debug!(num_data, width = ?T::WIDTH, "allocating dense bin storage");
        Self {
            data: vec![T::default(); num_data],
        }
    }

    /// Wrap existing codes.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Number of rows stored.
    #[inline]
    pub fn num_data(&self) -> usize {
        self.data.len()
    }

    /// Raw codes in row order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Raw code at `position`, widened to `u32`.
    #[inline]
    pub fn get(&self, position: usize) -> u32 {
        self.data[position].to_u32()
    }

    /// Store `value` at `position`, truncated to the storage width.
    #[inline]
    pub fn push(&mut self, position: usize, value: u32) {
        self.data[position] = T::from_u32(value);
    }

    /// Replace every code with `codes`, truncated to the storage width.
    ///
    /// The storage takes the length of `codes`.
    pub fn set_all(&mut self, codes: &[u32]) {
        self.data.clear();
        self.data.extend(codes.iter().map(|&code| T::from_u32(code)));
    }

    /// Grow or shrink to `num_data` rows.
    ///
    /// Existing codes up to the smaller size are kept; new rows are zero.
    pub fn resize(&mut self, num_data: usize) {
        if self.data.len() != num_data {
            tracing::debug!(from = self.data.len(), to = num_data, "resizing dense bin storage");
            self.data.resize(num_data, T::default());
        }
    }

    /// Positional view restricted to `[min_bin, max_bin]`.
    #[inline]
    pub fn iterator(&self, min_bin: u32, max_bin: u32, default_bin: u32) -> DenseBinIterator<'_, T> {
        DenseBinIterator::new(self, min_bin, max_bin, default_bin)
    }

    /// Load codes from a raw little-endian buffer written by [`save_raw`](Self::save_raw).
    ///
    /// With an empty `remap`, row `i` is read from element `i` of `buffer` for the
    /// first `min(num_data, buffer.len() / width)` rows; rows past the end of the
    /// buffer keep their codes. This lets a storage grown by [`resize`](Self::resize)
    /// be refilled from the smaller buffer it was saved to.
    ///
    /// Otherwise row `i` is read from element `remap[i]`, which loads a subset of a
    /// full-population buffer without an intermediate copy.
    ///
    /// # Errors
    ///
    /// Returns [`BinStorageError::UnalignedBuffer`] if `buffer` is not a whole number of
    /// codes, [`BinStorageError::RemapTooShort`] if `remap` is non-empty but has fewer
    /// than `num_data` entries, and [`BinStorageError::BufferTooShort`] if `buffer` does
    /// not contain every element `remap` names.
    pub fn load_from_buffer(&mut self, buffer: &[u8], remap: &[u32]) -> Result<(), BinStorageError> {
        let num_data = self.data.len();
        if buffer.len() % T::BYTES != 0 {
            return Err(BinStorageError::UnalignedBuffer {
                len: buffer.len(),
                width: T::WIDTH,
            });
        }
        if remap.is_empty() {
            let num_loaded = num_data.min(buffer.len() / T::BYTES);
            for (slot, chunk) in self.data[..num_loaded].iter_mut().zip(buffer.chunks_exact(T::BYTES)) {
                *slot = T::read_le(chunk);
            }
        } else {
            if remap.len() < num_data {
                return Err(BinStorageError::RemapTooShort {
                    needed: num_data,
                    got: remap.len(),
                });
            }
            let remap = &remap[..num_data];
            let needed = remap
                .iter()
                .max()
                .map_or(0, |&max_index| (max_index as usize + 1) * T::BYTES);
            if buffer.len() < needed {
                return Err(BinStorageError::BufferTooShort {
                    needed,
                    got: buffer.len(),
                });
            }
            for (slot, &src) in self.data.iter_mut().zip(remap) {
                let start = src as usize * T::BYTES;
                *slot = T::read_le(&buffer[start..start + T::BYTES]);
            }
        }
        tracing::trace!(num_data, remapped = !remap.is_empty(), "loaded dense bins from buffer");
        Ok(())
    }

    /// Select rows from a larger storage: `self[i] = full[used_indices[i]]`.
    ///
    /// Both storages share `T`, so width mismatches cannot compile. Use
    /// [`BinData::copy_subset`] when widths are only known at runtime.
    ///
    /// # Panics
    ///
    /// Panics if `used_indices` is longer than `self` or names a row outside `full`.
    pub fn copy_subset(&mut self, full: &DenseBin<T>, used_indices: &[u32]) {
        for (slot, &row) in self.data[..used_indices.len()].iter_mut().zip(used_indices) {
            *slot = full.data[row as usize];
        }
        tracing::trace!(num_used = used_indices.len(), "copied dense bin subset");
    }

    /// Size of the raw byte layout.
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        T::BYTES * self.data.len()
    }

    /// Write codes as a contiguous little-endian byte sequence in row order.
    pub fn save_raw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut buf = Vec::with_capacity(self.size_in_bytes());
        for &value in &self.data {
            value.write_le(&mut buf);
        }
        writer.write_all(&buf)
    }
}

// =============================================================================
// BinData
// =============================================================================

/// Dense bin storage with its width chosen at runtime.
///
/// Every [`DenseBin`] operation is available by dispatch. Operations that take a
/// second storage ([`copy_subset`](Self::copy_subset)) check that both widths agree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BinData {
    /// 8-bit codes.
    U8(DenseBin<u8>),
    /// 16-bit codes.
    U16(DenseBin<u16>),
    /// 32-bit codes.
    U32(DenseBin<u32>),
}

/// Run `$body` with `$bin` bound to the inner `DenseBin<T>` of any variant.
macro_rules! dispatch {
    ($self:expr, $bin:ident => $body:expr) => {
        match $self {
            $crate::data::binned::BinData::U8($bin) => $body,
            $crate::data::binned::BinData::U16($bin) => $body,
            $crate::data::binned::BinData::U32($bin) => $body,
        }
    };
}
pub(crate) use dispatch;

impl BinData {
    /// Zero-filled storage of the given width.
    pub fn new(width: BinWidth, num_data: usize) -> Self {
        match width {
            BinWidth::U8 => Self::U8(DenseBin::new(num_data)),
            BinWidth::U16 => Self::U16(DenseBin::new(num_data)),
            BinWidth::U32 => Self::U32(DenseBin::new(num_data)),
        }
    }

    /// Zero-filled storage, narrowest width that holds codes `0..num_bins`.
    pub fn for_num_bins(num_bins: u32, num_data: usize) -> Self {
        Self::new(BinWidth::for_num_bins(num_bins), num_data)
    }

    /// Read `num_data` codes of the given width from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`BinStorageError::Io`] if the reader fails or ends early.
    pub fn read_raw<R: Read>(
        width: BinWidth,
        num_data: usize,
        reader: &mut R,
    ) -> Result<Self, BinStorageError> {
        let mut buf = vec![0u8; num_data * width.bytes()];
        reader.read_exact(&mut buf)?;
        let mut bins = Self::new(width, num_data);
        bins.load_from_buffer(&buf, &[])?;
        Ok(bins)
    }

    /// Width tag.
    #[inline]
    pub fn width(&self) -> BinWidth {
        match self {
            Self::U8(_) => BinWidth::U8,
            Self::U16(_) => BinWidth::U16,
            Self::U32(_) => BinWidth::U32,
        }
    }

    /// Number of rows stored.
    #[inline]
    pub fn num_data(&self) -> usize {
        dispatch!(self, bin => bin.num_data())
    }

    /// Raw code at `position`.
    #[inline]
    pub fn get(&self, position: usize) -> u32 {
        dispatch!(self, bin => bin.get(position))
    }

    /// See [`DenseBin::push`].
    #[inline]
    pub fn push(&mut self, position: usize, value: u32) {
        dispatch!(self, bin => bin.push(position, value))
    }

    /// See [`DenseBin::set_all`].
    pub fn set_all(&mut self, codes: &[u32]) {
        dispatch!(self, bin => bin.set_all(codes))
    }

    /// See [`DenseBin::resize`].
    pub fn resize(&mut self, num_data: usize) {
        dispatch!(self, bin => bin.resize(num_data))
    }

    /// Boxed positional view, for callers that mix storage layouts.
    pub fn iterator(&self, min_bin: u32, max_bin: u32, default_bin: u32) -> Box<dyn BinIterator + '_> {
        dispatch!(self, bin => Box::new(bin.iterator(min_bin, max_bin, default_bin)))
    }

    /// See [`DenseBin::load_from_buffer`].
    pub fn load_from_buffer(&mut self, buffer: &[u8], remap: &[u32]) -> Result<(), BinStorageError> {
        dispatch!(self, bin => bin.load_from_buffer(buffer, remap))
    }

    /// See [`DenseBin::copy_subset`].
    ///
    /// # Errors
    ///
    /// Returns [`BinStorageError::WidthMismatch`] if `full` has a different width.
    pub fn copy_subset(&mut self, full: &BinData, used_indices: &[u32]) -> Result<(), BinStorageError> {
        match (self, full) {
            (Self::U8(dst), Self::U8(src)) => dst.copy_subset(src, used_indices),
            (Self::U16(dst), Self::U16(src)) => dst.copy_subset(src, used_indices),
            (Self::U32(dst), Self::U32(src)) => dst.copy_subset(src, used_indices),
            (dst, src) => {
                return Err(BinStorageError::WidthMismatch {
                    expected: dst.width(),
                    got: src.width(),
                });
            }
        }
        Ok(())
    }

    /// See [`DenseBin::size_in_bytes`].
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        dispatch!(self, bin => bin.size_in_bytes())
    }

    /// See [`DenseBin::save_raw`].
    pub fn save_raw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        dispatch!(self, bin => bin.save_raw(writer))
    }
}

impl From<DenseBin<u8>> for BinData {
    fn from(bin: DenseBin<u8>) -> Self {
        Self::U8(bin)
    }
}

impl From<DenseBin<u16>> for BinData {
    fn from(bin: DenseBin<u16>) -> Self {
        Self::U16(bin)
    }
}

impl From<DenseBin<u32>> for BinData {
    fn from(bin: DenseBin<u32>) -> Self {
        Self::U32(bin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_push_truncates_to_width() {
        let mut bins = DenseBin::<u8>::new(3);
        bins.push(0, 7);
        bins.push(1, 255);
        bins.push(2, 257);
        assert_eq!(bins.as_slice(), &[7, 255, 1]);
    }

    #[test]
    fn test_set_all_replaces_contents() {
        let mut bins = DenseBin::from_vec(vec![1u8, 2, 3, 4]);
        bins.set_all(&[9, 300]);
        assert_eq!(bins.as_slice(), &[9, 44]);

        let mut data = BinData::new(BinWidth::U16, 1);
        data.set_all(&[5, 70000, 6]);
        assert_eq!(data.num_data(), 3);
        assert_eq!((data.get(0), data.get(1), data.get(2)), (5, 70000 - 65536, 6));
    }

    #[test]
    fn test_resize_preserves_prefix() {
        let mut bins = DenseBin::from_vec(vec![3u16, 1, 4]);
        bins.resize(5);
        assert_eq!(bins.as_slice(), &[3, 1, 4, 0, 0]);
        bins.resize(2);
        assert_eq!(bins.as_slice(), &[3, 1]);
    }

    #[rstest]
    #[case(BinWidth::U8, 10, 10)]
    #[case(BinWidth::U16, 10, 20)]
    #[case(BinWidth::U32, 10, 40)]
    fn test_size_in_bytes(#[case] width: BinWidth, #[case] n: usize, #[case] expected: usize) {
        assert_eq!(BinData::new(width, n).size_in_bytes(), expected);
        assert_eq!(width.bytes() * n, expected);
    }

    #[rstest]
    #[case(2, BinWidth::U8)]
    #[case(256, BinWidth::U8)]
    #[case(257, BinWidth::U16)]
    #[case(65536, BinWidth::U16)]
    #[case(65537, BinWidth::U32)]
    fn test_width_for_num_bins(#[case] num_bins: u32, #[case] expected: BinWidth) {
        assert_eq!(BinWidth::for_num_bins(num_bins), expected);
    }

    #[test]
    fn test_save_raw_is_little_endian() {
        let bins = DenseBin::from_vec(vec![0x0102u16, 0x0304]);
        let mut out = Vec::new();
        bins.save_raw(&mut out).unwrap();
        assert_eq!(out, vec![0x02, 0x01, 0x04, 0x03]);
    }

    #[test]
    fn test_load_from_buffer_verbatim() {
        let src = DenseBin::from_vec(vec![5u32, 6, 70000]);
        let mut raw = Vec::new();
        src.save_raw(&mut raw).unwrap();

        let mut dst = DenseBin::<u32>::new(3);
        dst.load_from_buffer(&raw, &[]).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_load_from_buffer_remapped() {
        let raw = vec![10u8, 11, 12, 13, 14];
        let mut dst = DenseBin::<u8>::new(3);
        dst.load_from_buffer(&raw, &[4, 0, 2]).unwrap();
        assert_eq!(dst.as_slice(), &[14, 10, 12]);
    }

    #[test]
    fn test_load_from_buffer_too_short() {
        let mut dst = DenseBin::<u16>::new(3);
        let err = dst.load_from_buffer(&[0u8; 5], &[]).unwrap_err();
        assert!(matches!(
            err,
            BinStorageError::UnalignedBuffer {
                len: 5,
                width: BinWidth::U16
            }
        ));

        let err = dst.load_from_buffer(&[0u8; 8], &[0, 1, 4]).unwrap_err();
        assert!(matches!(err, BinStorageError::BufferTooShort { needed: 10, got: 8 }));

        let err = dst.load_from_buffer(&[0u8; 8], &[0, 1]).unwrap_err();
        assert!(matches!(err, BinStorageError::RemapTooShort { needed: 3, got: 2 }));
    }

    #[test]
    fn test_load_from_buffer_into_grown_storage() {
        let mut bins = DenseBin::from_vec(vec![9u16, 300, 2, 65535]);
        let mut raw = Vec::new();
        bins.save_raw(&mut raw).unwrap();

        bins.resize(10);
        bins.push(7, 42);
        bins.load_from_buffer(&raw, &[]).unwrap();
        assert_eq!(&bins.as_slice()[..4], &[9, 300, 2, 65535]);
        assert_eq!(bins.get(7), 42);
        assert_eq!(bins.num_data(), 10);
    }

    #[test]
    fn test_load_from_buffer_longer_than_storage() {
        let mut bins = DenseBin::<u8>::new(2);
        bins.load_from_buffer(&[4, 5, 6, 7], &[]).unwrap();
        assert_eq!(bins.as_slice(), &[4, 5]);
    }

    #[test]
    fn test_copy_subset() {
        let full = DenseBin::from_vec(vec![0u8, 1, 2, 3, 4, 5]);
        let mut subset = DenseBin::<u8>::new(3);
        subset.copy_subset(&full, &[5, 1, 3]);
        assert_eq!(subset.as_slice(), &[5, 1, 3]);
    }

    #[test]
    fn test_bin_data_copy_subset_width_mismatch() {
        let full = BinData::new(BinWidth::U16, 4);
        let mut subset = BinData::new(BinWidth::U8, 2);
        let err = subset.copy_subset(&full, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            BinStorageError::WidthMismatch {
                expected: BinWidth::U8,
                got: BinWidth::U16
            }
        ));
    }

    #[test]
    fn test_bin_data_read_raw() {
        let bins = BinData::from(DenseBin::from_vec(vec![1u16, 300, 2]));
        let mut raw = Vec::new();
        bins.save_raw(&mut raw).unwrap();

        let loaded = BinData::read_raw(BinWidth::U16, 3, &mut raw.as_slice()).unwrap();
        assert_eq!(loaded, bins);

        let err = BinData::read_raw(BinWidth::U16, 4, &mut raw.as_slice()).unwrap_err();
        assert!(matches!(err, BinStorageError::Io(_)));
    }
}
