//! Dense binned feature storage.
//!
//! - [`DenseBin`] - Fixed-width array of bin codes, one per row, generic over [`BinValue`]
//! - [`BinData`] - Tagged variant over the u8/u16/u32 widths, chosen from the feature's bin count
//! - [`DenseBinIterator`] - Stateless range-remapping view used after feature bundling
//!
//! Histogram construction and split routing are implemented on [`DenseBin`] in
//! [`crate::training`]; they read the codes directly without going through the iterator.

mod bin_data;
mod error;
mod iterator;

pub(crate) use bin_data::dispatch;
pub use bin_data::{BinData, BinValue, BinWidth, DenseBin};
pub use error::BinStorageError;
pub use iterator::{BinIterator, DenseBinIterator};
