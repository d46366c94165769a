//! Errors for bin storage loading and copying.

use std::io;

use super::BinWidth;

/// Errors that can occur when loading or copying bin storage.
#[derive(Debug, thiserror::Error)]
pub enum BinStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("buffer too short: need {needed} bytes, got {got}")]
    BufferTooShort { needed: usize, got: usize },

    #[error("buffer of {len} bytes is not a whole number of {width:?} codes")]
    UnalignedBuffer { len: usize, width: BinWidth },

    #[error("remap index list too short: need {needed} indices, got {got}")]
    RemapTooShort { needed: usize, got: usize },

    #[error("bin width mismatch: destination is {expected:?}, source is {got:?}")]
    WidthMismatch { expected: BinWidth, got: BinWidth },
}
