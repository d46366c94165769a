//! Quantized feature data.
//!
//! - [`binned`] - Dense per-feature bin storage and its positional iterator
//! - [`types`] - Missing-value policy and bin type shared with split routing

pub mod binned;
pub mod types;
