//! Per-node training kernels over dense bins.
//!
//! - [`histograms`] - Gradient/hessian/count accumulation per bin
//! - [`split`] - Routing a node's rows to its two children
//! - [`partition`] - Leaf-range bookkeeping built on top of [`split`]
//!
//! All kernels are single-feature and single-threaded. Parallelism over features
//! or nodes belongs to the caller, which must hand each call non-aliasing buffers.

pub mod histograms;
pub mod partition;
pub mod split;
