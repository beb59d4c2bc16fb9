//! # Algorithms
//!
//! The incremental simplex solver lives in `simplex`.
pub mod simplex;
