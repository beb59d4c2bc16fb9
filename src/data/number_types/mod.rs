//! # Number types
//!
//! All quantities are floating point. Rounding noise is absorbed by comparing within a fixed
//! tolerance, see `numerical_precision`.
pub mod numerical_precision;
