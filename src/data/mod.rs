//! # Values the solver reasons about
//!
//! Variables, the linear expressions built from them, strengths and the constraints that combine
//! both. The tableau and other structures specific to the solver live in `algorithm::simplex`.

pub mod constraint;
pub mod expression;
pub mod number_types;
pub mod strength;
pub mod variable;
