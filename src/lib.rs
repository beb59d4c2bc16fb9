//! # An incremental linear constraint solver
//!
//! Linear equalities and inequalities, each tagged with a strength, are solved using the Cassowary
//! algorithm as described in "The Cassowary Linear Arithmetic Constraint Solving Algorithm" by
//! Greg J. Badros, Alan Borning and Peter J. Stuckey. Required constraints hold exactly, the
//! weighted violation of the others is minimized. Constraints and target values can be changed
//! incrementally, without solving from scratch.
#![warn(missing_docs)]

pub mod algorithm;
pub mod data;
pub mod error;

#[cfg(test)]
mod tests;
